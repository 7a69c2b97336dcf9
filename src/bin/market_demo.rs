//! Walks one purchase through the marketplace.
//!
//! Usage: `market_demo [config.json]`

use game_market::{
    telemetry, AccountFilter, AccountSort, CheckoutGate, MarketConfig, MarketError, Marketplace,
    NewUser, UserType,
};

fn main() {
    if let Err(e) = run() {
        tracing::error!(error = %e, "Demo failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), MarketError> {
    let config = match std::env::args().nth(1) {
        Some(path) => MarketConfig::from_json_file(path)?,
        None => MarketConfig::default(),
    }
    .with_env_overrides()?;
    telemetry::init("info", config.json_logs);

    let mut market = Marketplace::open(config)?;

    let mut listings = market.db().get_all_accounts(&AccountFilter::default())?;
    game_market::sort_accounts(&mut listings, AccountSort::PriceAsc);
    for account in &listings {
        println!("{:>9.2}  {:<16} {}", account.price, account.game.display_name(), account.title);
    }
    let Some(cheapest) = listings.first().cloned() else {
        println!("catalog is empty");
        return Ok(());
    };

    let email = "demo.buyer@example.com";
    if market.db().login_user(email, "demo")?.is_none() {
        market
            .db()
            .register_user(NewUser::new("demo_buyer", email, "demo").with_type(UserType::Buyer))?;
    }

    market.cart_mut().add_account(&cheapest)?;
    if market.start_checkout()? == CheckoutGate::LoginRequired {
        market.login(email, "demo")?;
    }
    match market.start_checkout()? {
        CheckoutGate::Ready(summary) => {
            println!("\ncart: {} item(s), total {:.2}", summary.item_count, summary.total)
        }
        other => {
            println!("checkout not ready: {:?}", other);
            return Ok(());
        }
    }

    let receipt = market.checkout("pix", None)?;
    println!("\n{}", receipt.summary);

    let stats = market.db().get_stats()?;
    println!(
        "{} accounts listed, {} still available",
        stats.total_accounts, stats.available_accounts
    );
    market.shutdown();
    Ok(())
}
