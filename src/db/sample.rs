use crate::model::{
    Attributes, DiabloFeatures, FeatureValue, Features, Game, GenshinFeatures, ImageRef,
    LolFeatures, MobileLegendsFeatures, NewAccount, NewUser, UserPatch, UserType,
    ValorantFeatures,
};

pub(super) fn users() -> Vec<(NewUser, UserPatch)> {
    vec![
        (
            NewUser::new("admin", "admin@gameaccounts.example", "admin123").with_type(UserType::Admin),
            UserPatch {
                verified: Some(true),
                ..Default::default()
            },
        ),
        (
            NewUser::new("jogador_pro", "pro@gamer.example", "123456").with_type(UserType::Seller),
            UserPatch {
                verified: Some(true),
                rating: Some(4.9),
                ..Default::default()
            },
        ),
    ]
}

fn images(names: &[&str]) -> Vec<ImageRef> {
    names.iter().map(|n| ImageRef::uri(*n)).collect()
}

fn extra(pairs: &[(&str, FeatureValue)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub(super) fn accounts() -> Vec<NewAccount> {
    vec![
        NewAccount {
            game: Game::Genshin,
            title: "AR 57 endgame account, 15 five-star characters".into(),
            description: "Every region explored to 100%, archon quests done, Hu Tao C1 with Homa, \
                          Raiden, Nahida, Yelan and Zhongli. Eight five-star weapons banked."
                .into(),
            price: 450.0,
            seller: "playerpro_gaming".into(),
            seller_id: None,
            features: Features::Genshin(GenshinFeatures {
                ar_level: 57,
                five_star_chars: Some(15),
                five_star_weapons: Some(8),
                primogems: Some(20_000),
                server: Some("America".into()),
                extra: extra(&[("welkin_active", true.into()), ("battle_pass", 20u32.into())]),
                ..Default::default()
            }),
            images: images(&["genshin1.jpg", "genshin2.jpg", "genshin3.jpg"]),
        },
        NewAccount {
            game: Game::Lol,
            title: "Challenger S13, 520 skins, every champion".into(),
            description: "Level 500+ account that finished season 13 in Challenger. All 162 \
                          champions unlocked, Ultimate and Prestige skins, high ranked MMR."
                .into(),
            price: 1200.0,
            seller: "elite_lol".into(),
            seller_id: None,
            features: Features::Lol(LolFeatures {
                rank: "Challenger".into(),
                level: Some(500),
                champions: Some(162),
                skins: Some(520),
                blue_essence: Some(100_000),
                rp: Some(5000),
                server: Some("BR".into()),
                ..Default::default()
            }),
            images: images(&["lol1.jpg", "lol2.jpg"]),
        },
        NewAccount {
            game: Game::Valorant,
            title: "Radiant account, all agents, rare skins".into(),
            description: "Radiant in the latest episode with every agent unlocked. Prime Vandal, \
                          Reaver Operator and Elderflame Judge in the collection."
                .into(),
            price: 850.0,
            seller: "valorant_pro".into(),
            seller_id: None,
            features: Features::Valorant(ValorantFeatures {
                rank: Some("Radiant".into()),
                agents: Some(22),
                skins: Some(45),
                vp: Some(10_000),
                server: Some("Sao Paulo".into()),
                ..Default::default()
            }),
            images: images(&["valorant1.jpg"]),
        },
        NewAccount {
            game: Game::MobileLegends,
            title: "Mythical Glory, 150 heroes, 300+ skins".into(),
            description: "Mythical Glory with 800+ points. Every hero unlocked, Legend and Epic \
                          skins, 50k diamonds and all emblems at level 60."
                .into(),
            price: 350.0,
            seller: "mlbb_king".into(),
            seller_id: None,
            features: Features::MobileLegends(MobileLegendsFeatures {
                rank: Some("Mythical Glory".into()),
                heroes: Some(150),
                skins: Some(320),
                diamonds: Some(50_000),
                extra: extra(&[("emblems", "Level 60".into())]),
                ..Default::default()
            }),
            images: images(&["ml1.jpg"]),
        },
        NewAccount {
            game: Game::Diablo,
            title: "Diablo IV, five level 100 characters".into(),
            description: "Barbarian, Sorcerer, Rogue, Druid and Necromancer at level 100 in best \
                          in slot gear. Uber Lilith defeated, 500M gold, every aspect unlocked."
                .into(),
            price: 650.0,
            seller: "diablo_master".into(),
            seller_id: None,
            features: Features::Diablo(DiabloFeatures {
                level: Some(100),
                characters: Some(5),
                gold: Some(500_000_000),
                uber_lilith: Some(true),
                ..Default::default()
            }),
            images: images(&["diablo1.jpg"]),
        },
        NewAccount {
            game: Game::Fortnite,
            title: "Fortnite, 520 skins, Save the World done".into(),
            description: "Every battle pass since season 2, Save the World completed at PL 130, \
                          rare item shop cosmetics and 20k V-Bucks banked."
                .into(),
            price: 1200.0,
            seller: "fortnite_collector".into(),
            seller_id: None,
            features: Features::Generic(extra(&[
                ("skins", 520u32.into()),
                ("v_bucks", 20_000u32.into()),
                ("stw_completed", true.into()),
                ("server", "Global".into()),
            ])),
            images: images(&["fortnite1.jpg"]),
        },
    ]
}
