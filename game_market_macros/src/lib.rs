mod record;

use proc_macro::TokenStream;

/// Derive macro for `game_market::Record`.
///
/// Struct-level `#[record(table = "accounts")]` names the table (defaults to the
/// snake_case struct name plus `s`). Field-level attributes:
///
/// - `#[record(key)]` marks a primary-key field. Several fields may be marked;
///   their values are joined with `:` to form a composite key. Without any
///   marker a field named `id` is used.
/// - `#[record(index)]` declares a secondary index on the field. Indexed fields
///   must implement `ToString`.
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Record)]
/// #[record(table = "reviews")]
/// pub struct Review {
///     pub id: String,
///     #[record(index)]
///     pub account_id: String,
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
