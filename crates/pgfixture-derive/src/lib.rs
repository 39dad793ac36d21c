//! Derive macros for pgfixture.
//!
//! Provides `#[derive(SqlEnum)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod sql_enum;

/// Derive `SqlEnum` and `From<E> for Value` for an enum of unit variants.
///
/// # Example
///
/// ```ignore
/// use pgfixture::SqlEnum;
///
/// #[derive(Clone, Copy, SqlEnum)]
/// #[fixture(rename_all = "SCREAMING_SNAKE_CASE")]
/// enum Status {
///     Active,          // "ACTIVE", ordinal 0
///     OnHold,          // "ON_HOLD", ordinal 1
///     #[fixture(rename = "gone")]
///     Deleted,         // "gone", ordinal 2
/// }
/// ```
///
/// # Attributes
///
/// - `#[fixture(rename_all = "...")]` on the enum: `lowercase`, `UPPERCASE`,
///   `snake_case`, `SCREAMING_SNAKE_CASE`, `kebab-case`, `camelCase`, `PascalCase`
/// - `#[fixture(rename = "name")]` on a variant: explicit name
///
/// Without attributes a variant's name is its identifier as written. Ordinals
/// follow declaration order, starting at 0.
#[proc_macro_derive(SqlEnum, attributes(fixture))]
pub fn derive_sql_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    sql_enum::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
