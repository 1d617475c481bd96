//! Naming conventions for tables and columns.

use heck::ToSnakeCase;

/// Converts an identifier to `snake_case` (`CreatedAt` -> `created_at`,
/// `CompanyID` -> `company_id`).
#[must_use]
pub fn snake_case(name: &str) -> String {
    name.to_snake_case()
}

/// Naive English plural of a lowercase word.
#[must_use]
pub fn pluralize(word: &str) -> String {
    if word.ends_with('s') {
        word.to_string()
    } else if let Some(stem) = word.strip_suffix('y') {
        format!("{stem}ies")
    } else if word.ends_with("ch") || word.ends_with("sh") || word.ends_with('x') {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}

/// Table name for an entity: the plural of its `snake_case` name.
///
/// Word boundaries are kept, so `OrderItem` maps to `order_items`. Schemas
/// whose tables were named by lowercasing before pluralizing (`orderitems`)
/// do not match and their tables are detected as new.
#[must_use]
pub fn table_name(entity: &str) -> String {
    pluralize(&snake_case(entity))
}
