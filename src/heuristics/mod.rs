// src/heuristics/mod.rs

mod remision;

use serde::Serialize;

pub use remision::{is_item_line, normalize_product_name, parse_line};

/// A single sale line as printed on the remision.
///
/// Amounts are whole currency units; separators in the source text are
/// dropped, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    /// Product name exactly as printed (trimmed).
    pub product: String,
    pub unit_price: i64,
    pub quantity: i64,
    pub line_total: i64,
}

/// Extract every item line from the text of a document, page by page.
pub fn extract_items<I, S>(pages: I) -> Vec<LineItem>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .flat_map(|page| {
            page.as_ref()
                .lines()
                .filter_map(parse_line)
                .collect::<Vec<_>>()
        })
        .collect()
}
