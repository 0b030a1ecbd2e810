use super::LineItem;
use once_cell::sync::Lazy;
use regex::Regex;

/// Marker every sale line carries in front of its amounts.
const CURRENCY_MARKER: char = '$';

/// Header and footer lines of a remision start with one of these (compared
/// against the trimmed, uppercased line).
const NON_ITEM_PREFIXES: &[&str] = &[
    "SEÑOR",
    "SENOR",
    "DIRECCIÓN",
    "DIRECCION",
    "CIUDAD",
    "TELÉFONO",
    "TELEFONO",
    "FECHA",
    "REMISIÓN",
    "REMISION",
    "ÍTEM",
    "ITEM",
    "ELABORADO",
    "SUBTOTAL",
    "TOTAL",
    "NIT",
    "NO.",
];

// product (lazy, up to the first price) | unit price | qty | discount token | line total
static ITEM_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?P<prod>.+?)\s+\$?(?P<p_unit>[\d.,]+)\s+(?P<cant>\d+)\s+\S+\s+\$?(?P<total>[\d.,]+)\s*$",
    )
    .unwrap()
});

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Unicode decimal digit (Nd), same class the item grammar matches.
static DECIMAL_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());

/// Raw captures of a line that matched the item grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCaptures<'a> {
    pub product: &'a str,
    pub unit_price: &'a str,
    pub quantity: &'a str,
    pub total: &'a str,
}

/// Cheap pre-filter: currency marker present, no header/footer prefix.
pub fn is_candidate_line(line: &str) -> bool {
    if !line.contains(CURRENCY_MARKER) {
        return false;
    }

    let content = line.trim().to_uppercase();
    !NON_ITEM_PREFIXES
        .iter()
        .any(|prefix| content.starts_with(prefix))
}

/// A line is an item line when it passes the filters and matches the grammar.
pub fn is_item_line(line: &str) -> bool {
    is_candidate_line(line) && ITEM_LINE.is_match(line)
}

/// Split a line into product, unit price, quantity and total.
///
/// The product capture is non-greedy: it ends right before the first
/// whitespace-delimited numeric token that lets the rest of the line match.
pub fn match_item_line(line: &str) -> Option<ItemCaptures<'_>> {
    let caps = ITEM_LINE.captures(line)?;
    Some(ItemCaptures {
        product: caps.name("prod")?.as_str().trim(),
        unit_price: caps.name("p_unit")?.as_str(),
        quantity: caps.name("cant")?.as_str(),
        total: caps.name("total")?.as_str(),
    })
}

/// Keep only the decimal digits of `text` and parse them.
///
/// Separators carry no meaning: `"$1.234,00"` becomes `123400`. Digits of
/// any script count, so full-width `"１８"` is `18`.
pub fn parse_integer(text: &str) -> Option<i64> {
    let mut value = None;
    for digit in DECIMAL_DIGIT.find_iter(text).flat_map(|m| m.as_str().chars()) {
        let d = i64::from(decimal_value(digit)?);
        value = Some(value.unwrap_or(0i64).checked_mul(10)?.checked_add(d)?);
    }
    value
}

/// Unicode lays out each script's digits as a contiguous run from zero to
/// nine, so a digit's value is its distance from the start of its run.
fn decimal_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut offset = 0;
    let mut code = c as u32;
    while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        offset += 1;
        code -= 1;
    }
    Some(offset % 10)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}

/// Uppercase, trim and collapse internal whitespace runs to one space.
pub fn normalize_product_name(name: &str) -> String {
    let upper = name.to_uppercase();
    WHITESPACE_RUN.replace_all(upper.trim(), " ").into_owned()
}

/// Parse a single text line into an item, if it is one.
pub fn parse_line(line: &str) -> Option<LineItem> {
    if !is_candidate_line(line) {
        return None;
    }
    let caps = match_item_line(line)?;

    // Any numeric capture that fails to parse drops the whole line.
    Some(LineItem {
        product: caps.product.to_string(),
        unit_price: parse_integer(caps.unit_price)?,
        quantity: parse_integer(caps.quantity)?,
        line_total: parse_integer(caps.total)?,
    })
}
