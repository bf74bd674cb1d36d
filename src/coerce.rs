//! Raw token text → typed variable payload.
pub mod color;

use crate::error::CoerceError;
use crate::host::VariableValue;
use crate::tokens::Category;

pub fn coerce(category: Category, raw: &str) -> Result<VariableValue, CoerceError> {
    match category {
        Category::Size => parse_int_prefix(raw)
            .map(VariableValue::Float)
            .ok_or_else(|| CoerceError::NotANumber(raw.to_string())),
        Category::Color => color::parse_css_color(raw).map(VariableValue::Color),
        Category::Content => Ok(VariableValue::String(raw.to_string())),
    }
}

/// Permissive base-10 integer parse: leading whitespace and an optional sign,
/// then digits up to the first non-digit (`"16px"` → 16, `"1.5rem"` → 1).
pub fn parse_int_prefix(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    // digit-only text always parses as f64; huge values degrade to inf like JS
    let magnitude: f64 = rest[..digits].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
