//! Token unit conversions. One token is 10^10 base units.

pub const TOKEN_UNIT: i64 = 10_000_000_000;

/// Convert a token amount into base units, truncating towards zero.
pub fn tokens_to_units(tokens: f64) -> i64 {
    (tokens * TOKEN_UNIT as f64) as i64
}

pub fn units_to_tokens(units: i64) -> f64 {
    units as f64 / TOKEN_UNIT as f64
}
