//! Conversions between the protocol's integer encodings and human-readable decimals.
//!
//! Amounts are formatted from their digit strings so no precision is lost; floats
//! only appear in derived, display-oriented metrics (rates, utilization).

use std::str::FromStr;

use alloy::primitives::U256;
use bigdecimal::{BigDecimal, ToPrimitive};

use crate::error::AppError;

/// Interest rates and liquidity indexes are 1e27 fixed point.
pub const RAY_DECIMALS: u8 = 27;

/// Collateral, debt and health factor from the account-data call.
pub const BASE_CURRENCY_DECIMALS: u8 = 8;

/// `ltv` and `liquidationThreshold` are basis points.
pub const BASIS_POINT_DECIMALS: u8 = 2;

/// Format a base-unit integer as a decimal string.
///
/// Always keeps at least one fractional digit and trims trailing zeros beyond it:
/// - raw=1000000, decimals=6 => "1.0"
/// - raw=1500000, decimals=6 => "1.5"
/// - raw=1, decimals=6 => "0.000001"
pub fn format_units(raw: U256, decimals: u8) -> String {
    let digits = raw.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return format!("{}.0", digits);
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };

    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, frac)
    }
}

/// Parse a decimal string expressed in token units into base units.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, AppError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AppError::ValidationError("Amount must not be empty".to_string()));
    }

    let (whole, frac) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(AppError::ValidationError(format!("Invalid amount: {}", amount)));
    }

    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(AppError::ValidationError(format!(
            "Invalid amount: {} (expected a non-negative decimal number)",
            amount
        )));
    }

    if frac.len() > decimals as usize {
        return Err(AppError::ValidationError(format!(
            "Too many decimal places for token (decimals={})",
            decimals
        )));
    }

    let digits = format!("{}{}{}", whole, frac, "0".repeat(decimals as usize - frac.len()));
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10)
        .map_err(|_| AppError::ValidationError(format!("Amount out of range: {}", amount)))
}

/// Exact decimal value of a base-unit integer.
pub fn to_decimal(raw: U256, decimals: u8) -> BigDecimal {
    BigDecimal::from_str(&format!("{}e-{}", raw, decimals)).unwrap_or_default()
}

/// Lossy float of a base-unit integer, for derived metrics only.
pub fn to_f64(raw: U256, decimals: u8) -> f64 {
    to_decimal(raw, decimals).to_f64().unwrap_or(0.0)
}

/// Ray-encoded rate as a percentage: `raw / 1e27 * 100`.
pub fn ray_to_percent(raw: U256) -> f64 {
    (to_decimal(raw, RAY_DECIMALS) * BigDecimal::from(100)).to_f64().unwrap_or(0.0)
}

/// Round a display value to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
