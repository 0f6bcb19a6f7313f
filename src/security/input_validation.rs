use std::str::FromStr;
use std::sync::OnceLock;

use alloy::primitives::Address;
use regex::Regex;

use crate::error::AppError;

const ADDRESS_PATTERN: &str = r"^0x[a-fA-F0-9]{40}$";

fn address_regex() -> &'static Regex {
    static ADDRESS_REGEX: OnceLock<Regex> = OnceLock::new();
    ADDRESS_REGEX.get_or_init(|| Regex::new(ADDRESS_PATTERN).expect("address pattern compiles"))
}

/// Strict 20-byte hex address check. Checksums are not enforced.
pub fn is_valid_address(candidate: &str) -> bool {
    address_regex().is_match(candidate)
}

/// Validate and parse an address coming from a request. `field` names the
/// offending input in the error message.
pub fn parse_address(field: &str, candidate: Option<&str>) -> Result<Address, AppError> {
    let candidate = candidate
        .ok_or_else(|| AppError::ValidationError(format!("Missing required field: {}", field)))?;

    if !is_valid_address(candidate) {
        return Err(AppError::ValidationError(format!("Invalid {}", field)));
    }

    Address::from_str(candidate)
        .map_err(|e| AppError::ValidationError(format!("Invalid {}: {}", field, e)))
}

/// Amounts must be present and non-empty; numeric parsing happens later with the
/// token's decimals.
pub fn require_amount(amount: Option<&str>) -> Result<&str, AppError> {
    match amount.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::ValidationError("Missing required field: amount".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_mixed_case_addresses() {
        assert!(is_valid_address("0x742d35Cc6634C0532925a3b8D8b7C8b8b8b8b8b8"));
        assert!(is_valid_address("0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"));
        assert!(is_valid_address("0x0000000000000000000000000000000000000000"));
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        assert!(!is_valid_address("0xinvalid"));
        assert!(!is_valid_address("742d35Cc6634C0532925a3b8D8b7C8b8b8b8b8b8"));
        assert!(!is_valid_address("0x742d35Cc6634C0532925a3b8D8b7C8b8b8b8b8b"));
        assert!(!is_valid_address("0x742d35Cc6634C0532925a3b8D8b7C8b8b8b8b8b8a"));
        assert!(!is_valid_address("0X742d35Cc6634C0532925a3b8D8b7C8b8b8b8b8b8"));
        assert!(!is_valid_address("vitalik.eth"));
        assert!(!is_valid_address(""));
    }

    #[test]
    fn test_parse_address_names_the_field() {
        let err = parse_address("user address", Some("0x123")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid user address");

        let err = parse_address("token address", None).unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: token address");
    }

    #[test]
    fn test_require_amount() {
        assert_eq!(require_amount(Some(" 1.5 ")).unwrap(), "1.5");
        assert!(require_amount(Some("")).is_err());
        assert!(require_amount(None).is_err());
    }
}
