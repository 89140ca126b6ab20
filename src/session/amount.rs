//! Funding amount validation.

use alloy::primitives::utils::parse_ether;
use alloy::primitives::U256;
use thiserror::Error;

/// Smallest amount, in ETH, the client lets through to `fund()`.
pub const MINIMUM_FUND_ETH: f64 = 0.001;

/// Wei resolution of an ETH amount.
const MAX_DECIMALS: usize = 18;

/// Field-level problems with the funding amount input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AmountError {
    /// Fund was triggered with nothing typed.
    #[error("Please enter a valid ETH amount")]
    Missing,

    /// Not a plain decimal, finer than wei, or not above zero.
    #[error("Please enter a valid positive number")]
    NotPositiveNumber,

    /// Positive but under the client-side minimum.
    #[error("Minimum amount is {minimum} ETH")]
    BelowMinimum { minimum: f64 },
}

/// Check an amount as typed.
///
/// Empty (or whitespace-only) input is `Ok(None)`: not yet specified, no
/// error shown. Otherwise returns the parsed value.
pub fn validate_amount(input: &str, minimum: f64) -> Result<Option<f64>, AmountError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    if !is_plain_decimal(input) {
        return Err(AmountError::NotPositiveNumber);
    }
    let value: f64 = input.parse().map_err(|_| AmountError::NotPositiveNumber)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(AmountError::NotPositiveNumber);
    }
    if value < minimum {
        return Err(AmountError::BelowMinimum { minimum });
    }
    Ok(Some(value))
}

/// Validate and convert to wei for submission. Empty input is an error here.
pub fn parse_fund_amount(input: &str, minimum: f64) -> Result<U256, AmountError> {
    validate_amount(input, minimum)?.ok_or(AmountError::Missing)?;
    parse_ether(input.trim()).map_err(|_| AmountError::NotPositiveNumber)
}

/// `123`, `1.5`, `.5` or `2.` with at most 18 fractional digits: exactly
/// what converts to wei without loss.
fn is_plain_decimal(input: &str) -> bool {
    let (whole, frac) = input.split_once('.').unwrap_or((input, ""));
    !(whole.is_empty() && frac.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
        && frac.len() <= MAX_DECIMALS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_not_yet_specified() {
        assert_eq!(validate_amount("", MINIMUM_FUND_ETH), Ok(None));
        assert_eq!(validate_amount("   ", MINIMUM_FUND_ETH), Ok(None));
    }

    #[test]
    fn test_non_numeric_and_non_positive() {
        for input in ["abc", "1.2.3", "0", "-1", "-0.5", "0.0", "NaN", "inf", "-inf"] {
            assert_eq!(
                validate_amount(input, MINIMUM_FUND_ETH),
                Err(AmountError::NotPositiveNumber),
                "input {input:?}"
            );
        }
        assert_eq!(
            AmountError::NotPositiveNumber.to_string(),
            "Please enter a valid positive number"
        );
    }

    #[test]
    fn test_below_minimum() {
        for input in ["0.0005", "0.000999"] {
            assert!(matches!(
                validate_amount(input, MINIMUM_FUND_ETH),
                Err(AmountError::BelowMinimum { .. })
            ));
        }
        assert_eq!(
            validate_amount("0.0005", MINIMUM_FUND_ETH).unwrap_err().to_string(),
            "Minimum amount is 0.001 ETH"
        );
    }

    #[test]
    fn test_valid_amounts() {
        assert_eq!(validate_amount("0.001", MINIMUM_FUND_ETH), Ok(Some(0.001)));
        assert_eq!(validate_amount(" 0.01 ", MINIMUM_FUND_ETH), Ok(Some(0.01)));
        assert_eq!(validate_amount("25", MINIMUM_FUND_ETH), Ok(Some(25.0)));
    }

    #[test]
    fn test_parse_fund_amount_to_wei() {
        assert_eq!(
            parse_fund_amount("0.01", MINIMUM_FUND_ETH).unwrap(),
            U256::from(10_000_000_000_000_000u64)
        );
        assert_eq!(
            parse_fund_amount("1", MINIMUM_FUND_ETH).unwrap(),
            U256::from(1_000_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_parse_fund_amount_rejects() {
        assert_eq!(parse_fund_amount("", MINIMUM_FUND_ETH), Err(AmountError::Missing));
        assert_eq!(parse_fund_amount("abc", MINIMUM_FUND_ETH), Err(AmountError::NotPositiveNumber));
        assert!(matches!(
            parse_fund_amount("0.0005", MINIMUM_FUND_ETH),
            Err(AmountError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn test_inline_check_matches_wei_conversion() {
        for input in ["1e-2", "1E3", "0x10", "+1", "1_000", ".", "0.0010000000000000000001"] {
            assert_eq!(
                validate_amount(input, MINIMUM_FUND_ETH),
                Err(AmountError::NotPositiveNumber),
                "input {input:?}"
            );
            assert_eq!(
                parse_fund_amount(input, MINIMUM_FUND_ETH),
                Err(AmountError::NotPositiveNumber),
                "input {input:?}"
            );
        }

        for input in [".5", "2.", "0.001000000000000001"] {
            let inline = validate_amount(input, MINIMUM_FUND_ETH);
            assert!(matches!(inline, Ok(Some(_))), "input {input:?}");
            assert!(parse_fund_amount(input, MINIMUM_FUND_ETH).is_ok(), "input {input:?}");
        }
        assert_eq!(
            parse_fund_amount("0.001000000000000001", MINIMUM_FUND_ETH).unwrap(),
            U256::from(1_000_000_000_000_001u64)
        );
    }

    #[test]
    fn test_custom_minimum() {
        assert!(validate_amount("0.05", 0.1).is_err());
        assert!(validate_amount("0.1", 0.1).is_ok());
    }
}
