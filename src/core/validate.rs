//! Small validation helpers shared by catalog loading and CLI argument
//! checks, in the same spirit as the project's field-path-aware config
//! errors.

use crate::core::errors::{Result, ZoneRiskError};

/// Validate that a usize value is greater than zero.
pub fn validate_positive_usize(value: usize, field: &str) -> Result<()> {
    if value == 0 {
        return Err(ZoneRiskError::config_field(
            format!("{field} must be greater than 0"),
            field,
        ));
    }
    Ok(())
}

/// Validate that a token is non-empty and contains no uppercase characters,
/// per the pattern catalog invariant that every bucket is a set of
/// lowercase tokens.
pub fn validate_lowercase_token(token: &str, field: &str) -> Result<()> {
    if token.is_empty() {
        return Err(ZoneRiskError::config_field(
            "pattern tokens must not be empty",
            field,
        ));
    }
    if token.chars().any(char::is_uppercase) {
        return Err(ZoneRiskError::config_field(
            format!("pattern token '{token}' must be lowercase"),
            field,
        ));
    }
    Ok(())
}

/// Validate that a sequence of thresholds is strictly monotonically
/// decreasing, per the catalog's threshold-band invariant.
pub fn validate_monotonic_decreasing(values: &[(&str, i64)], field: &str) -> Result<()> {
    for window in values.windows(2) {
        let (name_hi, hi) = window[0];
        let (name_lo, lo) = window[1];
        if hi <= lo {
            return Err(ZoneRiskError::config_field(
                format!(
                    "threshold '{name_hi}' ({hi}) must be strictly greater than '{name_lo}' ({lo})"
                ),
                field,
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero() {
        assert!(validate_positive_usize(0, "chunk_size").is_err());
        assert!(validate_positive_usize(1, "chunk_size").is_ok());
    }

    #[test]
    fn rejects_uppercase_token() {
        assert!(validate_lowercase_token("OLD-", "patterns.prefixes.high").is_err());
        assert!(validate_lowercase_token("old-", "patterns.prefixes.high").is_ok());
    }

    #[test]
    fn rejects_empty_token() {
        assert!(validate_lowercase_token("", "patterns.prefixes.high").is_err());
    }

    #[test]
    fn monotonic_thresholds() {
        let ok = [("critical", 90), ("high", 70), ("medium", 40), ("low", 10)];
        assert!(validate_monotonic_decreasing(&ok, "thresholds").is_ok());

        let bad = [("critical", 90), ("high", 90)];
        assert!(validate_monotonic_decreasing(&bad, "thresholds").is_err());
    }
}
