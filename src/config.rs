// ⚙️ Validation Config - presentation constants and timings
// Everything here is advisory or timing-related; no scoring formula is derived.

use crate::iban::IbanFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Confidence shown for a checksum-verified IBAN (0-100)
    pub iban_confidence: u8,

    /// Confidence shown when the bank was picked by the user (0-100)
    pub account_number_confidence: u8,

    /// Quiet period after the last keystroke before validating
    pub debounce_ms: u64,

    /// Simulated latency of the mock holder-name lookup
    pub lookup_delay_ms: u64,

    /// Upper bound for one holder-name lookup
    pub lookup_timeout_ms: u64,

    /// Minimum digits for the local account-number shape
    pub min_account_digits: usize,

    /// Maximum digits for the local account-number shape
    pub max_account_digits: usize,

    /// Minimum length before a country-prefixed input counts as an IBAN candidate
    pub iban_detection_min_len: usize,

    /// Country-specific IBAN shape
    pub iban_format: IbanFormat,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            iban_confidence: 95,
            account_number_confidence: 88,
            debounce_ms: 800,
            lookup_delay_ms: 600,
            lookup_timeout_ms: 5000,
            min_account_digits: 6,
            max_account_digits: 16,
            iban_detection_min_len: 20,
            iban_format: IbanFormat::uae(),
        }
    }
}

impl ValidationConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: ValidationConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        if config.iban_confidence > 100 || config.account_number_confidence > 100 {
            anyhow::bail!("Confidence values must be between 0 and 100");
        }

        if config.min_account_digits > config.max_account_digits {
            anyhow::bail!(
                "min_account_digits ({}) exceeds max_account_digits ({})",
                config.min_account_digits,
                config.max_account_digits
            );
        }

        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn lookup_delay(&self) -> Duration {
        Duration::from_millis(self.lookup_delay_ms)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ValidationConfig::default();
        assert_eq!(config.iban_confidence, 95);
        assert_eq!(config.account_number_confidence, 88);
        assert_eq!(config.debounce(), Duration::from_millis(800));
        assert_eq!(config.iban_format.length, 23);
        assert_eq!(config.min_account_digits, 6);
        assert_eq!(config.max_account_digits, 16);
    }

    #[test]
    fn test_inverted_digit_range_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "min_account_digits": 12, "max_account_digits": 10 }}"#).unwrap();

        assert!(ValidationConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "iban_confidence": 99, "debounce_ms": 300 }}"#).unwrap();

        let config = ValidationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.iban_confidence, 99);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.account_number_confidence, 88);
        assert_eq!(config.iban_format, IbanFormat::uae());
    }

    #[test]
    fn test_out_of_range_confidence_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "iban_confidence": 150 }}"#).unwrap();

        assert!(ValidationConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = ValidationConfig::from_file("/nonexistent/config.json");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read config file"));
    }
}
