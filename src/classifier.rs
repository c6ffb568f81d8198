// 🏷️ Account Classifier - IBAN vs local account number
// Cheap, format-only pre-classification of what the user typed.
// Full validity is decided later by the IBAN validator and the validation service.

use crate::config::ValidationConfig;
use crate::iban;
use serde::{Deserialize, Serialize};

// ============================================================================
// INPUT KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    /// Starts with the country prefix and is long enough to be an IBAN
    Iban,

    /// A run of digits with no letters
    LocalAccountNumber,

    /// Anything else
    Unrecognized,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Iban => "iban",
            InputKind::LocalAccountNumber => "local-account-number",
            InputKind::Unrecognized => "unrecognized",
        }
    }
}

// ============================================================================
// CLASSIFIED INPUT
// ============================================================================

/// Result of classifying one raw input. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassifiedInput {
    pub kind: InputKind,

    /// Uppercased, whitespace-stripped input
    pub normalized: String,
}

impl ClassifiedInput {
    pub fn is_iban(&self) -> bool {
        self.kind == InputKind::Iban
    }

    pub fn is_local_account(&self) -> bool {
        self.kind == InputKind::LocalAccountNumber
    }
}

// ============================================================================
// CLASSIFIER
// ============================================================================

#[derive(Debug, Clone)]
pub struct AccountClassifier {
    country_prefix: String,
    iban_min_len: usize,
    min_account_digits: usize,
    max_account_digits: usize,
}

impl AccountClassifier {
    /// Classifier with the UAE defaults (AE prefix, ≥ 20 chars, 6-16 digits)
    pub fn new() -> Self {
        Self::from_config(&ValidationConfig::default())
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        AccountClassifier {
            country_prefix: config.iban_format.country_code.clone(),
            iban_min_len: config.iban_detection_min_len,
            min_account_digits: config.min_account_digits,
            max_account_digits: config.max_account_digits,
        }
    }

    /// Total: always returns a value, `Unrecognized` by default
    pub fn classify(&self, raw: &str) -> ClassifiedInput {
        let normalized = iban::normalize(raw);

        let kind = if normalized.starts_with(&self.country_prefix)
            && normalized.len() >= self.iban_min_len
        {
            InputKind::Iban
        } else if (self.min_account_digits..=self.max_account_digits)
            .contains(&normalized.len())
            && normalized.bytes().all(|b| b.is_ascii_digit())
        {
            InputKind::LocalAccountNumber
        } else {
            InputKind::Unrecognized
        };

        ClassifiedInput { kind, normalized }
    }
}

impl Default for AccountClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify with the default UAE rules
pub fn classify(raw: &str) -> ClassifiedInput {
    AccountClassifier::new().classify(raw)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_iban() {
        let result = classify("AE070331234567890123456");
        assert_eq!(result.kind, InputKind::Iban);
        assert_eq!(result.normalized, "AE070331234567890123456");
    }

    #[test]
    fn test_classify_local_account() {
        let result = classify("1234567890");
        assert_eq!(result.kind, InputKind::LocalAccountNumber);
        assert!(result.is_local_account());
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(classify("not an account").kind, InputKind::Unrecognized);
        assert_eq!(classify("").kind, InputKind::Unrecognized);
        assert_eq!(classify("12345").kind, InputKind::Unrecognized); // too few digits
        assert_eq!(classify("12345A7890").kind, InputKind::Unrecognized);
    }

    #[test]
    fn test_tolerant_iban_detection() {
        // 20 chars is enough to be an IBAN candidate, even if not valid yet
        let partial = classify("AE0703312345678901234");
        assert_eq!(partial.kind, InputKind::Iban);

        // Too short to be considered an IBAN
        assert_eq!(classify("AE07033").kind, InputKind::Unrecognized);
    }

    #[test]
    fn test_normalization_idempotent() {
        let canonical = classify("AE070331234567890123456");
        let messy = classify("  ae07 0331 2345 6789 0123 456 ");
        assert_eq!(canonical, messy);

        let digits = classify("9876543210");
        let spaced = classify(" 9876 5432 10\t");
        assert_eq!(digits, spaced);
    }

    #[test]
    fn test_custom_thresholds() {
        let config = ValidationConfig {
            min_account_digits: 8,
            ..ValidationConfig::default()
        };
        let classifier = AccountClassifier::from_config(&config);

        assert_eq!(classifier.classify("1234567").kind, InputKind::Unrecognized);
        assert_eq!(
            classifier.classify("12345678").kind,
            InputKind::LocalAccountNumber
        );
    }

    #[test]
    fn test_overlong_digit_run_unrecognized() {
        assert_eq!(
            classify("1234567890123456").kind,
            InputKind::LocalAccountNumber
        );
        assert_eq!(classify("12345678901234567").kind, InputKind::Unrecognized);
        assert_eq!(
            classify("12345678901234567890123456").kind,
            InputKind::Unrecognized
        );

        let config = ValidationConfig {
            max_account_digits: 20,
            ..ValidationConfig::default()
        };
        let classifier = AccountClassifier::from_config(&config);
        assert_eq!(
            classifier.classify("12345678901234567").kind,
            InputKind::LocalAccountNumber
        );
    }
}
