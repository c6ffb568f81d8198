// ✅ Account Validation Service
// Classifier + IBAN validator + bank registry + holder lookup → ValidationResult
//
// Decision table:
//   Iban, checksum fails                  → InvalidChecksum
//   Iban, checksum ok, bank unknown       → UnknownBank
//   Iban, checksum ok, bank known         → valid, confidence = iban_confidence
//   Account number, no bank selected      → BankSelectionRequired
//   Account number, unknown SWIFT         → UnknownBank
//   Account number, known SWIFT           → valid, confidence = account_number_confidence
//   Unrecognized                          → InvalidFormat
//
// Validation outcomes are data. Only collaborator failures come back as Err.

use crate::classifier::{AccountClassifier, ClassifiedInput, InputKind};
use crate::config::ValidationConfig;
use crate::entities::bank::{BankRecord, BankRegistry};
use crate::entities::beneficiary::mask_account;
use crate::lookup::{AccountHolderLookup, AccountIdentity, LookupError, MockHolderLookup};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// ERROR KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Neither IBAN nor account-number shape
    InvalidFormat,

    /// IBAN-shaped input failing MOD97 (or the exact-length check)
    InvalidChecksum,

    /// Bank code / SWIFT not in the registry
    UnknownBank,

    /// Local account number without a chosen bank (blocking, not "invalid")
    BankSelectionRequired,

    /// Holder lookup did not answer in time
    LookupTimeout,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::InvalidFormat => "InvalidFormat",
            ValidationErrorKind::InvalidChecksum => "InvalidChecksum",
            ValidationErrorKind::UnknownBank => "UnknownBank",
            ValidationErrorKind::BankSelectionRequired => "BankSelectionRequired",
            ValidationErrorKind::LookupTimeout => "LookupTimeout",
        }
    }

    /// Localisation key for the inline message
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationErrorKind::InvalidFormat => "validation.invalid_format",
            ValidationErrorKind::InvalidChecksum => "validation.invalid_checksum",
            ValidationErrorKind::UnknownBank => "validation.unknown_bank",
            ValidationErrorKind::BankSelectionRequired => "validation.bank_selection_required",
            ValidationErrorKind::LookupTimeout => "validation.lookup_timeout",
        }
    }
}

// ============================================================================
// VALIDATION RESULT
// ============================================================================

/// Outcome of one validation. Always replaces the previous one.
///
/// Outside the pending state exactly one of `bank_details` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub account_title: Option<String>,
    pub bank_details: Option<BankRecord>,
    pub error: Option<ValidationErrorKind>,

    /// 0-100, advisory only; never used for branching
    pub confidence: Option<u8>,
}

impl ValidationResult {
    /// Nothing validated yet
    pub fn pending() -> Self {
        ValidationResult {
            is_valid: false,
            account_title: None,
            bank_details: None,
            error: None,
            confidence: None,
        }
    }

    pub fn valid(bank: BankRecord, account_title: String, confidence: u8) -> Self {
        ValidationResult {
            is_valid: true,
            account_title: Some(account_title),
            bank_details: Some(bank),
            error: None,
            confidence: Some(confidence.min(100)),
        }
    }

    pub fn invalid(kind: ValidationErrorKind) -> Self {
        ValidationResult {
            is_valid: false,
            account_title: None,
            bank_details: None,
            error: Some(kind),
            confidence: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.bank_details.is_none() && self.error.is_none()
    }

    pub fn bank_name(&self) -> Option<&str> {
        self.bank_details.as_ref().map(|b| b.name.as_str())
    }
}

// ============================================================================
// SERVICE
// ============================================================================

/// Stateless apart from shared, read-only collaborators: same input ⇒ same output
#[derive(Clone)]
pub struct AccountValidationService {
    registry: Arc<BankRegistry>,
    lookup: Arc<dyn AccountHolderLookup>,
    classifier: AccountClassifier,
    config: ValidationConfig,
}

impl AccountValidationService {
    pub fn new(
        registry: Arc<BankRegistry>,
        lookup: Arc<dyn AccountHolderLookup>,
        config: ValidationConfig,
    ) -> Self {
        AccountValidationService {
            registry,
            lookup,
            classifier: AccountClassifier::from_config(&config),
            config,
        }
    }

    /// Seeded registry + mock lookup with the configured latency
    pub fn with_mock_lookup(config: ValidationConfig) -> Self {
        let lookup = MockHolderLookup::new(config.lookup_delay());
        Self::new(Arc::new(BankRegistry::new()), Arc::new(lookup), config)
    }

    pub fn registry(&self) -> &BankRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn classify(&self, raw: &str) -> ClassifiedInput {
        self.classifier.classify(raw)
    }

    /// Classify then validate
    pub async fn validate_raw(
        &self,
        raw: &str,
        selected_bank_swift: Option<&str>,
    ) -> Result<ValidationResult, LookupError> {
        let input = self.classify(raw);
        self.validate(&input, selected_bank_swift).await
    }

    pub async fn validate(
        &self,
        input: &ClassifiedInput,
        selected_bank_swift: Option<&str>,
    ) -> Result<ValidationResult, LookupError> {
        let (bank, identity, confidence) = match self.resolve(input, selected_bank_swift) {
            Ok(resolved) => resolved,
            Err(kind) => {
                debug!(
                    "Validation of {} ({}) failed: {}",
                    mask_account(&input.normalized),
                    input.kind.as_str(),
                    kind.as_str()
                );
                return Ok(ValidationResult::invalid(kind));
            }
        };

        let title = match self.lookup_holder(&identity).await? {
            Some(title) => title,
            None => return Ok(ValidationResult::invalid(ValidationErrorKind::LookupTimeout)),
        };

        debug!(
            "Validated {} at {} (confidence {})",
            mask_account(&input.normalized),
            bank.name,
            confidence
        );
        Ok(ValidationResult::valid(bank, title, confidence))
    }

    /// Pure part of the decision table
    fn resolve(
        &self,
        input: &ClassifiedInput,
        selected_bank_swift: Option<&str>,
    ) -> Result<(BankRecord, AccountIdentity, u8), ValidationErrorKind> {
        match input.kind {
            InputKind::Iban => {
                let format = &self.config.iban_format;
                if !format.validate(&input.normalized) {
                    return Err(ValidationErrorKind::InvalidChecksum);
                }

                let bank = format
                    .extract_bank_code(&input.normalized)
                    .and_then(|code| self.registry.lookup_by_bank_code(&code))
                    .ok_or(ValidationErrorKind::UnknownBank)?;

                Ok((
                    bank.clone(),
                    AccountIdentity::Iban(input.normalized.clone()),
                    self.config.iban_confidence,
                ))
            }

            InputKind::LocalAccountNumber => {
                let swift = selected_bank_swift
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or(ValidationErrorKind::BankSelectionRequired)?;

                let bank = self
                    .registry
                    .lookup_by_swift(swift)
                    .ok_or(ValidationErrorKind::UnknownBank)?;

                Ok((
                    bank.clone(),
                    AccountIdentity::LocalAccount {
                        account_number: input.normalized.clone(),
                        swift_code: bank.swift_code.clone(),
                    },
                    self.config.account_number_confidence,
                ))
            }

            InputKind::Unrecognized => Err(ValidationErrorKind::InvalidFormat),
        }
    }

    /// Ok(None) means the lookup timed out
    async fn lookup_holder(&self, identity: &AccountIdentity) -> Result<Option<String>, LookupError> {
        let timeout = self.config.lookup_timeout();

        match tokio::time::timeout(timeout, self.lookup.lookup_holder_name(identity)).await {
            Ok(Ok(name)) => Ok(Some(name)),
            Ok(Err(LookupError::Timeout(_))) | Err(_) => {
                warn!("Holder lookup timed out after {:?}", timeout);
                Ok(None)
            }
            Ok(Err(e)) => {
                warn!("Holder lookup failed: {}", e);
                Err(e)
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
