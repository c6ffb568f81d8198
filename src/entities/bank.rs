// 🏦 Bank Registry - local bank code → bank metadata
//
// Static reference data, loaded once and never mutated by users.
//
// Problem solved:
// - "AE07 033 ..." → bank code 033 → Emirates NBD
// - "ADCBAEAA" picked in the bank list → ADCB Bank
// - Exact matching only: unknown codes are None, never a default bank

use crate::iban;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// BANK RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankRecord {
    /// Display name (e.g., "Emirates NBD")
    pub name: String,

    /// 3-digit code embedded in the IBAN, unique in the registry
    pub local_bank_code: String,

    /// SWIFT/BIC, unique in the registry
    pub swift_code: String,

    /// ISO 3166-1 alpha-2
    pub country: String,

    /// ISO 4217
    pub currency: String,

    /// Branch shown on the review screen
    pub sample_branch: String,
}

impl BankRecord {
    pub fn new(
        name: &str,
        local_bank_code: &str,
        swift_code: &str,
        sample_branch: &str,
    ) -> Self {
        BankRecord {
            name: name.to_string(),
            local_bank_code: local_bank_code.to_string(),
            swift_code: swift_code.to_string(),
            country: "AE".to_string(),
            currency: "AED".to_string(),
            sample_branch: sample_branch.to_string(),
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("bank code {0} is already registered")]
    DuplicateBankCode(String),

    #[error("SWIFT code {0} is already registered")]
    DuplicateSwiftCode(String),

    #[error("bank code must be 3 digits, got {0:?}")]
    MalformedBankCode(String),
}

// ============================================================================
// BANK REGISTRY
// ============================================================================

/// Registry of known banks
///
/// Built once at startup (seed data or a JSON file) and then only read.
/// Share it behind an `Arc` between the validation service and the UI.
#[derive(Debug, Clone)]
pub struct BankRegistry {
    banks: Vec<BankRecord>,
}

impl BankRegistry {
    /// Registry with the six seeded UAE banks
    pub fn new() -> Self {
        let mut registry = BankRegistry::empty();
        registry.register_default_banks();
        registry
    }

    pub fn empty() -> Self {
        BankRegistry { banks: Vec::new() }
    }

    fn register_default_banks(&mut self) {
        let seed = [
            BankRecord::new("Emirates NBD", "033", "EBILAEAD", "Deira Branch, Dubai"),
            BankRecord::new("ADCB Bank", "030", "ADCBAEAA", "Khalidiya Branch, Abu Dhabi"),
            BankRecord::new("First Abu Dhabi Bank", "035", "NBADAEAA", "Corniche Branch, Abu Dhabi"),
            BankRecord::new("RAKBANK", "040", "NRAKAEAK", "Al Nakheel Branch, Ras Al Khaimah"),
            BankRecord::new("Mashreq Bank", "046", "BOMLAEAD", "Bur Dubai Branch, Dubai"),
            BankRecord::new("Commercial Bank of Dubai", "023", "CBDUAEAD", "Al Ittihad Street Branch, Dubai"),
        ];

        for bank in seed {
            if let Err(e) = self.register(bank) {
                tracing::warn!("Skipping seed bank: {}", e);
            }
        }
    }

    /// Load banks from a JSON array of `BankRecord`s
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read bank file: {:?}", path.as_ref()))?;

        let banks: Vec<BankRecord> =
            serde_json::from_str(&content).context("Failed to parse bank JSON")?;

        BankRegistry::from_records(banks).context("Invalid bank registry")
    }

    pub fn from_records(banks: Vec<BankRecord>) -> std::result::Result<Self, RegistryError> {
        let mut registry = BankRegistry::empty();
        for bank in banks {
            registry.register(bank)?;
        }
        Ok(registry)
    }

    /// Add a bank, keeping codes and SWIFT codes unique
    pub fn register(&mut self, bank: BankRecord) -> std::result::Result<(), RegistryError> {
        if bank.local_bank_code.len() != 3
            || !bank.local_bank_code.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(RegistryError::MalformedBankCode(bank.local_bank_code));
        }

        if self.banks.iter().any(|b| b.local_bank_code == bank.local_bank_code) {
            return Err(RegistryError::DuplicateBankCode(bank.local_bank_code));
        }

        if self
            .banks
            .iter()
            .any(|b| b.swift_code.eq_ignore_ascii_case(&bank.swift_code))
        {
            return Err(RegistryError::DuplicateSwiftCode(bank.swift_code));
        }

        self.banks.push(bank);
        Ok(())
    }

    /// Exact match on the 3-digit local code
    pub fn lookup_by_bank_code(&self, code: &str) -> Option<&BankRecord> {
        self.banks.iter().find(|b| b.local_bank_code == code)
    }

    /// Exact match on SWIFT code (case-insensitive, surrounding spaces ignored)
    pub fn lookup_by_swift(&self, swift: &str) -> Option<&BankRecord> {
        let swift = swift.trim();
        self.banks
            .iter()
            .find(|b| b.swift_code.eq_ignore_ascii_case(swift))
    }

    /// Bank for a shape-valid UAE IBAN (does not check the checksum)
    pub fn lookup_by_iban(&self, iban: &str) -> Option<&BankRecord> {
        iban::extract_bank_code(iban).and_then(|code| self.lookup_by_bank_code(&code))
    }

    /// All banks sorted by name (bank picker order)
    pub fn all_banks(&self) -> Vec<&BankRecord> {
        let mut banks: Vec<&BankRecord> = self.banks.iter().collect();
        banks.sort_by(|a, b| a.name.cmp(&b.name));
        banks
    }

    pub fn count(&self) -> usize {
        self.banks.len()
    }
}

impl Default for BankRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iban::IbanFormat;
    use std::io::Write;

    #[test]
    fn test_registry_initialization() {
        let registry = BankRegistry::new();

        assert_eq!(registry.count(), 6);

        let names: Vec<&str> = registry.all_banks().iter().map(|b| b.name.as_str()).collect();
        assert!(names.contains(&"Emirates NBD"));
        assert!(names.contains(&"ADCB Bank"));
        assert!(names.contains(&"RAKBANK"));
    }

    #[test]
    fn test_lookup_by_bank_code() {
        let registry = BankRegistry::new();

        let enbd = registry.lookup_by_bank_code("033").unwrap();
        assert_eq!(enbd.name, "Emirates NBD");
        assert_eq!(enbd.swift_code, "EBILAEAD");
        assert_eq!(enbd.currency, "AED");

        // No fuzzy matching
        assert!(registry.lookup_by_bank_code("33").is_none());
        assert!(registry.lookup_by_bank_code("0033").is_none());
        assert!(registry.lookup_by_bank_code("999").is_none());
    }

    #[test]
    fn test_lookup_by_swift() {
        let registry = BankRegistry::new();

        assert_eq!(registry.lookup_by_swift("ADCBAEAA").unwrap().name, "ADCB Bank");
        assert_eq!(registry.lookup_by_swift("adcbaeaa").unwrap().name, "ADCB Bank");
        assert!(registry.lookup_by_swift("XXXXAEAA").is_none());
        assert!(registry.lookup_by_swift("").is_none());
    }

    #[test]
    fn test_round_trip_through_synthetic_iban() {
        let registry = BankRegistry::new();
        let format = IbanFormat::uae();

        for bank in registry.all_banks() {
            let iban = format.build(&bank.local_bank_code, "1234567890123456").unwrap();
            assert!(iban::is_valid_iban(&iban));

            let code = iban::extract_bank_code(&iban).unwrap();
            assert_eq!(registry.lookup_by_bank_code(&code), Some(bank));
            assert_eq!(registry.lookup_by_iban(&iban), Some(bank));
        }
    }

    #[test]
    fn test_codes_unique() {
        let registry = BankRegistry::new();
        let banks = registry.all_banks();

        for (i, a) in banks.iter().enumerate() {
            for b in &banks[i + 1..] {
                assert_ne!(a.local_bank_code, b.local_bank_code);
                assert_ne!(a.swift_code, b.swift_code);
            }
        }
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = BankRegistry::new();

        let same_code = BankRecord::new("Copy", "033", "COPYAEAA", "Nowhere");
        assert_eq!(
            registry.register(same_code),
            Err(RegistryError::DuplicateBankCode("033".to_string()))
        );

        let same_swift = BankRecord::new("Copy", "099", "ebilaead", "Nowhere");
        assert!(matches!(
            registry.register(same_swift),
            Err(RegistryError::DuplicateSwiftCode(_))
        ));

        let malformed = BankRecord::new("Bad", "9A9", "BADXAEAA", "Nowhere");
        assert!(matches!(
            registry.register(malformed),
            Err(RegistryError::MalformedBankCode(_))
        ));

        assert_eq!(registry.count(), 6);
    }

    #[test]
    fn test_register_extends_registry() {
        let mut registry = BankRegistry::new();
        registry
            .register(BankRecord::new("Dubai Islamic Bank", "024", "DUIBAEAD", "Head Office, Dubai"))
            .unwrap();

        assert_eq!(registry.count(), 7);
        assert_eq!(
            registry.lookup_by_bank_code("024").unwrap().name,
            "Dubai Islamic Bank"
        );
    }

    #[test]
    fn test_from_file() {
        let records = vec![
            BankRecord::new("Emirates NBD", "033", "EBILAEAD", "Deira Branch, Dubai"),
            BankRecord::new("ADCB Bank", "030", "ADCBAEAA", "Khalidiya Branch, Abu Dhabi"),
        ];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&records).unwrap()).unwrap();

        let registry = BankRegistry::from_file(file.path()).unwrap();
        assert_eq!(registry.count(), 2);
        assert!(registry.lookup_by_swift("ADCBAEAA").is_some());
    }

    #[test]
    fn test_from_file_rejects_duplicates() {
        let records = vec![
            BankRecord::new("A", "033", "AAAAAEAA", "x"),
            BankRecord::new("B", "033", "BBBBAEAA", "y"),
        ];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&records).unwrap()).unwrap();

        assert!(BankRegistry::from_file(file.path()).is_err());
    }
}
