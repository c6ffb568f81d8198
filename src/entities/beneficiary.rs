// 👤 Beneficiary - wizard draft + saved recipient record
//
// BeneficiaryDraft: owned by the wizard, mutated step by step, never persisted.
// Beneficiary: what the beneficiary store receives once the wizard completes.

use crate::classifier::InputKind;
use crate::entities::bank::BankRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// VOCABULARIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relationship {
    Family,
    Friend,
    Business,
    Employee,
    Myself,
    Other,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Family => "Family",
            Relationship::Friend => "Friend",
            Relationship::Business => "Business",
            Relationship::Employee => "Employee",
            Relationship::Myself => "Self",
            Relationship::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferPurpose {
    FamilySupport,
    Salary,
    Education,
    Medical,
    Rent,
    Business,
    Savings,
    Other,
}

impl TransferPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferPurpose::FamilySupport => "Family Support",
            TransferPurpose::Salary => "Salary",
            TransferPurpose::Education => "Education",
            TransferPurpose::Medical => "Medical",
            TransferPurpose::Rent => "Rent",
            TransferPurpose::Business => "Business",
            TransferPurpose::Savings => "Savings",
            TransferPurpose::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferFrequency {
    Frequent,
    Occasional,
    /// Never paid yet
    New,
}

impl TransferFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferFrequency::Frequent => "Frequent",
            TransferFrequency::Occasional => "Occasional",
            TransferFrequency::New => "New",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeneficiaryAccountType {
    Iban,
    AccountNumber,
}

impl BeneficiaryAccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeneficiaryAccountType::Iban => "IBAN",
            BeneficiaryAccountType::AccountNumber => "Account Number",
        }
    }
}

// ============================================================================
// DRAFT
// ============================================================================

/// Working state of the add-beneficiary wizard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeneficiaryDraft {
    /// Raw text from the account field, as typed
    pub account_input: String,

    /// Kind of the last classified input (None until classified)
    pub classified_kind: Option<InputKind>,

    /// SWIFT code picked in the bank list; required for local account numbers
    pub selected_bank_swift: Option<String>,

    pub full_name: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<Relationship>,
    pub purpose: Option<TransferPurpose>,
}

impl BeneficiaryDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank selection is only mandatory for the local account-number path
    pub fn requires_bank_selection(&self) -> bool {
        self.classified_kind == Some(InputKind::LocalAccountNumber)
    }

    /// Name to show: typed full name, otherwise the looked-up account title
    pub fn display_name(&self, account_title: Option<&str>) -> Option<String> {
        let typed = self.full_name.trim();
        if !typed.is_empty() {
            return Some(typed.to_string());
        }

        account_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }
}

// ============================================================================
// BENEFICIARY
// ============================================================================

/// Saved money-transfer recipient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub id: String,
    pub name: String,
    pub nickname: Option<String>,
    pub bank: String,
    pub bank_code: String,
    pub account_number: Option<String>,
    pub iban: Option<String>,
    pub is_starred: bool,

    /// None until the first payment
    pub last_used: Option<DateTime<Utc>>,

    pub country: String,
    pub currency: String,
    pub account_type: BeneficiaryAccountType,
    pub is_verified: bool,
    pub frequency: TransferFrequency,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<Relationship>,
    pub purpose: Option<TransferPurpose>,
    pub created_at: DateTime<Utc>,
}

impl Beneficiary {
    /// Build a record from a completed draft and the bank it resolved to
    ///
    /// `normalized_account` is the classified (normalized) account input;
    /// it lands in `iban` or `account_number` depending on `account_type`.
    pub fn from_draft(
        draft: &BeneficiaryDraft,
        name: String,
        normalized_account: &str,
        account_type: BeneficiaryAccountType,
        bank: &BankRecord,
        is_verified: bool,
    ) -> Self {
        let (iban, account_number) = match account_type {
            BeneficiaryAccountType::Iban => (Some(normalized_account.to_string()), None),
            BeneficiaryAccountType::AccountNumber => (None, Some(normalized_account.to_string())),
        };

        Beneficiary {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            nickname: draft.nickname.clone().filter(|n| !n.trim().is_empty()),
            bank: bank.name.clone(),
            bank_code: bank.local_bank_code.clone(),
            account_number,
            iban,
            is_starred: false,
            last_used: None,
            country: bank.country.clone(),
            currency: bank.currency.clone(),
            account_type,
            is_verified,
            frequency: TransferFrequency::New,
            email: draft.email.clone().filter(|e| !e.trim().is_empty()),
            phone: draft.phone.clone().filter(|p| !p.trim().is_empty()),
            relationship: draft.relationship,
            purpose: draft.purpose,
            created_at: Utc::now(),
        }
    }

    /// Account reference as stored (IBAN preferred)
    pub fn account_reference(&self) -> Option<&str> {
        self.iban.as_deref().or(self.account_number.as_deref())
    }

    pub fn masked_account(&self) -> String {
        self.account_reference()
            .map(mask_account)
            .unwrap_or_default()
    }
}

// ============================================================================
// FORM HELPERS
// ============================================================================

/// Mask account number (show only last 4 characters)
///
/// Example: "1234567890" → "*7890"
pub fn mask_account(full_number: &str) -> String {
    let chars: Vec<char> = full_number.chars().collect();
    if chars.len() <= 4 {
        return full_number.to_string();
    }
    let last4: String = chars[chars.len() - 4..].iter().collect();
    format!("*{}", last4)
}

/// Loose e-mail shape check: local@domain.tld, no spaces
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .rsplit_once('.')
                    .map(|(host, tld)| !host.is_empty() && tld.len() >= 2)
                    .unwrap_or(false)
        }
        None => false,
    }
}

/// UAE mobile number: +9715XXXXXXXX, 009715XXXXXXXX or 05XXXXXXXX
///
/// Spaces, dashes and parentheses are ignored.
pub fn is_plausible_uae_mobile(phone: &str) -> bool {
    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    let national = if let Some(rest) = compact.strip_prefix("+971") {
        rest
    } else if let Some(rest) = compact.strip_prefix("00971") {
        rest
    } else if let Some(rest) = compact.strip_prefix('0') {
        rest
    } else {
        return false;
    };

    national.len() == 9
        && national.starts_with('5')
        && national.bytes().all(|b| b.is_ascii_digit())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn enbd() -> BankRecord {
        BankRecord::new("Emirates NBD", "033", "EBILAEAD", "Deira Branch, Dubai")
    }

    #[test]
    fn test_draft_starts_empty() {
        let draft = BeneficiaryDraft::new();
        assert!(draft.account_input.is_empty());
        assert!(draft.classified_kind.is_none());
        assert!(!draft.requires_bank_selection());
    }

    #[test]
    fn test_requires_bank_selection() {
        let mut draft = BeneficiaryDraft::new();
        draft.classified_kind = Some(InputKind::LocalAccountNumber);
        assert!(draft.requires_bank_selection());

        draft.classified_kind = Some(InputKind::Iban);
        assert!(!draft.requires_bank_selection());
    }

    #[test]
    fn test_display_name_prefers_typed_name() {
        let mut draft = BeneficiaryDraft::new();
        assert_eq!(draft.display_name(None), None);
        assert_eq!(draft.display_name(Some("  ")), None);
        assert_eq!(
            draft.display_name(Some("Ahmed Al Mansoori")),
            Some("Ahmed Al Mansoori".to_string())
        );

        draft.full_name = "  Sara  ".to_string();
        assert_eq!(draft.display_name(Some("Ahmed Al Mansoori")), Some("Sara".to_string()));
    }

    #[test]
    fn test_from_draft_iban() {
        let mut draft = BeneficiaryDraft::new();
        draft.nickname = Some("Mom".to_string());
        draft.email = Some("".to_string());
        draft.relationship = Some(Relationship::Family);

        let b = Beneficiary::from_draft(
            &draft,
            "Fatima Hassan".to_string(),
            "AE070331234567890123456",
            BeneficiaryAccountType::Iban,
            &enbd(),
            true,
        );

        assert!(!b.id.is_empty());
        assert_eq!(b.bank, "Emirates NBD");
        assert_eq!(b.bank_code, "033");
        assert_eq!(b.iban.as_deref(), Some("AE070331234567890123456"));
        assert!(b.account_number.is_none());
        assert_eq!(b.nickname.as_deref(), Some("Mom"));
        assert!(b.email.is_none()); // blank dropped
        assert_eq!(b.currency, "AED");
        assert_eq!(b.frequency, TransferFrequency::New);
        assert!(!b.is_starred);
        assert!(b.last_used.is_none());
        assert_eq!(b.masked_account(), "*3456");
    }

    #[test]
    fn test_from_draft_account_number() {
        let draft = BeneficiaryDraft::new();
        let b = Beneficiary::from_draft(
            &draft,
            "Omar".to_string(),
            "9876543210",
            BeneficiaryAccountType::AccountNumber,
            &enbd(),
            false,
        );

        assert!(b.iban.is_none());
        assert_eq!(b.account_reference(), Some("9876543210"));
        assert_eq!(b.account_type.as_str(), "Account Number");
    }

    #[test]
    fn test_mask_account() {
        assert_eq!(mask_account("1234567890"), "*7890");
        assert_eq!(mask_account("1234"), "1234");
        assert_eq!(mask_account(""), "");
    }

    #[test]
    fn test_email_shape() {
        assert!(is_plausible_email("someone@example.ae"));
        assert!(is_plausible_email(" a.b@mail.co.uk "));
        assert!(!is_plausible_email("someone"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("a@@b.com"));
        assert!(!is_plausible_email("a b@c.com"));
    }

    #[test]
    fn test_uae_mobile() {
        assert!(is_plausible_uae_mobile("+971 50 123 4567"));
        assert!(is_plausible_uae_mobile("00971501234567"));
        assert!(is_plausible_uae_mobile("050-123-4567"));
        assert!(!is_plausible_uae_mobile("+971 4 123 4567")); // landline
        assert!(!is_plausible_uae_mobile("12345"));
        assert!(!is_plausible_uae_mobile("+44 7700 900123"));
    }
}
