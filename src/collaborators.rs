// 🔌 Collaborators - beneficiary store, navigation, localisation
//
// The wizard depends on these interfaces but owns none of the concerns:
// persistence, routing and string tables live elsewhere in the app.
// The implementations here are in-memory / static and back the CLI and tests.

use crate::entities::beneficiary::Beneficiary;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

// ============================================================================
// BENEFICIARY STORE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("beneficiary store unavailable: {0}")]
    Unavailable(String),

    #[error("beneficiary with account {0} already exists")]
    Duplicate(String),
}

#[async_trait]
pub trait BeneficiaryStore: Send + Sync {
    async fn save(&self, beneficiary: &Beneficiary) -> Result<(), StoreError>;
}

/// Append-only in-memory store
#[derive(Debug, Clone, Default)]
pub struct InMemoryBeneficiaryStore {
    records: Arc<RwLock<Vec<Beneficiary>>>,
}

impl InMemoryBeneficiaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far
    pub fn all(&self) -> Vec<Beneficiary> {
        match self.records.read() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn count(&self) -> usize {
        self.all().len()
    }

    /// Find by IBAN or account number
    pub fn find_by_account(&self, account: &str) -> Option<Beneficiary> {
        self.all()
            .into_iter()
            .find(|b| b.account_reference() == Some(account))
    }
}

#[async_trait]
impl BeneficiaryStore for InMemoryBeneficiaryStore {
    async fn save(&self, beneficiary: &Beneficiary) -> Result<(), StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;

        let account = beneficiary.account_reference();
        if account.is_some()
            && records
                .iter()
                .any(|b| b.account_reference() == account && b.bank_code == beneficiary.bank_code)
        {
            return Err(StoreError::Duplicate(beneficiary.masked_account()));
        }

        records.push(beneficiary.clone());
        Ok(())
    }
}

// ============================================================================
// NAVIGATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    BeneficiaryList,
    AmountEntry,
}

impl Screen {
    /// Route id understood by the app's navigator
    pub fn id(&self) -> &'static str {
        match self {
            Screen::BeneficiaryList => "beneficiary-list",
            Screen::AmountEntry => "amount-entry",
        }
    }
}

pub trait Navigator: Send + Sync {
    fn navigate_to(&self, screen: Screen, params: Option<Value>);
}

/// Records every navigation request (CLI + tests)
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    calls: Arc<Mutex<Vec<(Screen, Option<Value>)>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(Screen, Option<Value>)> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<(Screen, Option<Value>)> {
        self.calls().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, screen: Screen, params: Option<Value>) {
        tracing::info!("Navigate → {}", screen.id());
        match self.calls.lock() {
            Ok(mut calls) => calls.push((screen, params)),
            Err(poisoned) => poisoned.into_inner().push((screen, params)),
        }
    }
}

// ============================================================================
// LOCALISATION
// ============================================================================

pub trait Localizer: Send + Sync {
    /// Display string for `key`; unknown keys come back unchanged
    fn t(&self, key: &str) -> String;

    /// Right-to-left layout (text direction only, no logic branches on it)
    fn is_rtl(&self) -> bool;
}

const EN: &[(&str, &str)] = &[
    ("validation.invalid_format", "Enter a valid IBAN or account number"),
    ("validation.invalid_checksum", "This IBAN is not valid. Please check the number"),
    ("validation.unknown_bank", "We couldn't find this bank"),
    ("validation.bank_selection_required", "Select the beneficiary's bank"),
    ("validation.lookup_timeout", "Account verification is taking too long. Try again"),
    ("wizard.name_required", "Enter the beneficiary's full name"),
    ("wizard.invalid_email", "Enter a valid email address"),
    ("wizard.invalid_phone", "Enter a valid UAE mobile number"),
    ("wizard.service_unavailable", "Validation service unavailable. Try again later"),
    ("wizard.save_failed", "We couldn't save this beneficiary"),
    ("wizard.wrong_step", "This action isn't available on this step"),
    ("wizard.finished", "This beneficiary has already been saved"),
    ("wizard.step.account_entry", "Account details"),
    ("wizard.step.bank_selection", "Select bank"),
    ("wizard.step.personal_details", "Personal details"),
    ("wizard.step.review", "Review"),
    ("wizard.step.saved", "Beneficiary saved"),
];

const AR: &[(&str, &str)] = &[
    ("validation.invalid_format", "أدخل رقم آيبان أو رقم حساب صحيح"),
    ("validation.invalid_checksum", "رقم الآيبان غير صحيح. يرجى التحقق من الرقم"),
    ("validation.unknown_bank", "لم نتمكن من العثور على هذا البنك"),
    ("validation.bank_selection_required", "اختر بنك المستفيد"),
    ("validation.lookup_timeout", "التحقق من الحساب يستغرق وقتاً طويلاً. حاول مرة أخرى"),
    ("wizard.name_required", "أدخل الاسم الكامل للمستفيد"),
    ("wizard.invalid_email", "أدخل بريداً إلكترونياً صحيحاً"),
    ("wizard.invalid_phone", "أدخل رقم هاتف متحرك إماراتي صحيح"),
    ("wizard.service_unavailable", "خدمة التحقق غير متاحة. حاول لاحقاً"),
    ("wizard.save_failed", "تعذر حفظ هذا المستفيد"),
    ("wizard.wrong_step", "هذا الإجراء غير متاح في هذه الخطوة"),
    ("wizard.finished", "تم حفظ هذا المستفيد بالفعل"),
    ("wizard.step.account_entry", "تفاصيل الحساب"),
    ("wizard.step.bank_selection", "اختر البنك"),
    ("wizard.step.personal_details", "البيانات الشخصية"),
    ("wizard.step.review", "مراجعة"),
    ("wizard.step.saved", "تم حفظ المستفيد"),
];

/// Fixed string table for one language
#[derive(Debug, Clone)]
pub struct StaticLocalizer {
    language: String,
    rtl: bool,
    strings: HashMap<&'static str, &'static str>,
}

impl StaticLocalizer {
    pub fn english() -> Self {
        StaticLocalizer {
            language: "en".to_string(),
            rtl: false,
            strings: EN.iter().copied().collect(),
        }
    }

    pub fn arabic() -> Self {
        StaticLocalizer {
            language: "ar".to_string(),
            rtl: true,
            strings: AR.iter().copied().collect(),
        }
    }

    /// "ar" → Arabic, everything else → English
    pub fn for_language(language: &str) -> Self {
        if language.eq_ignore_ascii_case("ar") {
            Self::arabic()
        } else {
            Self::english()
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Localizer for StaticLocalizer {
    fn t(&self, key: &str) -> String {
        self.strings
            .get(key)
            .map(|s| s.to_string())
            .unwrap_or_else(|| key.to_string())
    }

    fn is_rtl(&self) -> bool {
        self.rtl
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::bank::BankRegistry;
    use crate::entities::beneficiary::{BeneficiaryAccountType, BeneficiaryDraft};

    fn beneficiary(account: &str) -> Beneficiary {
        let registry = BankRegistry::new();
        let bank = registry.lookup_by_bank_code("033").unwrap();
        Beneficiary::from_draft(
            &BeneficiaryDraft::new(),
            "Test".to_string(),
            account,
            BeneficiaryAccountType::AccountNumber,
            bank,
            false,
        )
    }

    #[tokio::test]
    async fn test_store_save_and_find() {
        let store = InMemoryBeneficiaryStore::new();
        store.save(&beneficiary("1111222233")).await.unwrap();

        assert_eq!(store.count(), 1);
        assert!(store.find_by_account("1111222233").is_some());
        assert!(store.find_by_account("9999").is_none());
    }

    #[tokio::test]
    async fn test_store_rejects_duplicate_account() {
        let store = InMemoryBeneficiaryStore::new();
        store.save(&beneficiary("1111222233")).await.unwrap();

        let result = store.save(&beneficiary("1111222233")).await;
        assert_eq!(result, Err(StoreError::Duplicate("*2233".to_string())));
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn test_store_clones_share_records() {
        let store = InMemoryBeneficiaryStore::new();
        let handle = store.clone();

        handle.save(&beneficiary("1111222233")).await.unwrap();
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_recording_navigator() {
        let nav = RecordingNavigator::new();
        nav.navigate_to(Screen::BeneficiaryList, None);
        nav.navigate_to(Screen::AmountEntry, Some(serde_json::json!({ "id": "x" })));

        assert_eq!(nav.calls().len(), 2);
        let (screen, params) = nav.last().unwrap();
        assert_eq!(screen.id(), "amount-entry");
        assert_eq!(params.unwrap()["id"], "x");
    }

    #[test]
    fn test_localizer_tables_cover_same_keys() {
        let en = StaticLocalizer::english();
        let ar = StaticLocalizer::arabic();

        for (key, _) in EN {
            assert!(ar.strings.contains_key(key), "missing Arabic string for {}", key);
        }
        assert_eq!(en.strings.len(), ar.strings.len());
        assert!(!en.is_rtl());
        assert!(ar.is_rtl());
    }

    #[test]
    fn test_unknown_key_echoed() {
        let en = StaticLocalizer::for_language("fr");
        assert_eq!(en.language(), "en");
        assert_eq!(en.t("no.such.key"), "no.such.key");
        assert_eq!(
            en.t("validation.unknown_bank"),
            "We couldn't find this bank"
        );
    }
}
