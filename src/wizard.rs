// 🧭 Beneficiary Wizard - explicit finite-state machine
//
//   AccountEntry ──(IBAN valid)──────────────────────┐
//        │                                            ▼
//        └─(account number, no bank)→ BankSelection → PersonalDetails → Review → Saved
//                                                                          └──→ SavedAndProceedToPay
//
// - Errors are inline and recoverable: they block the forward move, never the wizard
// - retreat() steps back exactly one visited step and never clears typed data
// - Coming back to AccountEntry drops the cached ValidationResult, so the next
//   advance() validates again
// - abandon() consumes the wizard: draft dropped, live validation cancelled,
//   nothing persisted

use crate::classifier::{ClassifiedInput, InputKind};
use crate::collaborators::{BeneficiaryStore, Localizer, Navigator, Screen};
use crate::debounce::{DebouncedValidator, LiveOutcome};
use crate::entities::beneficiary::{
    is_plausible_email, is_plausible_uae_mobile, mask_account, Beneficiary,
    BeneficiaryAccountType, BeneficiaryDraft, Relationship, TransferPurpose,
};
use crate::validation::{AccountValidationService, ValidationErrorKind, ValidationResult};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

// ============================================================================
// STEPS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    AccountEntry,
    BankSelection,
    PersonalDetails,
    Review,
    Saved,
    SavedAndProceedToPay,
}

impl WizardStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardStep::Saved | WizardStep::SavedAndProceedToPay)
    }

    pub fn title_key(&self) -> &'static str {
        match self {
            WizardStep::AccountEntry => "wizard.step.account_entry",
            WizardStep::BankSelection => "wizard.step.bank_selection",
            WizardStep::PersonalDetails => "wizard.step.personal_details",
            WizardStep::Review => "wizard.step.review",
            WizardStep::Saved | WizardStep::SavedAndProceedToPay => "wizard.step.saved",
        }
    }
}

/// How the review step is left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewExit {
    Save,
    SaveAndPay,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Inline, recoverable wizard errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("account validation failed: {}", .0.as_str())]
    Validation(ValidationErrorKind),

    #[error("beneficiary name is required")]
    NameRequired,

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("phone number is not a valid UAE mobile number")]
    InvalidPhone,

    #[error("validation service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("failed to save beneficiary: {0}")]
    SaveFailed(String),

    #[error("action not available on the {actual:?} step")]
    WrongStep { actual: WizardStep },

    #[error("wizard already finished")]
    Finished,
}

impl WizardError {
    pub fn message_key(&self) -> &'static str {
        match self {
            WizardError::Validation(kind) => kind.message_key(),
            WizardError::NameRequired => "wizard.name_required",
            WizardError::InvalidEmail => "wizard.invalid_email",
            WizardError::InvalidPhone => "wizard.invalid_phone",
            WizardError::ServiceUnavailable(_) => "wizard.service_unavailable",
            WizardError::SaveFailed(_) => "wizard.save_failed",
            WizardError::WrongStep { .. } => "wizard.wrong_step",
            WizardError::Finished => "wizard.finished",
        }
    }
}

// ============================================================================
// WIZARD
// ============================================================================

pub struct BeneficiaryWizard {
    step: WizardStep,
    history: Vec<WizardStep>,
    draft: BeneficiaryDraft,
    validation: ValidationResult,
    saved: Option<Beneficiary>,

    service: Arc<AccountValidationService>,
    store: Arc<dyn BeneficiaryStore>,
    navigator: Arc<dyn Navigator>,
    localizer: Arc<dyn Localizer>,
    live: DebouncedValidator,
}

impl BeneficiaryWizard {
    /// Start with an empty draft on AccountEntry
    pub fn new(
        service: Arc<AccountValidationService>,
        store: Arc<dyn BeneficiaryStore>,
        navigator: Arc<dyn Navigator>,
        localizer: Arc<dyn Localizer>,
    ) -> Self {
        let live = DebouncedValidator::new(Arc::clone(&service));

        BeneficiaryWizard {
            step: WizardStep::AccountEntry,
            history: Vec::new(),
            draft: BeneficiaryDraft::new(),
            validation: ValidationResult::pending(),
            saved: None,
            service,
            store,
            navigator,
            localizer,
            live,
        }
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    pub fn current_state(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &BeneficiaryDraft {
        &self.draft
    }

    /// Result of the last step validation (pending until one ran)
    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    /// Record produced by a completed wizard
    pub fn saved_beneficiary(&self) -> Option<&Beneficiary> {
        self.saved.as_ref()
    }

    /// Localised inline message for an error
    pub fn inline_message(&self, error: &WizardError) -> String {
        self.localizer.t(error.message_key())
    }

    pub fn step_title(&self) -> String {
        self.localizer.t(self.step.title_key())
    }

    /// Input fields mirror their text direction; nothing else depends on locale
    pub fn is_rtl(&self) -> bool {
        self.localizer.is_rtl()
    }

    // ------------------------------------------------------------------------
    // Draft edits
    // ------------------------------------------------------------------------

    /// Replace the account input; any previous validation is discarded
    pub fn set_account_input(&mut self, raw: &str) -> Result<(), WizardError> {
        self.ensure_step(&[WizardStep::AccountEntry])?;

        self.draft.account_input = raw.to_string();
        self.draft.classified_kind = Some(self.service.classify(raw).kind);
        self.validation = ValidationResult::pending();
        Ok(())
    }

    /// Keystroke path: update the input and schedule a debounced live validation
    ///
    /// Must be called from within a Tokio runtime.
    pub fn type_account_input(&mut self, raw: &str) -> Result<u64, WizardError> {
        self.set_account_input(raw)?;
        Ok(self
            .live
            .submit(raw, self.draft.selected_bank_swift.clone()))
    }

    /// Latest live outcome, only if it still matches the current input and bank
    pub fn live_result(&self) -> Option<LiveOutcome> {
        self.live.latest().filter(|outcome| {
            outcome.raw_input == self.draft.account_input
                && outcome.selected_bank_swift == self.draft.selected_bank_swift
        })
    }

    pub fn live_updates(&self) -> watch::Receiver<Option<LiveOutcome>> {
        self.live.subscribe()
    }

    /// Pick a bank from the list (SWIFT code); re-runs live validation for the current input
    ///
    /// Must be called from within a Tokio runtime once an account input is set.
    pub fn select_bank(&mut self, swift: &str) -> Result<(), WizardError> {
        self.ensure_step(&[WizardStep::AccountEntry, WizardStep::BankSelection])?;

        let swift = swift.trim();
        self.draft.selected_bank_swift = if swift.is_empty() {
            None
        } else {
            Some(swift.to_uppercase())
        };
        self.validation = ValidationResult::pending();

        if !self.draft.account_input.trim().is_empty() {
            self.live.submit(
                &self.draft.account_input,
                self.draft.selected_bank_swift.clone(),
            );
        }
        Ok(())
    }

    pub fn set_full_name(&mut self, name: &str) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.full_name = name.to_string();
        Ok(())
    }

    pub fn set_nickname(&mut self, nickname: Option<&str>) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.nickname = nickname.map(str::to_string);
        Ok(())
    }

    pub fn set_email(&mut self, email: Option<&str>) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.email = email.map(str::to_string);
        Ok(())
    }

    pub fn set_phone(&mut self, phone: Option<&str>) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.phone = phone.map(str::to_string);
        Ok(())
    }

    pub fn set_relationship(&mut self, relationship: Option<Relationship>) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.relationship = relationship;
        Ok(())
    }

    pub fn set_purpose(&mut self, purpose: Option<TransferPurpose>) -> Result<(), WizardError> {
        self.ensure_editable()?;
        self.draft.purpose = purpose;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Try to move forward one step; on error the wizard stays where it is
    ///
    /// On Review this saves (same as `save()`).
    pub async fn advance(&mut self) -> Result<WizardStep, WizardError> {
        match self.step {
            WizardStep::AccountEntry => self.advance_from_account_entry().await,
            WizardStep::BankSelection => self.advance_from_bank_selection().await,
            WizardStep::PersonalDetails => self.advance_from_personal_details(),
            WizardStep::Review => self.finish(ReviewExit::Save).await,
            WizardStep::Saved | WizardStep::SavedAndProceedToPay => Err(WizardError::Finished),
        }
    }

    /// Step back one visited step; no-op on the first and on terminal steps
    pub fn retreat(&mut self) -> WizardStep {
        if self.step.is_terminal() {
            return self.step;
        }

        if let Some(previous) = self.history.pop() {
            debug!("Wizard {:?} ← {:?}", previous, self.step);
            self.step = previous;

            if previous == WizardStep::AccountEntry {
                // Input may change now; never replay the old result
                self.validation = ValidationResult::pending();
            }
        }

        self.step
    }

    pub async fn save(&mut self) -> Result<WizardStep, WizardError> {
        self.finish(ReviewExit::Save).await
    }

    pub async fn save_and_pay(&mut self) -> Result<WizardStep, WizardError> {
        self.finish(ReviewExit::SaveAndPay).await
    }

    /// User left the flow: drop the draft, cancel live validation, persist nothing
    pub fn abandon(mut self) {
        self.live.cancel();
        info!(
            "Beneficiary wizard abandoned on {:?} ({})",
            self.step,
            mask_account(&self.draft.account_input)
        );
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    async fn advance_from_account_entry(&mut self) -> Result<WizardStep, WizardError> {
        let classified = self.service.classify(&self.draft.account_input);
        self.draft.classified_kind = Some(classified.kind);
        self.validation = ValidationResult::pending();

        if classified.kind == InputKind::LocalAccountNumber
            && self.draft.selected_bank_swift.is_none()
        {
            return Ok(self.move_to(WizardStep::BankSelection));
        }

        self.validate_step(&classified).await?;
        Ok(self.move_to(WizardStep::PersonalDetails))
    }

    async fn advance_from_bank_selection(&mut self) -> Result<WizardStep, WizardError> {
        if self.draft.selected_bank_swift.is_none() {
            return Err(WizardError::Validation(
                ValidationErrorKind::BankSelectionRequired,
            ));
        }

        let classified = self.service.classify(&self.draft.account_input);
        self.validate_step(&classified).await?;
        Ok(self.move_to(WizardStep::PersonalDetails))
    }

    fn advance_from_personal_details(&mut self) -> Result<WizardStep, WizardError> {
        // The carried-over title stays derived; only typed text lives in the draft
        if self
            .draft
            .display_name(self.validation.account_title.as_deref())
            .is_none()
        {
            return Err(WizardError::NameRequired);
        }

        if let Some(email) = self.draft.email.as_deref().filter(|e| !e.trim().is_empty()) {
            if !is_plausible_email(email) {
                return Err(WizardError::InvalidEmail);
            }
        }

        if let Some(phone) = self.draft.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            if !is_plausible_uae_mobile(phone) {
                return Err(WizardError::InvalidPhone);
            }
        }

        Ok(self.move_to(WizardStep::Review))
    }

    /// Fresh validation; replaces the cached result whatever the outcome
    async fn validate_step(&mut self, classified: &ClassifiedInput) -> Result<(), WizardError> {
        let swift = self.draft.selected_bank_swift.clone();

        match self.service.validate(classified, swift.as_deref()).await {
            Ok(result) => {
                let error = result.error;
                self.validation = result;

                match error {
                    None => Ok(()),
                    Some(kind) => Err(WizardError::Validation(kind)),
                }
            }
            Err(e) => {
                warn!("Validation service unavailable: {}", e);
                self.validation = ValidationResult::pending();
                Err(WizardError::ServiceUnavailable(e.to_string()))
            }
        }
    }

    async fn finish(&mut self, exit: ReviewExit) -> Result<WizardStep, WizardError> {
        self.ensure_step(&[WizardStep::Review])?;

        let bank = self
            .validation
            .bank_details
            .clone()
            .ok_or(WizardError::Validation(
                self.validation
                    .error
                    .unwrap_or(ValidationErrorKind::InvalidFormat),
            ))?;

        let name = self
            .draft
            .display_name(self.validation.account_title.as_deref())
            .ok_or(WizardError::NameRequired)?;

        let classified = self.service.classify(&self.draft.account_input);
        let account_type = if classified.is_iban() {
            BeneficiaryAccountType::Iban
        } else {
            BeneficiaryAccountType::AccountNumber
        };

        let beneficiary = Beneficiary::from_draft(
            &self.draft,
            name,
            &classified.normalized,
            account_type,
            &bank,
            self.validation.account_title.is_some(),
        );

        self.store
            .save(&beneficiary)
            .await
            .map_err(|e| WizardError::SaveFailed(e.to_string()))?;

        info!(
            "Saved beneficiary {} ({} at {})",
            beneficiary.id,
            beneficiary.masked_account(),
            beneficiary.bank
        );

        let next = match exit {
            ReviewExit::Save => {
                self.navigator.navigate_to(
                    Screen::BeneficiaryList,
                    Some(serde_json::json!({ "highlight": beneficiary.id })),
                );
                WizardStep::Saved
            }
            ReviewExit::SaveAndPay => {
                let params = serde_json::to_value(&beneficiary)
                    .map(|b| serde_json::json!({ "beneficiary": b }))
                    .ok();
                self.navigator.navigate_to(Screen::AmountEntry, params);
                WizardStep::SavedAndProceedToPay
            }
        };

        self.saved = Some(beneficiary);
        Ok(self.move_to(next))
    }

    fn move_to(&mut self, next: WizardStep) -> WizardStep {
        debug!("Wizard {:?} → {:?}", self.step, next);
        self.history.push(self.step);
        self.step = next;
        self.step
    }

    fn ensure_step(&self, allowed: &[WizardStep]) -> Result<(), WizardError> {
        if self.step.is_terminal() {
            return Err(WizardError::Finished);
        }
        if allowed.contains(&self.step) {
            Ok(())
        } else {
            Err(WizardError::WrongStep { actual: self.step })
        }
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.step.is_terminal() {
            Err(WizardError::Finished)
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
