// Beneficiary Core - Core Library
// Account validation + add-beneficiary wizard for the send-money flow.
// Exposes all modules for use in the CLI, the app shell, and tests.

pub mod iban;          // IBAN structure + MOD97 checksum
pub mod classifier;    // IBAN vs local account number
pub mod config;        // Thresholds, timings, IBAN format
pub mod entities;      // Bank registry + beneficiary records
pub mod lookup;        // Account-holder name enquiry
pub mod validation;    // Decision table → ValidationResult
pub mod debounce;      // Live validation while typing
pub mod collaborators; // Store, navigation, localisation
pub mod wizard;        // Add-beneficiary state machine

use std::sync::Once;

// Re-export commonly used types
pub use iban::{
    compute_check_digits, extract_bank_code, format_iban, is_valid_iban, normalize,
    IbanFormat,
};
pub use classifier::{classify, AccountClassifier, ClassifiedInput, InputKind};
pub use config::ValidationConfig;
pub use entities::{
    BankRecord, BankRegistry, Beneficiary, BeneficiaryAccountType, BeneficiaryDraft,
    RegistryError, Relationship, TransferFrequency, TransferPurpose,
};
pub use lookup::{AccountHolderLookup, AccountIdentity, LookupError, MockHolderLookup};
pub use validation::{AccountValidationService, ValidationErrorKind, ValidationResult};
pub use debounce::{DebouncedValidator, LiveOutcome, ValidationSequencer};
pub use collaborators::{
    BeneficiaryStore, InMemoryBeneficiaryStore, Localizer, Navigator, RecordingNavigator,
    Screen, StaticLocalizer, StoreError,
};
pub use wizard::{BeneficiaryWizard, ReviewExit, WizardError, WizardStep};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

static TRACING_INIT: Once = Once::new();

/// Install the fmt subscriber once; `RUST_LOG` overrides the default level
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "beneficiary_core=info".parse() {
            filter = filter.add_directive(directive);
        }

        // Another subscriber may already be installed by the host app
        let _ = fmt().with_env_filter(filter).try_init();
    });
}
