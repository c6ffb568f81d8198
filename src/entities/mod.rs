// Entity Models
//
// - BankRecord / BankRegistry: static reference data (bank code, SWIFT)
// - BeneficiaryDraft / Beneficiary: wizard working state and saved recipient

pub mod bank;
pub mod beneficiary;

pub use bank::{BankRecord, BankRegistry, RegistryError};
pub use beneficiary::{
    Beneficiary, BeneficiaryAccountType, BeneficiaryDraft, Relationship, TransferFrequency,
    TransferPurpose,
};
