// 🔎 Account-Holder Lookup - external collaborator
//
// Given a structurally valid identity (IBAN, or account number + bank),
// returns the legal name on the account. The name is authoritative; the core
// never validates it.
//
// The mock keeps the interface honest (async, can be slow, can fail) while
// staying deterministic: the same identity always yields the same name.

use crate::entities::beneficiary::mask_account;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// IDENTITY
// ============================================================================

/// What the lookup is asked about
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountIdentity {
    /// Checksum-valid, normalized IBAN
    Iban(String),

    /// Local account number at an explicitly chosen bank
    LocalAccount {
        account_number: String,
        swift_code: String,
    },
}

impl AccountIdentity {
    /// Stable key used for hashing and logging
    pub fn key(&self) -> String {
        match self {
            AccountIdentity::Iban(iban) => format!("iban:{}", iban),
            AccountIdentity::LocalAccount {
                account_number,
                swift_code,
            } => format!("acct:{}:{}", swift_code.to_uppercase(), account_number),
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Exceptional lookup failures (not validation outcomes)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("account holder lookup unavailable: {0}")]
    Unavailable(String),

    #[error("account holder lookup timed out after {0:?}")]
    Timeout(Duration),
}

// ============================================================================
// COLLABORATOR INTERFACE
// ============================================================================

#[async_trait]
pub trait AccountHolderLookup: Send + Sync {
    async fn lookup_holder_name(&self, identity: &AccountIdentity) -> Result<String, LookupError>;
}

// ============================================================================
// MOCK IMPLEMENTATION
// ============================================================================

const MOCK_HOLDER_NAMES: &[&str] = &[
    "Ahmed Al Mansoori",
    "Fatima Hassan",
    "Mohammed Al Hashimi",
    "Aisha Rahman",
    "Omar Khalid",
    "Mariam Al Suwaidi",
    "Rajesh Kumar",
    "Sarah Johnson",
];

/// Deterministic stand-in for the bank's name-enquiry service
#[derive(Debug, Clone)]
pub struct MockHolderLookup {
    delay: Duration,
    names: Vec<String>,
}

impl MockHolderLookup {
    pub fn new(delay: Duration) -> Self {
        MockHolderLookup {
            delay,
            names: MOCK_HOLDER_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// No simulated latency (tests, CLI)
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Replace the name pool; an empty pool falls back to the default names
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        if !names.is_empty() {
            self.names = names;
        }
        self
    }

    /// Name chosen by hashing the identity key
    pub fn name_for(&self, identity: &AccountIdentity) -> String {
        let digest = Sha256::digest(identity.key().as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let index = (u64::from_be_bytes(prefix) % self.names.len() as u64) as usize;
        self.names[index].clone()
    }
}

impl Default for MockHolderLookup {
    fn default() -> Self {
        Self::new(Duration::from_millis(600))
    }
}

#[async_trait]
impl AccountHolderLookup for MockHolderLookup {
    async fn lookup_holder_name(&self, identity: &AccountIdentity) -> Result<String, LookupError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let name = self.name_for(identity);
        tracing::debug!("Mock holder lookup resolved {}", mask_account(&identity.key()));
        Ok(name)
    }
}

// ============================================================================
// TESTS
// ============================================================================
