// ⏱️ Debounced Live Validation
//
// Each keystroke supersedes the previous one:
// - pending task for the old input is aborted
// - every request gets a monotonically increasing sequence number
// - a response is published only while its sequence number is still current,
//   and never over an outcome with a higher sequence number
//
// The last input wins; an earlier in-flight validation can't overwrite it.

use crate::classifier::ClassifiedInput;
use crate::entities::beneficiary::mask_account;
use crate::lookup::LookupError;
use crate::validation::{AccountValidationService, ValidationResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

// ============================================================================
// SEQUENCER
// ============================================================================

/// Issues request sequence numbers and answers "is this still the latest?"
#[derive(Debug, Default)]
pub struct ValidationSequencer {
    current: AtomicU64,
}

impl ValidationSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request; every earlier one becomes stale
    pub fn next(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Make every issued sequence stale without starting a request
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, sequence: u64) -> bool {
        self.current.load(Ordering::SeqCst) == sequence
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

// ============================================================================
// LIVE OUTCOME
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LiveOutcome {
    pub sequence: u64,
    pub raw_input: String,
    pub selected_bank_swift: Option<String>,
    pub classified: ClassifiedInput,
    pub result: Result<ValidationResult, LookupError>,
}

// ============================================================================
// DEBOUNCED VALIDATOR
// ============================================================================

/// Validates the account field while the user types
///
/// `submit` must be called from within a Tokio runtime.
pub struct DebouncedValidator {
    service: Arc<AccountValidationService>,
    sequencer: Arc<ValidationSequencer>,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
    tx: Arc<watch::Sender<Option<LiveOutcome>>>,
}

impl DebouncedValidator {
    pub fn new(service: Arc<AccountValidationService>) -> Self {
        let debounce = service.config().debounce();
        Self::with_debounce(service, debounce)
    }

    pub fn with_debounce(service: Arc<AccountValidationService>, debounce: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        DebouncedValidator {
            service,
            sequencer: Arc::new(ValidationSequencer::new()),
            debounce,
            pending: None,
            tx: Arc::new(tx),
        }
    }

    /// Receiver that sees every published (non-stale) outcome
    pub fn subscribe(&self) -> watch::Receiver<Option<LiveOutcome>> {
        self.tx.subscribe()
    }

    /// Most recent published outcome
    pub fn latest(&self) -> Option<LiveOutcome> {
        self.tx.borrow().clone()
    }

    /// True while a debounce or validation is in progress
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Schedule validation of `raw`, superseding any earlier request
    ///
    /// Returns the request's sequence number.
    pub fn submit(&mut self, raw: &str, selected_bank_swift: Option<String>) -> u64 {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }

        let sequence = self.next_sequence();
        let raw = raw.to_string();
        let service = Arc::clone(&self.service);
        let sequencer = Arc::clone(&self.sequencer);
        let tx = Arc::clone(&self.tx);
        let debounce = self.debounce;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if !sequencer.is_current(sequence) {
                return;
            }

            let classified = service.classify(&raw);
            let result = service
                .validate(&classified, selected_bank_swift.as_deref())
                .await;

            if !sequencer.is_current(sequence) {
                debug!(
                    "Dropping stale validation #{} for {}",
                    sequence,
                    mask_account(&classified.normalized)
                );
                return;
            }

            let outcome = LiveOutcome {
                sequence,
                raw_input: raw,
                selected_bank_swift,
                classified,
                result,
            };

            // Sequence changes happen under the same lock, so this check and the
            // write are atomic with respect to submit() and cancel()
            tx.send_if_modified(|slot| {
                if !sequencer.is_current(sequence) {
                    return false;
                }
                match slot {
                    Some(existing) if existing.sequence > outcome.sequence => false,
                    _ => {
                        *slot = Some(outcome);
                        true
                    }
                }
            });
        }));

        sequence
    }

    /// Issue the next sequence number while holding the channel lock
    fn next_sequence(&self) -> u64 {
        let sequencer = &self.sequencer;
        let mut sequence = 0;
        self.tx.send_if_modified(|_| {
            sequence = sequencer.next();
            false
        });
        sequence
    }

    /// Abort pending work and make in-flight responses stale
    pub fn cancel(&mut self) {
        let sequencer = &self.sequencer;
        self.tx.send_if_modified(|_| {
            sequencer.invalidate();
            false
        });
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for DebouncedValidator {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// TESTS
// ============================================================================
