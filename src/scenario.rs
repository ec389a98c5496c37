//! Scenario orchestration: one navigation, one submission, one verdict.
//!
//! A scenario composes the two independently asynchronous observations —
//! the rendered page's eventual visual state and the backend's eventual
//! persisted record — into a single pass/fail verdict. The two sides keep
//! separate bounded waits and separate diagnostics on purpose: a UI-side
//! divergence points at rendering/validation bugs, a backend-side
//! divergence at processing bugs.
//!
//! Mismatches are verdict data. Only infrastructural failures (broken
//! session, dead database) escape as errors, because retrying them cannot
//! help.

use crate::data::CardInput;
use crate::db::{BackendVerifier, RecordKind, TransactionRecord};
use crate::error::Result;
use crate::flow::OutcomePanel;
use crate::nav::Navigator;
use crate::wait::{WaitConfig, UI_TIMEOUT};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which entry path the scenario takes from the landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryPath {
    /// Direct payment.
    Payment,
    /// Purchase on credit.
    Credit,
}

impl EntryPath {
    /// The backend record kind this path produces.
    #[must_use]
    pub fn record_kind(self) -> RecordKind {
        match self {
            EntryPath::Payment => RecordKind::Payment,
            EntryPath::Credit => RecordKind::Credit,
        }
    }
}

/// The expected terminal UI state after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiExpectation {
    /// The success banner appears.
    Success,
    /// The error banner appears (and the success banner does not).
    Error,
    /// The inline validation message equals this text; the submission is
    /// rejected client-side before any banner.
    InlineMessage(String),
}

/// The expected backend-persisted state after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendExpectation {
    /// Expected record status; `None` means no record may appear at all
    /// (the submission must never reach the backend).
    pub status: Option<String>,
    /// Whether the order's generated id must be present.
    pub id_present: bool,
}

impl BackendExpectation {
    /// A record with the given status must appear.
    #[must_use]
    pub fn record(status: impl Into<String>, id_present: bool) -> Self {
        Self {
            status: Some(status.into()),
            id_present,
        }
    }

    /// No record may ever appear.
    #[must_use]
    pub fn no_record() -> Self {
        Self {
            status: None,
            id_present: false,
        }
    }
}

/// The full expected verdict shape for one scenario, as supplied by a row
/// of the driving test-case table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    /// Expected UI observation.
    pub ui: UiExpectation,
    /// Expected backend observation.
    pub backend: BackendExpectation,
}

impl Expectation {
    /// Success banner, `APPROVED` record with a generated id.
    #[must_use]
    pub fn approved() -> Self {
        Self {
            ui: UiExpectation::Success,
            backend: BackendExpectation::record("APPROVED", true),
        }
    }

    /// Error banner, `DECLINED` record without a generated id.
    #[must_use]
    pub fn declined() -> Self {
        Self {
            ui: UiExpectation::Error,
            backend: BackendExpectation::record("DECLINED", false),
        }
    }

    /// Error banner and no backend record: the number failed basic
    /// validation, so the backend was never contacted.
    #[must_use]
    pub fn rejected() -> Self {
        Self {
            ui: UiExpectation::Error,
            backend: BackendExpectation::no_record(),
        }
    }

    /// Inline validation message and no backend record.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            ui: UiExpectation::InlineMessage(message.into()),
            backend: BackendExpectation::no_record(),
        }
    }
}

/// One half of a verdict: what was expected, what was observed, and
/// whether they agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSide {
    /// Whether observation matched expectation.
    pub matched: bool,
    /// Human-readable expectation.
    pub expected: String,
    /// Human-readable observation.
    pub observed: String,
}

impl CheckSide {
    fn new(matched: bool, expected: impl Into<String>, observed: impl Into<String>) -> Self {
        Self {
            matched,
            expected: expected.into(),
            observed: observed.into(),
        }
    }
}

/// The verdict for one scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Conjunction: both sides matched.
    pub passed: bool,
    /// UI-side observation vs expectation.
    pub ui: CheckSide,
    /// Backend-side observation vs expectation.
    pub backend: CheckSide,
}

impl Verdict {
    /// Names the diverging side(s) for triage, or `None` when passed.
    #[must_use]
    pub fn diagnostic(&self) -> Option<String> {
        if self.passed {
            return None;
        }

        let mut parts = Vec::new();
        if !self.ui.matched {
            parts.push(format!(
                "UI diverged: expected {}, observed {}",
                self.ui.expected, self.ui.observed
            ));
        }
        if !self.backend.matched {
            parts.push(format!(
                "backend diverged: expected {}, observed {}",
                self.backend.expected, self.backend.observed
            ));
        }
        Some(parts.join("; "))
    }
}

/// Compares an expected backend state against the observed record.
///
/// Kept free of I/O so the comparison matrix is unit-testable.
fn compare_backend(
    expectation: &BackendExpectation,
    observed: Option<&TransactionRecord>,
) -> CheckSide {
    match (&expectation.status, observed) {
        (None, None) => CheckSide::new(true, "no record", "no record"),
        (None, Some(record)) => CheckSide::new(
            false,
            "no record",
            format!("unexpected record with status '{}'", record.status),
        ),
        (Some(status), None) => CheckSide::new(
            false,
            format!("record with status '{status}'"),
            "no record within timeout",
        ),
        (Some(status), Some(record)) => {
            let status_ok = record.status == *status;
            let id_ok = record.record_id.is_some() == expectation.id_present;
            CheckSide::new(
                status_ok && id_ok,
                format!(
                    "status '{}', id {}",
                    status,
                    if expectation.id_present {
                        "present"
                    } else {
                        "absent"
                    }
                ),
                format!(
                    "status '{}', id {}",
                    record.status,
                    if record.record_id.is_some() {
                        "present"
                    } else {
                        "absent"
                    }
                ),
            )
        }
    }
}

/// Runs complete scenarios: navigate, submit, observe the UI, cross-check
/// the backend.
///
/// One orchestrator per scenario; the navigator's page and the verifier's
/// store must not be shared with a concurrently running scenario.
pub struct Orchestrator {
    navigator: Navigator,
    verifier: BackendVerifier,
}

impl Orchestrator {
    /// Composes a scenario runner from its two collaborators.
    pub fn new(navigator: Navigator, verifier: BackendVerifier) -> Self {
        Self {
            navigator,
            verifier,
        }
    }

    /// The backend verifier, exposed for scenario teardown (purging the
    /// record tables between scenarios).
    #[must_use]
    pub fn verifier(&self) -> &BackendVerifier {
        &self.verifier
    }

    /// Runs one scenario end to end and reports its verdict.
    ///
    /// Order is fixed: open the landing page, enter via `entry`, fill and
    /// submit `card`, observe the UI (bounded by the 12-second UI timeout),
    /// then verify the backend. UI observation always precedes backend
    /// observation, so by the time the store is read the backend round
    /// trip — if the submission triggered one — has completed.
    ///
    /// # Errors
    ///
    /// Infrastructural failures only; a mismatched expectation is a failed
    /// verdict, not an error.
    pub async fn run(
        &self,
        entry: EntryPath,
        card: &CardInput,
        expectation: &Expectation,
    ) -> Result<Verdict> {
        info!(?entry, number = %card.number, "running scenario");

        let start = self.navigator.open_start().await?;
        let form = match entry {
            EntryPath::Payment => start.choose_payment().await?,
            EntryPath::Credit => start.choose_credit().await?,
        };
        let outcome = form.fill(card).await?;

        let ui = self.observe_ui(&outcome, &expectation.ui).await?;
        let backend = self
            .verify_backend(entry.record_kind(), &expectation.backend)
            .await?;

        let verdict = Verdict {
            passed: ui.matched && backend.matched,
            ui,
            backend,
        };

        match verdict.diagnostic() {
            None => info!("scenario passed"),
            Some(diagnostic) => info!(%diagnostic, "scenario failed"),
        }

        Ok(verdict)
    }

    async fn observe_ui(
        &self,
        outcome: &OutcomePanel<'_>,
        expected: &UiExpectation,
    ) -> Result<CheckSide> {
        match expected {
            UiExpectation::Success => {
                let visible = outcome.success_visible(UI_TIMEOUT).await?;
                Ok(CheckSide::new(
                    visible,
                    "success banner visible",
                    if visible {
                        "success banner visible"
                    } else {
                        "success banner not visible within timeout"
                    },
                ))
            }
            UiExpectation::Error => {
                let error_shown = outcome.error_visible(UI_TIMEOUT).await?;
                // The error banner must not be accompanied by a success
                // banner; error_visible has already dismissed the former.
                let success_absent = outcome.success_not_visible().await?;
                let matched = error_shown && success_absent;
                Ok(CheckSide::new(
                    matched,
                    "error banner visible, success banner absent",
                    match (error_shown, success_absent) {
                        (true, true) => "error banner visible, success banner absent".to_string(),
                        (true, false) => "error and success banners both visible".to_string(),
                        (false, _) => "error banner not visible within timeout".to_string(),
                    },
                ))
            }
            UiExpectation::InlineMessage(message) => {
                let matched = outcome.inline_message_equals(message, UI_TIMEOUT).await?;
                let observed = if matched {
                    format!("inline message '{message}'")
                } else {
                    match outcome.inline_message().await? {
                        Some(actual) => format!("inline message '{actual}'"),
                        None => "no inline message".to_string(),
                    }
                };
                Ok(CheckSide::new(
                    matched,
                    format!("inline message '{message}'"),
                    observed,
                ))
            }
        }
    }

    async fn verify_backend(
        &self,
        kind: RecordKind,
        expectation: &BackendExpectation,
    ) -> Result<CheckSide> {
        if expectation.status.is_none() {
            // The UI already reached a terminal state, so any backend round
            // trip has completed; table emptiness is taken as proof the
            // submission never reached the backend. Documented assumption —
            // the backend sends no explicit negative acknowledgment.
            let exists = self.verifier.orders_exist().await?;
            return Ok(if exists {
                CheckSide::new(false, "no record", "order table not empty")
            } else {
                CheckSide::new(true, "no record", "no record")
            });
        }

        let wait = self
            .verifier
            .wait_for_record(kind, WaitConfig::with_timeout(UI_TIMEOUT))
            .await?;
        Ok(compare_backend(expectation, wait.value.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: &str, id: Option<&str>) -> TransactionRecord {
        TransactionRecord {
            kind: RecordKind::Payment,
            status: status.to_string(),
            record_id: id.map(str::to_string),
        }
    }

    #[test]
    fn entry_paths_map_to_record_kinds() {
        assert_eq!(EntryPath::Payment.record_kind(), RecordKind::Payment);
        assert_eq!(EntryPath::Credit.record_kind(), RecordKind::Credit);
    }

    #[test]
    fn approved_record_with_id_matches() {
        let side = compare_backend(
            &BackendExpectation::record("APPROVED", true),
            Some(&record("APPROVED", Some("pay-1"))),
        );
        assert!(side.matched);
    }

    #[test]
    fn status_mismatch_is_reported_with_both_values() {
        let side = compare_backend(
            &BackendExpectation::record("APPROVED", true),
            Some(&record("DECLINED", Some("pay-1"))),
        );
        assert!(!side.matched);
        assert!(side.expected.contains("APPROVED"));
        assert!(side.observed.contains("DECLINED"));
    }

    #[test]
    fn unexpected_id_presence_fails_the_side() {
        let side = compare_backend(
            &BackendExpectation::record("DECLINED", false),
            Some(&record("DECLINED", Some("pay-1"))),
        );
        assert!(!side.matched);
    }

    #[test]
    fn absence_matches_no_record_expectation() {
        let side = compare_backend(&BackendExpectation::no_record(), None);
        assert!(side.matched);
    }

    #[test]
    fn surprise_record_fails_no_record_expectation() {
        let side = compare_backend(
            &BackendExpectation::no_record(),
            Some(&record("APPROVED", None)),
        );
        assert!(!side.matched);
    }

    #[test]
    fn missing_record_fails_record_expectation() {
        let side = compare_backend(&BackendExpectation::record("APPROVED", true), None);
        assert!(!side.matched);
        assert!(side.observed.contains("no record"));
    }

    #[test]
    fn verdict_diagnostic_names_the_diverging_side() {
        let verdict = Verdict {
            passed: false,
            ui: CheckSide::new(true, "success banner visible", "success banner visible"),
            backend: CheckSide::new(false, "status 'APPROVED'", "no record within timeout"),
        };

        let diagnostic = verdict.diagnostic().expect("failed verdict diagnoses");
        assert!(diagnostic.contains("backend diverged"));
        assert!(!diagnostic.contains("UI diverged"));
    }

    #[test]
    fn passing_verdict_has_no_diagnostic() {
        let verdict = Verdict {
            passed: true,
            ui: CheckSide::new(true, "x", "x"),
            backend: CheckSide::new(true, "y", "y"),
        };
        assert!(verdict.diagnostic().is_none());
    }

    #[test]
    fn expectation_presets_encode_the_fixture_table() {
        let approved = Expectation::approved();
        assert_eq!(approved.ui, UiExpectation::Success);
        assert_eq!(approved.backend.status.as_deref(), Some("APPROVED"));
        assert!(approved.backend.id_present);

        let declined = Expectation::declined();
        assert_eq!(declined.ui, UiExpectation::Error);
        assert!(!declined.backend.id_present);

        let rejected = Expectation::rejected();
        assert!(rejected.backend.status.is_none());
    }
}
