//! Backend persistence verification.
//!
//! The UI alone cannot prove what the payment backend decided: the true
//! outcome lives in the persistence store, one row appended per processed
//! submission. `BackendVerifier` polls the most recently created row for a
//! record kind and reports what it finds.
//!
//! "No rows yet" is a valid observation, not an error — an illegal
//! submission that the UI rejects client-side never reaches the backend and
//! therefore never produces a row. Only the connection itself failing is an
//! error, and it propagates uncaught.

use crate::error::Result;
use crate::wait::{wait_for_value, WaitConfig, WaitOutcome};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;

/// Which backend entity a verification reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    /// Direct card payment (`payment_entity`).
    Payment,
    /// Credit request (`credit_request_entity`).
    Credit,
}

impl RecordKind {
    /// Latest processing status for this kind.
    fn status_query(self) -> &'static str {
        match self {
            RecordKind::Payment => {
                "SELECT status FROM payment_entity ORDER BY created DESC LIMIT 1"
            }
            RecordKind::Credit => {
                "SELECT status FROM credit_request_entity ORDER BY created DESC LIMIT 1"
            }
        }
    }

    /// Generated id on the latest order row for this kind. The column is
    /// nullable: declined submissions produce an order row without an id.
    fn id_query(self) -> &'static str {
        match self {
            RecordKind::Payment => {
                "SELECT payment_id FROM order_entity ORDER BY created DESC LIMIT 1"
            }
            RecordKind::Credit => {
                "SELECT credit_id FROM order_entity ORDER BY created DESC LIMIT 1"
            }
        }
    }
}

/// The backend's persisted view of one submission attempt.
///
/// Exists if and only if the backend actually received and processed the
/// submission. Terminal once written: a settled record never changes, so
/// the first observation is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Which entity the record came from.
    pub kind: RecordKind,
    /// Processing status, e.g. `APPROVED` or `DECLINED`.
    pub status: String,
    /// Generated payment/credit id; absent for declined submissions.
    pub record_id: Option<String>,
}

/// Polls the persistence store for the backend's verdict on a submission.
///
/// Every read is a single `SELECT ... ORDER BY created DESC LIMIT 1` round
/// trip; no transactions are held. Concurrent scenarios against a shared
/// store would race on recency, so callers either serialize scenarios or
/// isolate the store per scenario.
pub struct BackendVerifier {
    pool: PgPool,
}

impl BackendVerifier {
    /// Connects to the backend store.
    ///
    /// # Errors
    ///
    /// Returns a database error if the URL is malformed or the store is
    /// unreachable.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self::new(pool))
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reads the most recently created record of `kind`, if any.
    pub async fn latest_record(&self, kind: RecordKind) -> Result<Option<TransactionRecord>> {
        let status: Option<String> = sqlx::query_scalar(kind.status_query())
            .fetch_optional(&self.pool)
            .await?;

        let Some(status) = status else {
            return Ok(None);
        };

        let record_id: Option<Option<String>> = sqlx::query_scalar(kind.id_query())
            .fetch_optional(&self.pool)
            .await?;

        Ok(Some(TransactionRecord {
            kind,
            status,
            record_id: record_id.flatten(),
        }))
    }

    /// Polls until a record of `kind` appears or the deadline elapses.
    ///
    /// Returns on the first observed record — records are terminal, so
    /// continuing to poll a settled row cannot change it; the caller
    /// compares it against expectations immediately (fail fast on
    /// mismatch). A timeout with no record is a normal outcome, the
    /// expected one for submissions the UI rejected client-side.
    ///
    /// # Errors
    ///
    /// Only infrastructural query failures.
    pub async fn wait_for_record(
        &self,
        kind: RecordKind,
        config: WaitConfig,
    ) -> Result<WaitOutcome<TransactionRecord>> {
        debug!("polling backend for {:?} record", kind);
        wait_for_value(move || self.latest_record(kind), config).await
    }

    /// Immediate emptiness probe: true if any order row exists.
    ///
    /// Used for negative assertions after the UI has reached a terminal
    /// state — at that point the backend round trip, if any, has completed.
    pub async fn orders_exist(&self) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM order_entity)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Deletes all rows from the three record tables.
    ///
    /// Scenario teardown: leaves the store empty so the next scenario's
    /// recency-keyed reads cannot observe stale rows.
    pub async fn purge(&self) -> Result<()> {
        sqlx::query("DELETE FROM order_entity")
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM payment_entity")
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM credit_request_entity")
            .execute(&self.pool)
            .await?;
        debug!("purged backend record tables");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_target_the_right_entities() {
        assert!(RecordKind::Payment.status_query().contains("payment_entity"));
        assert!(RecordKind::Credit
            .status_query()
            .contains("credit_request_entity"));
        assert!(RecordKind::Payment.id_query().contains("payment_id"));
        assert!(RecordKind::Credit.id_query().contains("credit_id"));
    }

    #[test]
    fn queries_read_most_recent_row_only() {
        for kind in [RecordKind::Payment, RecordKind::Credit] {
            for query in [kind.status_query(), kind.id_query()] {
                assert!(query.contains("ORDER BY created DESC"));
                assert!(query.contains("LIMIT 1"));
            }
        }
    }
}
