//! Client-side record cache with optimistic appends.
//!
//! A submission moves through `Idle -> Pending -> Committed | RolledBack ->
//! Idle`. While pending, the new row is shown with a temporary identity taken
//! from the client clock. A successful write invalidates the cache and
//! refetches the authoritative list; a failed write restores the snapshot
//! taken before the row was added. Nothing is retried.

use chrono::Utc;
use serde_json::{Map, Value};

use crate::client::RecordTransport;
use crate::error::ClientError;
use crate::filter::{FilterCriteria, Filterable, apply_filters};
use crate::record::Record;

/// A row of the client-side cache
#[derive(Clone, Debug, PartialEq)]
pub enum CacheEntry {
    /// A record as returned by the server
    Stored(Record),
    /// A submitted row not yet confirmed, keyed by a client-local id
    Tentative {
        temp_id: i64,
        fields: Map<String, Value>,
    },
}

impl CacheEntry {
    pub fn fields(&self) -> &Map<String, Value> {
        match self {
            CacheEntry::Stored(record) => &record.fields,
            CacheEntry::Tentative { fields, .. } => fields,
        }
    }

    pub fn is_tentative(&self) -> bool {
        matches!(self, CacheEntry::Tentative { .. })
    }
}

impl Filterable for CacheEntry {
    fn filter_row(&self) -> crate::filter::FilterRow {
        match self {
            CacheEntry::Stored(record) => record.filter_row(),
            CacheEntry::Tentative { fields, .. } => {
                Record::from_submission(0, Value::Object(fields.clone())).filter_row()
            }
        }
    }
}

/// Where the current submission stands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Pending { temp_id: i64 },
}

/// How a pending submission ended
#[derive(Debug)]
pub enum Reconciliation {
    /// The server stored the record; the cache was refetched
    Committed(Record),
    /// The write failed; the cache was restored to its snapshot
    RolledBack(ClientError),
}

/// Context of an optimistic write, consumed by [`RecordTable::reconcile`]
#[derive(Debug)]
#[must_use = "a pending submission must be reconciled"]
pub struct PendingSubmission {
    temp_id: i64,
    previous: Option<Vec<CacheEntry>>,
}

impl PendingSubmission {
    pub fn temp_id(&self) -> i64 {
        self.temp_id
    }
}

/// Cached record list plus the submission state machine
pub struct RecordTable<T: RecordTransport> {
    transport: T,
    cache: Option<Vec<CacheEntry>>,
    stale: bool,
    state: SubmissionState,
}

impl<T: RecordTransport> RecordTable<T> {
    pub fn new(transport: T) -> Self {
        RecordTable {
            transport,
            cache: None,
            stale: true,
            state: SubmissionState::Idle,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current cache contents; empty until the first fetch
    pub fn rows(&self) -> &[CacheEntry] {
        self.cache.as_deref().unwrap_or(&[])
    }

    /// Whether the cache needs a refetch
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Replace the cache wholesale
    pub fn set_rows(&mut self, rows: Vec<CacheEntry>) {
        self.cache = Some(rows);
        self.stale = false;
    }

    /// Mark the cache as out of date without touching its contents
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Cached rows that pass every criterion
    pub fn filtered(&self, criteria: &FilterCriteria) -> Vec<&CacheEntry> {
        apply_filters(self.rows(), criteria)
    }

    /// Fetch the authoritative list and replace the cache with it
    ///
    /// # Errors
    /// * Returns the transport error; the cache is left as it was
    pub async fn refresh(&mut self) -> Result<&[CacheEntry], ClientError> {
        let records = self.transport.fetch_records().await?;
        self.set_rows(records.into_iter().map(CacheEntry::Stored).collect());
        Ok(self.rows())
    }

    /// Show a submission immediately, before the server has answered
    ///
    /// Snapshots the cache, appends the submission with a temporary id
    /// derived from the client clock and moves to `Pending`.
    ///
    /// # Arguments
    /// * `submission` - The form values being submitted
    ///
    /// # Returns
    /// * `PendingSubmission` - Context needed to commit or roll back
    pub fn submit_optimistic(&mut self, submission: &Value) -> PendingSubmission {
        let previous = self.cache.clone();
        let temp_id = Utc::now().timestamp_millis();

        let fields = match submission {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        let mut rows = previous.clone().unwrap_or_default();
        rows.push(CacheEntry::Tentative { temp_id, fields });
        self.cache = Some(rows);
        self.state = SubmissionState::Pending { temp_id };

        PendingSubmission { temp_id, previous }
    }

    /// Settle a pending submission with the outcome of its network call
    ///
    /// On success the cache is invalidated and refetched, which drops the
    /// tentative row in favour of the server copy. On failure the cache is
    /// restored to the snapshot verbatim. Either way the state returns to
    /// `Idle`.
    ///
    /// # Errors
    /// * Returns an error only when the write succeeded but the refetch
    ///   failed; the cache then stays stale with the tentative row in it
    pub async fn reconcile(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<Record, ClientError>,
    ) -> Result<Reconciliation, ClientError> {
        self.state = SubmissionState::Idle;

        match outcome {
            Ok(record) => {
                self.invalidate();
                self.refresh().await?;
                Ok(Reconciliation::Committed(record))
            }
            Err(error) => {
                log::warn!(
                    "submission {} failed, restoring cache: {}",
                    pending.temp_id,
                    error
                );
                self.cache = pending.previous;
                Ok(Reconciliation::RolledBack(error))
            }
        }
    }

    /// Run a whole submission: optimistic write, network call, reconcile
    ///
    /// # Returns
    /// * `Result<Record, ClientError>` - The stored record, or the error that
    ///   caused the rollback (or the failed refetch)
    pub async fn submit(&mut self, submission: Value) -> Result<Record, ClientError> {
        let pending = self.submit_optimistic(&submission);
        let outcome = self.transport.append_record(&submission).await;

        match self.reconcile(pending, outcome).await? {
            Reconciliation::Committed(record) => Ok(record),
            Reconciliation::RolledBack(error) => Err(error),
        }
    }
}
