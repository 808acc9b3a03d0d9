use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use crate::error::HistoryError;
use crate::geometry::Rect;
use crate::identity::DocumentIdentity;
use crate::kv::{KeyValueStore, StoredValue};
use crate::position::{HistoryCollection, ReadingPosition};
use crate::snapshot::PositionSnapshot;

pub const HISTORY_KEY: &str = "history";
pub const LATEST_KEY: &str = "latest";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Accepted,
    /// Page index 0 cannot be told apart from a document that is still
    /// attaching to the viewer, so it is never written.
    SkippedZeroIndex,
    /// NaN or infinity somewhere in the snapshot; the previous record stays.
    SkippedNonFinite,
}

/// Storage failures are logged, never returned.
pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
    collection: HistoryCollection,
}

impl HistoryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            collection: HistoryCollection::default(),
        }
    }

    pub fn collection(&self) -> &HistoryCollection {
        &self.collection
    }

    pub fn latest_identity(&self) -> Option<DocumentIdentity> {
        self.collection.latest_identity
    }

    #[instrument(skip(self))]
    pub fn load(&mut self) -> &HistoryCollection {
        let positions = self.read_positions().unwrap_or_else(|err| {
            warn!(error = ?err, "history unavailable, starting empty");
            Vec::new()
        });
        let latest_identity = self.read_latest();
        self.collection = HistoryCollection {
            positions,
            latest_identity,
        };
        debug!(
            entries = self.collection.len(),
            latest = ?self.collection.latest_identity.map(|id| id.to_string()),
            "history loaded"
        );
        &self.collection
    }

    #[instrument(skip(self, identity, snapshot), fields(identity = %identity, page = snapshot.page_index))]
    pub fn save(&mut self, identity: DocumentIdentity, snapshot: &PositionSnapshot) -> SaveOutcome {
        if snapshot.page_index == 0 {
            debug!("save ignored");
            return SaveOutcome::SkippedZeroIndex;
        }
        if !snapshot.is_finite() {
            warn!("save ignored, snapshot has non-finite values");
            return SaveOutcome::SkippedNonFinite;
        }
        self.collection.upsert(identity, snapshot);
        self.collection.latest_identity = Some(identity);
        self.persist();
        debug!("save accepted");
        SaveOutcome::Accepted
    }

    pub fn lookup_by_identity(&self, identity: &DocumentIdentity) -> Option<&ReadingPosition> {
        self.collection.get(identity)
    }

    pub fn lookup_latest(&self) -> Option<&ReadingPosition> {
        self.collection.latest()
    }

    pub fn last_viewport_rect_for_latest(&self) -> Rect {
        self.lookup_latest()
            .map(|position| position.viewport_rect)
            .unwrap_or(Rect::ZERO)
    }

    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.collection.clear();
        for key in [HISTORY_KEY, LATEST_KEY] {
            if let Err(err) = self.kv.remove(key) {
                warn!(key, error = ?err, "failed to remove history record");
            }
        }
        if let Err(err) = self.kv.synchronize() {
            warn!(error = ?err, "failed to synchronize after reset");
        }
        debug!("history reset");
    }

    fn persist(&self) {
        if let Err(err) = self.write_positions() {
            warn!(error = ?err, "failed to persist history");
        }
        if let Some(latest) = self.collection.latest_identity {
            if let Err(err) = self.kv.set(LATEST_KEY, StoredValue::Text(latest.to_string())) {
                warn!(error = ?err, "failed to persist latest document");
            }
        }
        if let Err(err) = self.kv.synchronize() {
            warn!(error = ?err, "failed to synchronize history");
        }
    }

    fn write_positions(&self) -> Result<(), HistoryError> {
        let payload =
            serde_json::to_vec(&self.collection.positions).map_err(HistoryError::Serialization)?;
        self.kv
            .set(HISTORY_KEY, StoredValue::Data(payload))
            .map_err(|source| HistoryError::Storage {
                key: HISTORY_KEY,
                source,
            })
    }

    fn read_positions(&self) -> Result<Vec<ReadingPosition>, HistoryError> {
        let stored = self
            .kv
            .get(HISTORY_KEY)
            .map_err(|source| HistoryError::Storage {
                key: HISTORY_KEY,
                source,
            })?;
        let decoded = match stored {
            None => return Ok(Vec::new()),
            Some(StoredValue::Data(bytes)) => serde_json::from_slice(&bytes),
            Some(StoredValue::Text(text)) => serde_json::from_str(&text),
            Some(StoredValue::Bool(_)) => {
                return Err(HistoryError::UnexpectedValue { key: HISTORY_KEY })
            }
        };
        decoded.map_err(|source| HistoryError::Deserialization {
            key: HISTORY_KEY,
            source,
        })
    }

    fn read_latest(&self) -> Option<DocumentIdentity> {
        let raw = match self.kv.get(LATEST_KEY) {
            Ok(Some(StoredValue::Text(raw))) => raw,
            Ok(None) => return None,
            Ok(Some(_)) => {
                let err = HistoryError::UnexpectedValue { key: LATEST_KEY };
                warn!(error = %err, "ignoring latest document");
                return None;
            }
            Err(err) => {
                warn!(error = ?err, "failed to read latest document");
                return None;
            }
        };
        if raw.is_empty() {
            return None;
        }
        match raw.parse() {
            Ok(identity) => Some(identity),
            Err(err) => {
                warn!(value = %raw, error = %err, "ignoring malformed latest document");
                None
            }
        }
    }
}

#[derive(Clone)]
pub struct SharedHistoryStore {
    inner: Arc<Mutex<HistoryStore>>,
}

impl SharedHistoryStore {
    pub fn new(store: HistoryStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn load(&self) -> HistoryCollection {
        self.inner.lock().load().clone()
    }

    pub fn save(&self, identity: DocumentIdentity, snapshot: &PositionSnapshot) -> SaveOutcome {
        self.inner.lock().save(identity, snapshot)
    }

    pub fn lookup_by_identity(&self, identity: &DocumentIdentity) -> Option<ReadingPosition> {
        self.inner.lock().lookup_by_identity(identity).cloned()
    }

    pub fn lookup_latest(&self) -> Option<ReadingPosition> {
        self.inner.lock().lookup_latest().cloned()
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }
}
