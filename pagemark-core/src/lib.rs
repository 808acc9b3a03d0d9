pub mod config;
pub mod error;
pub mod geometry;
pub mod identity;
pub mod kv;
pub mod position;
pub mod settings;
pub mod snapshot;
pub mod store;

pub use config::{project_dirs, PagemarkConfig};
pub use error::HistoryError;
pub use geometry::{Point, Rect, Size};
pub use identity::{DocumentIdentity, SourceLocator};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StoredValue};
pub use position::{HistoryCollection, ReadingPosition};
pub use settings::{Background, ViewerSettings};
pub use snapshot::{Destination, DisplayModeCode, DocumentHandle, PositionSnapshot, ViewerState};
pub use store::{HistoryStore, SaveOutcome, SharedHistoryStore, HISTORY_KEY, LATEST_KEY};
