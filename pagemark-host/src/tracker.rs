use std::sync::Arc;
use std::time::{Duration, Instant};

use pagemark_core::{
    DocumentIdentity, HistoryStore, KeyValueStore, PagemarkConfig, PositionSnapshot,
    ReadingPosition, Rect, SaveOutcome, SourceLocator, ViewerSettings, ViewerState,
};
use tracing::{debug, info, instrument};

use crate::clock::Clock;
use crate::restore::{self, RestoreOutcome, ViewerCommands};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// What the host needs after coming back to the foreground.
#[derive(Debug, Clone, PartialEq)]
pub struct Foreground {
    pub settings: ViewerSettings,
    pub history_reset: bool,
    /// Last active document, offered only when nothing is open yet.
    pub resume: Option<ReadingPosition>,
}

/// Drives the history from viewer events and a periodic poll. All calls are
/// expected on one execution context; `&mut self` keeps them ordered.
pub struct ReadingTracker<C: Clock> {
    kv: Arc<dyn KeyValueStore>,
    store: HistoryStore,
    clock: C,
    poll_interval: Duration,
    last_poll: Option<Instant>,
}

impl<C: Clock> ReadingTracker<C> {
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: C, poll_interval: Duration) -> Self {
        Self {
            store: HistoryStore::new(Arc::clone(&kv)),
            kv,
            clock,
            poll_interval,
            last_poll: None,
        }
    }

    pub fn with_config(kv: Arc<dyn KeyValueStore>, clock: C, config: &PagemarkConfig) -> Self {
        Self::new(kv, clock, config.poll_interval())
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn on_document_changed(&mut self, viewer: &dyn ViewerState) -> Option<SaveOutcome> {
        self.save_current(viewer, "document changed")
    }

    pub fn on_page_changed(&mut self, viewer: &dyn ViewerState) -> Option<SaveOutcome> {
        self.save_current(viewer, "page changed")
    }

    pub fn on_scale_changed(&mut self, viewer: &dyn ViewerState) -> Option<SaveOutcome> {
        self.save_current(viewer, "scale changed")
    }

    /// Timer entry point. Saves only when the viewport moved since the last
    /// persisted position of the shown document.
    pub fn poll(&mut self, viewer: &dyn ViewerState) -> Option<SaveOutcome> {
        let now = self.clock.now();
        if let Some(last) = self.last_poll {
            // timer ticks jitter around the interval; only drop clearly early ones
            if now.saturating_duration_since(last) < self.poll_interval * 9 / 10 {
                return None;
            }
        }
        self.last_poll = Some(now);

        let snapshot = PositionSnapshot::capture(viewer)?;
        if snapshot.page_index == 0 || snapshot.viewport_rect.is_zero() {
            return None;
        }
        let identity = snapshot.identity();
        if self.persisted_viewport(&identity) == snapshot.viewport_rect {
            return None;
        }
        debug!(identity = %identity, "viewport moved");
        Some(self.store.save(identity, &snapshot))
    }

    #[instrument(skip(self, viewer))]
    pub fn on_foreground(&mut self, viewer: &dyn ViewerState) -> Foreground {
        let history_reset = ViewerSettings::consume_reset(self.kv.as_ref());
        if history_reset {
            self.store.reset();
        }
        let settings = ViewerSettings::read(self.kv.as_ref());
        self.store.load();
        let resume = match viewer.document() {
            Some(document) => {
                info!(name = %document.locator.document_name(), "resume");
                None
            }
            None => self.store.lookup_latest().cloned(),
        };
        Foreground {
            settings,
            history_reset,
            resume,
        }
    }

    /// Applies the saved position of a freshly opened document, or the
    /// defaults when it has none.
    #[instrument(skip(self, locator, sink), fields(locator = %locator))]
    pub fn open(
        &mut self,
        locator: &SourceLocator,
        page_count: usize,
        sink: &mut dyn ViewerCommands,
    ) -> RestoreOutcome {
        self.store.load();
        let identity = DocumentIdentity::for_locator(locator);
        match self.store.lookup_by_identity(&identity) {
            Some(position) => restore::restore(position, page_count, sink),
            None => {
                restore::apply_defaults(sink);
                RestoreOutcome::NoHistory
            }
        }
    }

    fn save_current(&mut self, viewer: &dyn ViewerState, trigger: &'static str) -> Option<SaveOutcome> {
        let Some(snapshot) = PositionSnapshot::capture(viewer) else {
            debug!(trigger, "viewer not ready, save skipped");
            return None;
        };
        debug!(trigger, page = snapshot.page_index, "saving position");
        Some(self.store.save(snapshot.identity(), &snapshot))
    }

    fn persisted_viewport(&self, identity: &DocumentIdentity) -> Rect {
        if self.store.latest_identity() == Some(*identity) {
            return self.store.last_viewport_rect_for_latest();
        }
        self.store
            .lookup_by_identity(identity)
            .map(|position| position.viewport_rect)
            .unwrap_or(Rect::ZERO)
    }
}
