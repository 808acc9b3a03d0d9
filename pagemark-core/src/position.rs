use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::identity::{DocumentIdentity, SourceLocator};
use crate::snapshot::{DisplayModeCode, PositionSnapshot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPosition {
    pub identity: DocumentIdentity,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub source_locator: Option<SourceLocator>,
    #[serde(default)]
    pub page_count: usize,
    #[serde(default)]
    pub page_index: usize,
    #[serde(default)]
    pub display_mode_code: DisplayModeCode,
    #[serde(default)]
    pub destination_point: Point,
    #[serde(default = "unit_scale")]
    pub destination_zoom: f64,
    #[serde(default)]
    pub viewport_rect: Rect,
    #[serde(default = "enabled")]
    pub auto_scale_enabled: bool,
    #[serde(default = "unit_scale")]
    pub scale_factor: f64,
    #[serde(default = "unit_scale")]
    pub scale_to_fit_factor: f64,
}

fn unit_scale() -> f64 {
    1.0
}

fn enabled() -> bool {
    true
}

impl ReadingPosition {
    pub fn from_snapshot(identity: DocumentIdentity, snapshot: &PositionSnapshot) -> Self {
        let mut position = Self {
            identity,
            display_name: String::new(),
            source_locator: None,
            page_count: 0,
            page_index: 0,
            display_mode_code: DisplayModeCode::default(),
            destination_point: Point::ZERO,
            destination_zoom: 1.0,
            viewport_rect: Rect::ZERO,
            auto_scale_enabled: true,
            scale_factor: 1.0,
            scale_to_fit_factor: 1.0,
        };
        position.update_from(snapshot);
        position
    }

    // name and locator change when the document moves
    pub fn update_from(&mut self, snapshot: &PositionSnapshot) {
        self.display_name = snapshot.display_name.clone();
        self.source_locator = Some(snapshot.source_locator.clone());
        self.page_count = snapshot.page_count;
        self.page_index = snapshot.page_index;
        self.display_mode_code = snapshot.display_mode_code;
        self.destination_point = snapshot.destination_point;
        self.destination_zoom = snapshot.destination_zoom;
        self.viewport_rect = snapshot.viewport_rect;
        self.auto_scale_enabled = snapshot.auto_scale_enabled;
        self.scale_factor = snapshot.scale_factor;
        self.scale_to_fit_factor = snapshot.scale_to_fit_factor;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryCollection {
    pub positions: Vec<ReadingPosition>,
    pub latest_identity: Option<DocumentIdentity>,
}

impl HistoryCollection {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn get(&self, identity: &DocumentIdentity) -> Option<&ReadingPosition> {
        self.positions.iter().find(|p| p.identity == *identity)
    }

    pub fn latest(&self) -> Option<&ReadingPosition> {
        self.latest_identity.as_ref().and_then(|id| self.get(id))
    }

    pub fn upsert(&mut self, identity: DocumentIdentity, snapshot: &PositionSnapshot) {
        match self.positions.iter_mut().find(|p| p.identity == identity) {
            Some(existing) => existing.update_from(snapshot),
            None => self
                .positions
                .push(ReadingPosition::from_snapshot(identity, snapshot)),
        }
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.latest_identity = None;
    }
}
