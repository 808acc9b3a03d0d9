use pagemark_core::{Destination, DisplayModeCode, Rect, ReadingPosition};
use tracing::{debug, warn};

/// Commands the host viewer accepts to move to a saved position.
pub trait ViewerCommands {
    fn jump_to_page_index(&mut self, page_index: usize);
    fn jump_to_destination(&mut self, page_index: usize, destination: Destination);
    fn jump_to_rect(&mut self, page_index: usize, rect: Rect);
    fn set_display_mode(&mut self, mode: DisplayModeCode);
    fn set_auto_scale(&mut self, enabled: bool);
    fn set_scale_factor(&mut self, scale: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored { page_index: usize },
    /// The saved page no longer exists in the document.
    StalePage { page_index: usize, page_count: usize },
    NoHistory,
}

pub fn restore(
    position: &ReadingPosition,
    page_count: usize,
    sink: &mut dyn ViewerCommands,
) -> RestoreOutcome {
    let page_index = position.page_index;
    if page_index >= page_count {
        warn!(
            identity = %position.identity,
            page_index,
            page_count,
            "saved page is out of range, not restoring"
        );
        return RestoreOutcome::StalePage {
            page_index,
            page_count,
        };
    }
    sink.set_auto_scale(position.auto_scale_enabled);
    sink.set_scale_factor(position.scale_factor);
    sink.set_display_mode(position.display_mode_code);
    sink.jump_to_destination(
        page_index,
        Destination {
            point: position.destination_point,
            zoom: position.destination_zoom,
        },
    );
    if !position.viewport_rect.is_zero() {
        sink.jump_to_rect(page_index, position.viewport_rect);
    }
    debug!(identity = %position.identity, page_index, "position restored");
    RestoreOutcome::Restored { page_index }
}

/// Settings for a document that has never been saved.
pub fn apply_defaults(sink: &mut dyn ViewerCommands) {
    sink.set_auto_scale(true);
    sink.set_display_mode(DisplayModeCode::SINGLE_PAGE);
}

/// Page-jump control. Out-of-range requests are dropped.
pub fn turn_page(page_index: usize, page_count: usize, sink: &mut dyn ViewerCommands) -> bool {
    if page_index >= page_count {
        debug!(page_index, page_count, "page jump ignored");
        return false;
    }
    sink.jump_to_page_index(page_index);
    true
}
