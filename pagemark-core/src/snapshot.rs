use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::identity::{DocumentIdentity, SourceLocator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayModeCode(pub i64);

impl DisplayModeCode {
    pub const SINGLE_PAGE: DisplayModeCode = DisplayModeCode(0);
    pub const SINGLE_PAGE_CONTINUOUS: DisplayModeCode = DisplayModeCode(1);
    pub const TWO_UP: DisplayModeCode = DisplayModeCode(2);
    pub const TWO_UP_CONTINUOUS: DisplayModeCode = DisplayModeCode(3);
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentHandle {
    pub locator: SourceLocator,
    pub page_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Destination {
    pub point: Point,
    pub zoom: f64,
}

pub trait ViewerState {
    fn document(&self) -> Option<DocumentHandle>;
    fn current_page_index(&self) -> Option<usize>;
    fn current_destination(&self) -> Option<Destination>;
    fn display_mode(&self) -> DisplayModeCode;
    /// In the current page's coordinate space.
    fn viewport_bounds(&self) -> Option<Rect>;
    fn auto_scales(&self) -> bool;
    fn scale_factor(&self) -> f64;
    fn scale_factor_for_size_to_fit(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionSnapshot {
    pub display_name: String,
    pub source_locator: SourceLocator,
    pub page_count: usize,
    pub page_index: usize,
    pub display_mode_code: DisplayModeCode,
    pub destination_point: Point,
    pub destination_zoom: f64,
    pub viewport_rect: Rect,
    pub auto_scale_enabled: bool,
    pub scale_factor: f64,
    pub scale_to_fit_factor: f64,
}

impl PositionSnapshot {
    /// `None` while no document is attached or the viewer is between pages,
    /// which includes reporting a non-finite destination or scale.
    pub fn capture(viewer: &dyn ViewerState) -> Option<Self> {
        let document = viewer.document()?;
        let page_index = viewer.current_page_index()?;
        let destination = viewer.current_destination()?;
        let scale_factor = viewer.scale_factor();
        let scale_to_fit_factor = viewer.scale_factor_for_size_to_fit();
        if !destination.point.is_finite()
            || !destination.zoom.is_finite()
            || !scale_factor.is_finite()
            || !scale_to_fit_factor.is_finite()
        {
            return None;
        }
        let viewport_rect = viewer
            .viewport_bounds()
            .filter(Rect::is_finite)
            .unwrap_or(Rect::ZERO);
        Some(Self {
            display_name: document.locator.document_name(),
            source_locator: document.locator,
            page_count: document.page_count,
            page_index,
            display_mode_code: viewer.display_mode(),
            destination_point: destination.point,
            destination_zoom: destination.zoom,
            viewport_rect,
            auto_scale_enabled: viewer.auto_scales(),
            scale_factor,
            scale_to_fit_factor,
        })
    }

    // NaN and infinity serialize as null and break the whole record
    pub fn is_finite(&self) -> bool {
        self.destination_point.is_finite()
            && self.destination_zoom.is_finite()
            && self.viewport_rect.is_finite()
            && self.scale_factor.is_finite()
            && self.scale_to_fit_factor.is_finite()
    }

    pub fn identity(&self) -> DocumentIdentity {
        DocumentIdentity::for_locator(&self.source_locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct FakeViewer {
        document: Option<DocumentHandle>,
        page: Option<usize>,
        destination: Option<Destination>,
        mode: DisplayModeCode,
        viewport: Option<Rect>,
        auto_scales: bool,
        scale: f64,
        to_fit: f64,
    }

    impl FakeViewer {
        fn showing(locator: &str, page: usize) -> Self {
            Self {
                document: Some(DocumentHandle {
                    locator: SourceLocator::new(locator),
                    page_count: 40,
                }),
                page: Some(page),
                destination: Some(Destination {
                    point: Point::new(12.0, 640.0),
                    zoom: 1.5,
                }),
                mode: DisplayModeCode::SINGLE_PAGE_CONTINUOUS,
                viewport: Some(Rect::new(0.0, 100.0 + page as f64, 612.0, 792.0)),
                auto_scales: false,
                scale: 1.25,
                to_fit: 0.9,
            }
        }
    }

    impl ViewerState for FakeViewer {
        fn document(&self) -> Option<DocumentHandle> {
            self.document.clone()
        }

        fn current_page_index(&self) -> Option<usize> {
            self.page
        }

        fn current_destination(&self) -> Option<Destination> {
            self.destination
        }

        fn display_mode(&self) -> DisplayModeCode {
            self.mode
        }

        fn viewport_bounds(&self) -> Option<Rect> {
            self.viewport
        }

        fn auto_scales(&self) -> bool {
            self.auto_scales
        }

        fn scale_factor(&self) -> f64 {
            self.scale
        }

        fn scale_factor_for_size_to_fit(&self) -> f64 {
            self.to_fit
        }
    }

    #[test]
    fn capture_projects_viewer_state() {
        let viewer = FakeViewer::showing("/docs/Report.pdf", 5);
        let snapshot = PositionSnapshot::capture(&viewer).unwrap();
        assert_eq!(snapshot.display_name, "Report");
        assert_eq!(snapshot.source_locator.as_str(), "/docs/Report.pdf");
        assert_eq!(snapshot.page_count, 40);
        assert_eq!(snapshot.page_index, 5);
        assert_eq!(snapshot.display_mode_code, DisplayModeCode::SINGLE_PAGE_CONTINUOUS);
        assert_eq!(snapshot.destination_point, Point::new(12.0, 640.0));
        assert_eq!(snapshot.destination_zoom, 1.5);
        assert_eq!(snapshot.viewport_rect, Rect::new(0.0, 105.0, 612.0, 792.0));
        assert!(!snapshot.auto_scale_enabled);
        assert_eq!(snapshot.scale_factor, 1.25);
        assert_eq!(snapshot.scale_to_fit_factor, 0.9);
        assert_eq!(snapshot.identity(), DocumentIdentity::for_name("Report"));
    }

    #[test]
    fn capture_is_none_while_viewer_is_not_ready() {
        let mut no_document = FakeViewer::showing("/docs/Report.pdf", 5);
        no_document.document = None;
        assert!(PositionSnapshot::capture(&no_document).is_none());

        let mut no_page = FakeViewer::showing("/docs/Report.pdf", 5);
        no_page.page = None;
        assert!(PositionSnapshot::capture(&no_page).is_none());

        let mut no_destination = FakeViewer::showing("/docs/Report.pdf", 5);
        no_destination.destination = None;
        assert!(PositionSnapshot::capture(&no_destination).is_none());
    }

    #[test]
    fn capture_rejects_non_finite_destination_or_scale() {
        let mut zoom = FakeViewer::showing("/docs/Report.pdf", 5);
        zoom.destination = Some(Destination {
            point: Point::new(0.0, 10.0),
            zoom: f64::NAN,
        });
        assert!(PositionSnapshot::capture(&zoom).is_none());

        let mut point = FakeViewer::showing("/docs/Report.pdf", 5);
        point.destination = Some(Destination {
            point: Point::new(f64::INFINITY, 10.0),
            zoom: 1.0,
        });
        assert!(PositionSnapshot::capture(&point).is_none());

        let mut to_fit = FakeViewer::showing("/docs/Report.pdf", 5);
        to_fit.to_fit = f64::NAN;
        assert!(PositionSnapshot::capture(&to_fit).is_none());
    }

    #[test]
    fn non_finite_viewport_becomes_zero_rect() {
        let mut viewer = FakeViewer::showing("/docs/Report.pdf", 5);
        viewer.viewport = Some(Rect::new(f64::INFINITY, f64::INFINITY, 0.0, 0.0));
        let snapshot = PositionSnapshot::capture(&viewer).unwrap();
        assert!(snapshot.viewport_rect.is_zero());
        assert!(snapshot.is_finite());
    }

    #[test]
    fn missing_viewport_becomes_zero_rect() {
        let mut viewer = FakeViewer::showing("/docs/Report.pdf", 3);
        viewer.viewport = None;
        let snapshot = PositionSnapshot::capture(&viewer).unwrap();
        assert!(snapshot.viewport_rect.is_zero());
    }
}
