use beacon_shared::{GeoBounds, GeoPoint};

/// Continental-scale defaults used when the caller supplies no view
/// (geographic center of the contiguous US, zoomed out to country scale).
pub const DEFAULT_CENTER: GeoPoint = GeoPoint::new(39.8283, -98.5795);
pub const DEFAULT_ZOOM: u8 = 4;

/// Street-level zoom adopted when a single alert takes focus.
pub const FOCUS_ZOOM: u8 = 15;

/// Screen padding kept around a region-focus bounding box.
pub const FIT_PADDING_PX: f64 = 48.0;

pub const MIN_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 18;

/// A single viewport movement decided by one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewOp {
    Set { center: GeoPoint, zoom: u8 },
    Fit { bounds: GeoBounds, padding_px: f64 },
}

/// A focus-channel view request, present only on passes where the focus
/// outcome actually changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusView {
    Point(GeoPoint),
    Bounds(GeoBounds),
}

/// Owns the current center/zoom and arbitrates its three producers:
/// externally supplied props, user pan/zoom, and derived focus targets.
///
/// Precedence per pass: a changed focus beats a changed external prop; a
/// changed external prop beats a stale focus; when neither changed, the
/// user-held view stands untouched. User moves arrive between passes through
/// [`ViewportState::user_moved`] and are authoritative until the next
/// external or focus change.
#[derive(Debug, Clone)]
pub struct ViewportState {
    center: GeoPoint,
    zoom: u8,
    last_external: Option<(GeoPoint, u8)>,
}

impl ViewportState {
    pub fn new(center: GeoPoint, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            last_external: None,
        }
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Resolve one pass. `external` is the caller-supplied view as currently
    /// present on the props; `focus` is `Some` only when the focus outcome
    /// changed this pass. Returns the engine movement to perform, if any.
    pub fn resolve(
        &mut self,
        external: Option<(GeoPoint, u8)>,
        focus: Option<FocusView>,
    ) -> Option<ViewOp> {
        let external_changed = external.is_some() && external != self.last_external;
        self.last_external = external;

        match focus {
            Some(FocusView::Point(center)) => {
                self.center = center;
                self.zoom = FOCUS_ZOOM;
                Some(ViewOp::Set {
                    center,
                    zoom: FOCUS_ZOOM,
                })
            }
            Some(FocusView::Bounds(bounds)) => Some(ViewOp::Fit {
                bounds,
                padding_px: FIT_PADDING_PX,
            }),
            None => {
                if !external_changed {
                    return None;
                }
                let (center, zoom) = external?;
                let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
                self.center = center;
                self.zoom = zoom;
                Some(ViewOp::Set { center, zoom })
            }
        }
    }

    /// The user finished a pan/zoom interaction; their view is now
    /// authoritative until the next external or focus change.
    pub fn user_moved(&mut self, center: GeoPoint, zoom: u8) {
        self.center = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Adopt the engine's view after an applied [`ViewOp`] (fit operations
    /// decide their own zoom, so the engine is read back as truth).
    pub fn set_current(&mut self, center: GeoPoint, zoom: u8) {
        self.center = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXT: GeoPoint = GeoPoint::new(40.0, -75.0);
    const TARGET: GeoPoint = GeoPoint::new(29.76, -95.36);

    #[test]
    fn external_prop_change_is_adopted_once() {
        let mut state = ViewportState::new(DEFAULT_CENTER, DEFAULT_ZOOM);
        let op = state.resolve(Some((EXT, 10)), None);
        assert_eq!(
            op,
            Some(ViewOp::Set {
                center: EXT,
                zoom: 10
            })
        );
        // Same props next pass: nothing to do.
        assert_eq!(state.resolve(Some((EXT, 10)), None), None);
    }

    #[test]
    fn changed_focus_beats_changed_external() {
        let mut state = ViewportState::new(DEFAULT_CENTER, DEFAULT_ZOOM);
        let op = state.resolve(Some((EXT, 10)), Some(FocusView::Point(TARGET)));
        assert_eq!(
            op,
            Some(ViewOp::Set {
                center: TARGET,
                zoom: FOCUS_ZOOM
            })
        );
        // The external prop was still consumed: it does not re-apply later.
        assert_eq!(state.resolve(Some((EXT, 10)), None), None);
    }

    #[test]
    fn fresh_external_overrides_stale_focus() {
        let mut state = ViewportState::new(DEFAULT_CENTER, DEFAULT_ZOOM);
        state.resolve(None, Some(FocusView::Point(TARGET)));
        // Focus unchanged on the next pass, but the caller moved the view.
        let op = state.resolve(Some((EXT, 6)), None);
        assert_eq!(
            op,
            Some(ViewOp::Set {
                center: EXT,
                zoom: 6
            })
        );
    }

    #[test]
    fn user_view_survives_no_op_passes() {
        let mut state = ViewportState::new(DEFAULT_CENTER, DEFAULT_ZOOM);
        state.resolve(Some((EXT, 10)), None);
        state.user_moved(TARGET, 13);
        assert_eq!(state.resolve(Some((EXT, 10)), None), None);
        assert_eq!(state.center(), TARGET);
        assert_eq!(state.zoom(), 13);
    }

    #[test]
    fn region_focus_requests_padded_fit() {
        let mut state = ViewportState::new(DEFAULT_CENTER, DEFAULT_ZOOM);
        let bounds = GeoBounds {
            south: 29.0,
            west: -96.0,
            north: 30.0,
            east: -95.0,
        };
        let op = state.resolve(None, Some(FocusView::Bounds(bounds)));
        let Some(ViewOp::Fit { padding_px, .. }) = op else {
            panic!("expected fit, got {op:?}");
        };
        assert!(padding_px > 0.0);
    }

    #[test]
    fn zoom_is_clamped_on_every_channel() {
        let mut state = ViewportState::new(DEFAULT_CENTER, 40);
        assert_eq!(state.zoom(), MAX_ZOOM);
        state.user_moved(EXT, 0);
        assert_eq!(state.zoom(), MIN_ZOOM);
        let op = state.resolve(Some((EXT, 99)), None);
        assert_eq!(
            op,
            Some(ViewOp::Set {
                center: EXT,
                zoom: MAX_ZOOM
            })
        );
    }
}
