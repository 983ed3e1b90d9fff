use std::collections::HashMap;

use chrono::Utc;

use beacon_shared::{Alert, GeoBounds, GeoPoint};

use crate::engine::{EngineError, MapEngine, MarkerHandle};
use crate::focus::{self, FocusOutcome};
use crate::icons::MarkerIcon;
use crate::markers;
use crate::viewport::{DEFAULT_ZOOM, FocusView, ViewOp, ViewportState};

/// Everything one reconciliation pass consumes, assembled by the host layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapInputs {
    pub alerts: Vec<Alert>,
    /// Externally requested view. When absent the view stays wherever the
    /// user (or a focus move) left it.
    pub center: Option<GeoPoint>,
    pub zoom: Option<u8>,
    /// Free-text search; empty means no active search.
    pub search_term: String,
    /// Alert to emphasize. Caller contract: clear this when setting an
    /// unrelated search term, since a present highlight always outranks the
    /// search outcome.
    pub highlighted: Option<String>,
}

/// Keeps one live map engine consistent with a declarative alert list.
///
/// The controller owns the engine exclusively for its mounted lifetime and
/// tracks exactly one marker handle per alert id. Every pass removes first
/// and creates second, so an id is never represented twice, and all tracked
/// markers are released on teardown or drop.
pub struct MapController<E: MapEngine> {
    engine: E,
    markers: HashMap<String, MarkerHandle>,
    viewport: ViewportState,
    last_focus: FocusOutcome,
}

impl<E: MapEngine> MapController<E> {
    pub fn new(engine: E) -> Self {
        let (center, zoom) = engine.view();
        Self {
            engine,
            markers: HashMap::new(),
            viewport: ViewportState::new(center, zoom),
            last_focus: FocusOutcome::None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Host-layer access for interaction plumbing (drag/wheel handlers talk
    /// to the concrete engine, then commit through [`MapController::user_moved`]).
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn viewport(&self) -> (GeoPoint, u8) {
        (self.viewport.center(), self.viewport.zoom())
    }

    /// One full reconciliation pass over the current inputs. Later passes
    /// fully supersede earlier ones; a pass with unchanged inputs performs no
    /// engine operations.
    pub fn reconcile(&mut self, inputs: &MapInputs) -> Result<(), EngineError> {
        if !self.engine.ready() {
            // No marker state may survive a failed surface init; the pass
            // retries once the host signals readiness by re-running it.
            self.release_markers();
            return Ok(());
        }

        let focus = focus::resolve(
            &inputs.alerts,
            &inputs.search_term,
            inputs.highlighted.as_deref(),
        );
        let focus_changed = focus != self.last_focus;

        // Corrupt coordinates are a data-quality problem upstream, never a
        // reason to drop the rest of the pass.
        let mut desired: Vec<&Alert> = Vec::with_capacity(inputs.alerts.len());
        for alert in &inputs.alerts {
            if alert.location.is_renderable() {
                desired.push(alert);
            } else {
                tracing::warn!(id = %alert.id, "alert has unusable coordinates, no marker placed");
            }
        }

        self.move_viewport(inputs, &focus, focus_changed, &desired);
        self.apply_marker_plan(&focus, &desired)?;

        // Popup side effect only when the focus actually moved this pass.
        if focus_changed {
            match focus.focused_id().and_then(|id| self.markers.get(id)) {
                Some(&handle) => self.engine.open_popup(handle),
                None => self.engine.close_popup(),
            }
        }

        self.last_focus = focus;
        Ok(())
    }

    /// Host feedback after a user pan/zoom ends: the engine's view becomes
    /// the authoritative one until the next external or focus change.
    pub fn user_moved(&mut self) {
        let (center, zoom) = self.engine.view();
        self.viewport.user_moved(center, zoom);
    }

    /// Release every engine resource this controller acquired. Idempotent;
    /// also runs on drop.
    pub fn teardown(&mut self) {
        self.release_markers();
        self.engine.close_popup();
        self.last_focus = FocusOutcome::None;
    }

    fn move_viewport(
        &mut self,
        inputs: &MapInputs,
        focus: &FocusOutcome,
        focus_changed: bool,
        desired: &[&Alert],
    ) {
        let external = inputs
            .center
            .map(|center| (center, inputs.zoom.unwrap_or(DEFAULT_ZOOM)));
        let focus_view = if focus_changed {
            focus_view_for(focus, desired)
        } else {
            None
        };

        if let Some(op) = self.viewport.resolve(external, focus_view) {
            match op {
                ViewOp::Set { center, zoom } => self.engine.set_view(center, zoom),
                ViewOp::Fit { bounds, padding_px } => self.engine.fit_bounds(bounds, padding_px),
            }
            let (center, zoom) = self.engine.view();
            self.viewport.set_current(center, zoom);
        }
    }

    fn apply_marker_plan(
        &mut self,
        focus: &FocusOutcome,
        desired: &[&Alert],
    ) -> Result<(), EngineError> {
        let plan = markers::plan(
            &self.markers,
            desired,
            self.last_focus.focused_id(),
            focus.focused_id(),
        );
        if plan.is_empty() {
            return Ok(());
        }

        for id in &plan.remove {
            if let Some(handle) = self.markers.remove(id) {
                self.engine.remove_marker(handle);
            }
        }

        let now = Utc::now();
        for id in &plan.create {
            let Some(alert) = desired.iter().find(|alert| alert.id == *id) else {
                continue;
            };
            let icon = MarkerIcon::new(alert.category, focus.focused_id() == Some(id.as_str()));
            let handle = self.engine.add_marker(
                &alert.id,
                alert.position(),
                icon,
                &markers::popup_html(alert, now),
            )?;
            self.markers.insert(alert.id.clone(), handle);
        }

        for id in &plan.refresh {
            if let (Some(&handle), Some(alert)) = (
                self.markers.get(id),
                desired.iter().find(|alert| alert.id == *id),
            ) {
                let icon = MarkerIcon::new(alert.category, focus.focused_id() == Some(id.as_str()));
                self.engine.set_marker_icon(handle, icon);
            }
        }

        Ok(())
    }

    fn release_markers(&mut self) {
        for (_, handle) in self.markers.drain() {
            self.engine.remove_marker(handle);
        }
    }
}

impl<E: MapEngine> Drop for MapController<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn focus_view_for(focus: &FocusOutcome, desired: &[&Alert]) -> Option<FocusView> {
    match focus {
        FocusOutcome::Single(id) => desired
            .iter()
            .find(|alert| alert.id == *id)
            .map(|alert| FocusView::Point(alert.position())),
        FocusOutcome::Region(ids) => GeoBounds::from_points(
            desired
                .iter()
                .filter(|alert| ids.contains(&alert.id))
                .map(|alert| alert.position()),
        )
        .map(FocusView::Bounds),
        FocusOutcome::None => None,
    }
}
