use std::fmt;

use beacon_shared::{GeoBounds, GeoPoint};

use crate::icons::MarkerIcon;

/// Opaque handle to a live marker owned by a [`MapEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine's surface (e.g. the DOM container) is not usable yet.
    NotReady,
    /// A fault in the underlying surface, with its own message.
    Surface(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotReady => write!(f, "map surface not ready"),
            EngineError::Surface(message) => write!(f, "map surface fault: {message}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Capability surface the map controller needs from a map engine.
///
/// One controller exclusively owns one engine for its mounted lifetime and
/// drives it synchronously from reconciliation passes. Click routing is an
/// engine construction concern: a marker added through [`MapEngine::add_marker`]
/// must deliver user clicks for its alert id to the engine's click callback at
/// most once per click, with at most one handler per marker instance no matter
/// how many passes run.
pub trait MapEngine {
    /// False while the engine cannot accept markers (container unmounted or
    /// zero-sized). Reconciliation no-ops until this turns true.
    fn ready(&self) -> bool;

    fn set_view(&mut self, center: GeoPoint, zoom: u8);

    /// Move and zoom so `bounds` fits with `padding_px` screen pixels kept on
    /// every side.
    fn fit_bounds(&mut self, bounds: GeoBounds, padding_px: f64);

    fn add_marker(
        &mut self,
        alert_id: &str,
        position: GeoPoint,
        icon: MarkerIcon,
        popup_html: &str,
    ) -> Result<MarkerHandle, EngineError>;

    /// Refresh a live marker's visual state in place; geometry never changes
    /// for a surviving marker.
    fn set_marker_icon(&mut self, handle: MarkerHandle, icon: MarkerIcon);

    /// Destroy the marker and release everything it holds. Unknown handles
    /// are ignored so retries stay idempotent.
    fn remove_marker(&mut self, handle: MarkerHandle);

    fn open_popup(&mut self, handle: MarkerHandle);

    fn close_popup(&mut self);

    /// The engine's current authoritative view.
    fn view(&self) -> (GeoPoint, u8);
}
