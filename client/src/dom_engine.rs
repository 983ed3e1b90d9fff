#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

//! [`MapEngine`] over the browser DOM: an OSM tile backdrop plus absolutely
//! positioned marker elements inside a caller-provided container. Pan/zoom
//! interaction arrives from the host component through [`DomEngine::pan_by`]
//! and [`DomEngine::zoom_step`]; the engine itself attaches DOM listeners
//! only for marker clicks.

use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, HtmlElement, MouseEvent};

use beacon_shared::{GeoBounds, GeoPoint};

use crate::engine::{EngineError, MapEngine, MarkerHandle};
use crate::icons::MarkerIcon;
use crate::project::{self, TILE_SIZE};
use crate::viewport::{MAX_ZOOM, MIN_ZOOM};

const TILE_URL_BASE: &str = "https://tile.openstreetmap.org";
const ATTRIBUTION_HTML: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
/// Hard cap on live tile elements; a pathological container size never
/// floods the DOM (or the tile server).
const MAX_TILES: usize = 64;

struct DomMarker {
    element: HtmlElement,
    position: GeoPoint,
    icon: MarkerIcon,
    popup_html: String,
    on_click: Closure<dyn Fn(MouseEvent)>,
}

pub struct DomEngine {
    container: HtmlElement,
    tile_layer: HtmlElement,
    marker_layer: HtmlElement,
    popup: HtmlElement,
    attribution: HtmlElement,
    center: GeoPoint,
    zoom: u8,
    markers: HashMap<MarkerHandle, DomMarker>,
    tiles: HashMap<(u8, i32, i32), HtmlElement>,
    open_popup_on: Option<MarkerHandle>,
    next_handle: u64,
    on_marker_click: Rc<dyn Fn(String)>,
}

fn js_err(value: wasm_bindgen::JsValue) -> EngineError {
    EngineError::Surface(format!("{value:?}"))
}

fn create_div(document: &Document) -> Result<HtmlElement, EngineError> {
    document
        .create_element("div")
        .map_err(js_err)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| EngineError::Surface("created element is not an HtmlElement".to_string()))
}

impl DomEngine {
    pub fn new(
        container: HtmlElement,
        center: GeoPoint,
        zoom: u8,
        on_marker_click: Rc<dyn Fn(String)>,
    ) -> Result<Self, EngineError> {
        let document = container
            .owner_document()
            .ok_or_else(|| EngineError::Surface("container has no document".to_string()))?;

        let style = container.style();
        style.set_property("position", "relative").map_err(js_err)?;
        style.set_property("overflow", "hidden").map_err(js_err)?;
        style.set_property("touch-action", "none").map_err(js_err)?;
        style.set_property("cursor", "grab").map_err(js_err)?;
        style.set_property("background", "#aad3df").map_err(js_err)?;

        let tile_layer = create_div(&document)?;
        tile_layer
            .style()
            .set_property("position", "absolute")
            .map_err(js_err)?;
        tile_layer
            .style()
            .set_property("inset", "0")
            .map_err(js_err)?;

        let marker_layer = create_div(&document)?;
        marker_layer
            .style()
            .set_property("position", "absolute")
            .map_err(js_err)?;
        marker_layer
            .style()
            .set_property("inset", "0")
            .map_err(js_err)?;

        let popup = create_div(&document)?;
        let popup_style = popup.style();
        popup_style.set_property("display", "none").map_err(js_err)?;
        popup_style
            .set_property("position", "absolute")
            .map_err(js_err)?;
        popup_style
            .set_property("transform", "translate(-50%, -100%)")
            .map_err(js_err)?;
        popup_style.set_property("z-index", "20").map_err(js_err)?;
        popup_style
            .set_property("background", "#ffffff")
            .map_err(js_err)?;
        popup_style
            .set_property("border-radius", "6px")
            .map_err(js_err)?;
        popup_style
            .set_property("padding", "8px 10px")
            .map_err(js_err)?;
        popup_style
            .set_property("box-shadow", "0 4px 16px rgba(0,0,0,0.35)")
            .map_err(js_err)?;
        popup_style
            .set_property("min-width", "160px")
            .map_err(js_err)?;
        popup_style
            .set_property("max-width", "240px")
            .map_err(js_err)?;
        popup_style
            .set_property("font-family", "'Inter', system-ui, sans-serif")
            .map_err(js_err)?;
        popup_style
            .set_property("pointer-events", "none")
            .map_err(js_err)?;

        let attribution = create_div(&document)?;
        attribution.set_inner_html(ATTRIBUTION_HTML);
        let attribution_style = attribution.style();
        attribution_style
            .set_property("position", "absolute")
            .map_err(js_err)?;
        attribution_style
            .set_property("right", "2px")
            .map_err(js_err)?;
        attribution_style
            .set_property("bottom", "2px")
            .map_err(js_err)?;
        attribution_style
            .set_property("font-size", "0.6rem")
            .map_err(js_err)?;
        attribution_style
            .set_property("background", "rgba(255,255,255,0.7)")
            .map_err(js_err)?;
        attribution_style
            .set_property("padding", "0 4px")
            .map_err(js_err)?;
        attribution_style
            .set_property("z-index", "30")
            .map_err(js_err)?;

        container.append_child(&tile_layer).map_err(js_err)?;
        container.append_child(&marker_layer).map_err(js_err)?;
        container.append_child(&popup).map_err(js_err)?;
        container.append_child(&attribution).map_err(js_err)?;

        let mut engine = Self {
            container,
            tile_layer,
            marker_layer,
            popup,
            attribution,
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            markers: HashMap::new(),
            tiles: HashMap::new(),
            open_popup_on: None,
            next_handle: 1,
            on_marker_click,
        };
        engine.layout();
        Ok(engine)
    }

    /// Shift the view by a screen-pixel delta (active drag).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = project::project(self.center, self.zoom);
        self.center = project::unproject(cx - dx, cy - dy, self.zoom);
        self.layout();
    }

    /// Zoom one step in (`delta` > 0) or out, keeping the geographic point
    /// under the surface coordinate `(x, y)` fixed.
    pub fn zoom_step(&mut self, delta: i32, x: f64, y: f64) {
        let next = if delta > 0 {
            self.zoom.saturating_add(1)
        } else {
            self.zoom.saturating_sub(1)
        }
        .clamp(MIN_ZOOM, MAX_ZOOM);
        if next == self.zoom {
            return;
        }

        let (w, h) = self.surface_size();
        let (cx, cy) = project::project(self.center, self.zoom);
        let anchor = project::unproject(cx + x - w / 2.0, cy + y - h / 2.0, self.zoom);
        let (ax, ay) = project::project(anchor, next);
        self.zoom = next;
        self.center = project::unproject(ax - (x - w / 2.0), ay - (y - h / 2.0), next);
        self.layout();
    }

    fn surface_size(&self) -> (f64, f64) {
        (
            self.container.client_width() as f64,
            self.container.client_height() as f64,
        )
    }

    fn screen_position(&self, point: GeoPoint) -> (f64, f64) {
        let (w, h) = self.surface_size();
        let (cx, cy) = project::project(self.center, self.zoom);
        let (px, py) = project::project(point, self.zoom);
        (px - cx + w / 2.0, py - cy + h / 2.0)
    }

    fn layout(&mut self) {
        self.layout_tiles();
        for marker in self.markers.values() {
            self.place_marker(marker);
        }
        if let Some(handle) = self.open_popup_on {
            self.place_popup(handle);
        }
    }

    fn layout_tiles(&mut self) {
        let (w, h) = self.surface_size();
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        let zoom = self.zoom;
        let (cx, cy) = project::project(self.center, zoom);
        let max_index = (1i64 << zoom) - 1;
        let clamp_tile = |value: f64| -> i64 {
            (value / TILE_SIZE).floor().max(0.0).min(max_index as f64) as i64
        };
        let tx0 = clamp_tile(cx - w / 2.0);
        let tx1 = clamp_tile(cx + w / 2.0);
        let ty0 = clamp_tile(cy - h / 2.0);
        let ty1 = clamp_tile(cy + h / 2.0);

        let mut desired: Vec<(u8, i32, i32)> = Vec::new();
        'grid: for ty in ty0..=ty1 {
            for tx in tx0..=tx1 {
                desired.push((zoom, tx as i32, ty as i32));
                if desired.len() >= MAX_TILES {
                    break 'grid;
                }
            }
        }

        self.tiles.retain(|key, element| {
            if desired.contains(key) {
                true
            } else {
                element.remove();
                false
            }
        });

        let document = self.container.owner_document();
        for key in desired {
            let (z, tx, ty) = key;
            if !self.tiles.contains_key(&key) {
                let Some(document) = document.as_ref() else {
                    continue;
                };
                let Ok(element) = document.create_element("img") else {
                    continue;
                };
                let Ok(element) = element.dyn_into::<HtmlElement>() else {
                    continue;
                };
                let _ = element.set_attribute("src", &format!("{TILE_URL_BASE}/{z}/{tx}/{ty}.png"));
                let _ = element.set_attribute("draggable", "false");
                let style = element.style();
                let _ = style.set_property("position", "absolute");
                let _ = style.set_property("width", "256px");
                let _ = style.set_property("height", "256px");
                let _ = style.set_property("user-select", "none");
                if self.tile_layer.append_child(&element).is_err() {
                    continue;
                }
                self.tiles.insert(key, element);
            }
            if let Some(element) = self.tiles.get(&key) {
                let left = tx as f64 * TILE_SIZE - cx + w / 2.0;
                let top = ty as f64 * TILE_SIZE - cy + h / 2.0;
                let _ = element.style().set_property("left", &format!("{left:.1}px"));
                let _ = element.style().set_property("top", &format!("{top:.1}px"));
            }
        }
    }

    fn place_marker(&self, marker: &DomMarker) {
        let (x, y) = self.screen_position(marker.position);
        let (ax, ay) = marker.icon.anchor_px();
        let style = marker.element.style();
        let _ = style.set_property("left", &format!("{:.1}px", x - ax as f64));
        let _ = style.set_property("top", &format!("{:.1}px", y - ay as f64));
    }

    fn place_popup(&self, handle: MarkerHandle) {
        let Some(marker) = self.markers.get(&handle) else {
            return;
        };
        let (x, y) = self.screen_position(marker.position);
        let (_, ay) = marker.icon.anchor_px();
        let style = self.popup.style();
        let _ = style.set_property("left", &format!("{x:.1}px"));
        let _ = style.set_property("top", &format!("{:.1}px", y - ay as f64 - 6.0));
    }
}

impl MapEngine for DomEngine {
    fn ready(&self) -> bool {
        self.container.is_connected() && self.container.client_width() > 0
    }

    fn set_view(&mut self, center: GeoPoint, zoom: u8) {
        self.center = center;
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.layout();
    }

    fn fit_bounds(&mut self, bounds: GeoBounds, padding_px: f64) {
        let (w, h) = self.surface_size();
        let zoom = project::zoom_for_bounds(bounds, w, h, padding_px, MIN_ZOOM, MAX_ZOOM);
        self.set_view(bounds.center(), zoom);
    }

    fn add_marker(
        &mut self,
        alert_id: &str,
        position: GeoPoint,
        icon: MarkerIcon,
        popup_html: &str,
    ) -> Result<MarkerHandle, EngineError> {
        if !self.ready() {
            return Err(EngineError::NotReady);
        }
        let document = self
            .container
            .owner_document()
            .ok_or_else(|| EngineError::Surface("container has no document".to_string()))?;

        let element = create_div(&document)?;
        element.set_inner_html(&icon.html());
        let style = element.style();
        style.set_property("position", "absolute").map_err(js_err)?;
        style.set_property("cursor", "pointer").map_err(js_err)?;
        style.set_property("z-index", "10").map_err(js_err)?;

        // One click closure per marker instance, created exactly once here
        // and detached in remove_marker; reconciliation can never stack
        // handlers on the same element.
        let callback = Rc::clone(&self.on_marker_click);
        let id = alert_id.to_string();
        let on_click = Closure::<dyn Fn(MouseEvent)>::new(move |event: MouseEvent| {
            event.stop_propagation();
            callback(id.clone());
        });
        element
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(js_err)?;

        self.marker_layer.append_child(&element).map_err(js_err)?;

        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        let marker = DomMarker {
            element,
            position,
            icon,
            popup_html: popup_html.to_string(),
            on_click,
        };
        self.place_marker(&marker);
        self.markers.insert(handle, marker);
        Ok(handle)
    }

    fn set_marker_icon(&mut self, handle: MarkerHandle, icon: MarkerIcon) {
        let Some(marker) = self.markers.get_mut(&handle) else {
            return;
        };
        if marker.icon == icon {
            return;
        }
        marker.icon = icon;
        marker.element.set_inner_html(&icon.html());
        let marker = &self.markers[&handle];
        self.place_marker(marker);
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        let Some(marker) = self.markers.remove(&handle) else {
            return;
        };
        marker
            .element
            .remove_event_listener_with_callback(
                "click",
                marker.on_click.as_ref().unchecked_ref(),
            )
            .ok();
        marker.element.remove();
        if self.open_popup_on == Some(handle) {
            self.close_popup();
        }
    }

    fn open_popup(&mut self, handle: MarkerHandle) {
        let Some(marker) = self.markers.get(&handle) else {
            return;
        };
        self.popup.set_inner_html(&marker.popup_html);
        let _ = self.popup.style().set_property("display", "block");
        self.open_popup_on = Some(handle);
        self.place_popup(handle);
    }

    fn close_popup(&mut self) {
        let _ = self.popup.style().set_property("display", "none");
        self.open_popup_on = None;
    }

    fn view(&self) -> (GeoPoint, u8) {
        (self.center, self.zoom)
    }
}

impl Drop for DomEngine {
    fn drop(&mut self) {
        let handles: Vec<MarkerHandle> = self.markers.keys().copied().collect();
        for handle in handles {
            self.remove_marker(handle);
        }
        for (_, element) in self.tiles.drain() {
            element.remove();
        }
        self.tile_layer.remove();
        self.marker_layer.remove();
        self.popup.remove();
        self.attribution.remove();
    }
}
