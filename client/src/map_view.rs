//! The map host component. Owns the [`MapController`] for the lifetime of
//! the view, re-runs reconciliation whenever an upstream signal changes and
//! translates pointer/wheel gestures into engine pan/zoom.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_storage::{LocalStorage, Storage};
use leptos::html;
use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlElement, PointerEvent, WheelEvent};

use beacon_shared::{Alert, GeoPoint};

use crate::app::{Alerts, SearchQuery, Selected, SelectedCategories};
use crate::controller::{MapController, MapInputs};
use crate::dom_engine::DomEngine;
use crate::viewport::{DEFAULT_CENTER, DEFAULT_ZOOM};

thread_local! {
    // The controller is !Send (it owns DOM handles and JS closures), so it
    // lives beside the component in thread-local storage rather than in a
    // signal.
    static MAP_BINDING: RefCell<Option<MapController<DomEngine>>> =
        const { RefCell::new(None) };
}

const LAST_VIEW_KEY: &str = "beacon_last_view";

#[derive(Serialize, Deserialize)]
struct SavedView {
    lat: f64,
    lng: f64,
    zoom: u8,
}

fn saved_view() -> Option<(GeoPoint, u8)> {
    let saved: SavedView = LocalStorage::get(LAST_VIEW_KEY).ok()?;
    let point = GeoPoint::new(saved.lat, saved.lng);
    point.is_valid().then_some((point, saved.zoom))
}

fn persist_view() {
    MAP_BINDING.with_borrow(|binding| {
        if let Some(controller) = binding.as_ref() {
            let (center, zoom) = controller.viewport();
            let _ = LocalStorage::set(
                LAST_VIEW_KEY,
                SavedView {
                    lat: center.lat,
                    lng: center.lng,
                    zoom,
                },
            );
        }
    });
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[component]
pub fn MapView(
    #[prop(optional)] center: Option<GeoPoint>,
    #[prop(optional)] zoom: Option<u8>,
) -> impl IntoView {
    let container = NodeRef::<html::Div>::new();

    let alerts = expect_context::<Alerts>().0;
    let search = expect_context::<SearchQuery>().0;
    let selected = expect_context::<Selected>().0;
    let categories = expect_context::<SelectedCategories>().0;

    Effect::new(move || {
        let Some(element) = container.get() else {
            return;
        };

        let wanted = categories.get();
        let visible: Vec<Alert> = alerts
            .get()
            .into_iter()
            .filter(|alert| wanted.is_empty() || wanted.contains(&alert.category))
            .collect();
        let inputs = MapInputs {
            alerts: visible,
            center,
            zoom,
            search_term: search.get(),
            highlighted: selected.get(),
        };

        MAP_BINDING.with_borrow_mut(|binding| {
            if binding.is_none() {
                let (initial_center, initial_zoom) = saved_view()
                    .or_else(|| match (center, zoom) {
                        (Some(c), Some(z)) => Some((c, z)),
                        _ => None,
                    })
                    .unwrap_or((DEFAULT_CENTER, DEFAULT_ZOOM));
                let on_marker_click: Rc<dyn Fn(String)> =
                    Rc::new(move |id: String| selected.set(Some(id)));
                let element: HtmlElement = element.unchecked_into();
                match DomEngine::new(element, initial_center, initial_zoom, on_marker_click) {
                    Ok(engine) => *binding = Some(MapController::new(engine)),
                    Err(e) => {
                        warn(&format!("map surface init failed: {e}"));
                        return;
                    }
                }
            }
            if let Some(controller) = binding.as_mut()
                && let Err(e) = controller.reconcile(&inputs)
            {
                warn(&format!("map reconcile failed: {e}"));
            }
        });
    });

    on_cleanup(|| {
        // Dropping the controller tears the marker set and DOM layers down.
        MAP_BINDING.with_borrow_mut(|binding| {
            binding.take();
        });
    });

    let dragging = Rc::new(Cell::new(false));
    let last_pointer = Rc::new(Cell::new((0.0f64, 0.0f64)));

    let on_pointer_down = {
        let dragging = Rc::clone(&dragging);
        let last_pointer = Rc::clone(&last_pointer);
        move |ev: PointerEvent| {
            if let Some(target) = ev.target()
                && let Some(element) = target.dyn_ref::<HtmlElement>()
            {
                let _ = element.set_pointer_capture(ev.pointer_id());
            }
            dragging.set(true);
            last_pointer.set((ev.client_x() as f64, ev.client_y() as f64));
        }
    };

    let on_pointer_move = {
        let dragging = Rc::clone(&dragging);
        let last_pointer = Rc::clone(&last_pointer);
        move |ev: PointerEvent| {
            if !dragging.get() {
                return;
            }
            let (px, py) = last_pointer.get();
            let (x, y) = (ev.client_x() as f64, ev.client_y() as f64);
            last_pointer.set((x, y));
            MAP_BINDING.with_borrow_mut(|binding| {
                if let Some(controller) = binding.as_mut() {
                    controller.engine_mut().pan_by(x - px, y - py);
                }
            });
        }
    };

    let on_pointer_up = {
        let dragging = Rc::clone(&dragging);
        move |_ev: PointerEvent| {
            if !dragging.get() {
                return;
            }
            dragging.set(false);
            MAP_BINDING.with_borrow_mut(|binding| {
                if let Some(controller) = binding.as_mut() {
                    controller.user_moved();
                }
            });
            persist_view();
        }
    };

    let on_wheel = move |ev: WheelEvent| {
        ev.prevent_default();
        let step = if ev.delta_y() < 0.0 { 1 } else { -1 };
        let (x, y) = (ev.offset_x() as f64, ev.offset_y() as f64);
        MAP_BINDING.with_borrow_mut(|binding| {
            if let Some(controller) = binding.as_mut() {
                controller.engine_mut().zoom_step(step, x, y);
                controller.user_moved();
            }
        });
        persist_view();
    };

    view! {
        <div
            node_ref=container
            style="position: absolute; inset: 0;"
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:wheel=on_wheel
        ></div>
    }
}
