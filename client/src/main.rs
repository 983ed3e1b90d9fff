mod app;
mod colors;
mod controller;
mod dom_engine;
mod engine;
mod feed;
mod focus;
mod icons;
mod map_view;
mod markers;
mod project;
mod time_format;
mod viewport;

use leptos::mount::mount_to;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

thread_local! {
    // Keeps the Leptos mount alive for the page lifetime; replaced, not
    // leaked, if main() ever runs twice.
    static BEACON_MOUNT: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

fn mount_target() -> Option<web_sys::HtmlElement> {
    let document = web_sys::window()?.document()?;
    document
        .get_element_by_id("app")
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .or_else(|| document.body())
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(target) = mount_target() else {
        return;
    };

    BEACON_MOUNT.with(move |slot| {
        // A previous mount's effects must stop before a new signal graph
        // takes over the page.
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, app::App);
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
