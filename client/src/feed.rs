//! Alert feed loading. The bulletin board publishes the current alert list
//! as a static JSON document; one fetch on startup seeds the signals the
//! rest of the app reads.

use gloo_net::http::Request;
use leptos::prelude::*;
use wasm_bindgen::JsValue;

use beacon_shared::Alert;

const FEED_URL: &str = "/alerts.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedStatus {
    #[default]
    Loading,
    Ready,
    Failed,
}

pub fn fetch_alerts(alerts: RwSignal<Vec<Alert>>, status: RwSignal<FeedStatus>) {
    wasm_bindgen_futures::spawn_local(async move {
        match load().await {
            Ok(list) => {
                alerts.set(list);
                status.set(FeedStatus::Ready);
            }
            Err(message) => {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "alert feed fetch failed: {message}"
                )));
                status.set(FeedStatus::Failed);
            }
        }
    });
}

async fn load() -> Result<Vec<Alert>, String> {
    let response = Request::get(FEED_URL)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !response.ok() {
        return Err(format!("feed returned status {}", response.status()));
    }
    response.json::<Vec<Alert>>().await.map_err(|e| e.to_string())
}
