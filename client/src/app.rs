use leptos::prelude::*;
use wasm_bindgen::JsCast;

use beacon_shared::{Alert, AlertCategory};

use crate::colors::{category_rgb, rgba_css};
use crate::feed::{self, FeedStatus};
use crate::map_view::MapView;

/// Newtype wrappers to give same-shaped signals distinct types for Leptos
/// context. (Without wrappers, `provide_context` overwrites one with the
/// other.)
#[derive(Clone, Copy)]
pub(crate) struct Alerts(pub RwSignal<Vec<Alert>>);
#[derive(Clone, Copy)]
pub(crate) struct SearchQuery(pub RwSignal<String>);
#[derive(Clone, Copy)]
pub(crate) struct Selected(pub RwSignal<Option<String>>);
#[derive(Clone, Copy)]
pub(crate) struct SelectedCategories(pub RwSignal<Vec<AlertCategory>>);
#[derive(Clone, Copy)]
pub(crate) struct FeedState(pub RwSignal<FeedStatus>);

#[component]
pub fn App() -> impl IntoView {
    // Global signals
    let alerts: RwSignal<Vec<Alert>> = RwSignal::new(Vec::new());
    let search_query: RwSignal<String> = RwSignal::new(String::new());
    let selected: RwSignal<Option<String>> = RwSignal::new(None);
    let selected_categories: RwSignal<Vec<AlertCategory>> = RwSignal::new(Vec::new());
    let feed_status: RwSignal<FeedStatus> = RwSignal::new(FeedStatus::Loading);

    // Provide via context so children can access
    provide_context(Alerts(alerts));
    provide_context(SearchQuery(search_query));
    provide_context(Selected(selected));
    provide_context(SelectedCategories(selected_categories));
    provide_context(FeedState(feed_status));

    feed::fetch_alerts(alerts, feed_status);

    let on_search_input = move |e: leptos::ev::Event| {
        let Some(target) = e.target() else {
            return;
        };
        let Ok(input) = target.dyn_into::<web_sys::HtmlInputElement>() else {
            return;
        };
        search_query.set(input.value());
        // Typing starts a new hunt for a report; any marker highlight from a
        // previous click no longer applies.
        selected.set(None);
    };

    view! {
        <div style="position: fixed; inset: 0; display: flex; flex-direction: column; background: #13161f; font-family: 'Inter', system-ui, sans-serif;">
            <div style="display: flex; align-items: center; gap: 12px; padding: 10px 16px; background: #1a1d2a; border-bottom: 1px solid #282c3e; z-index: 40;">
                <span style="color: #f5c542; font-weight: 700; font-size: 1.05rem; letter-spacing: 0.02em;">"Beacon"</span>
                <input
                    style="flex: 1; max-width: 360px; padding: 8px 12px; background: #13161f; border: 1px solid #282c3e; border-radius: 6px; color: #e2e0d8; font-size: 0.9rem; outline: none;"
                    type="text"
                    placeholder="Search alerts by title, details or address..."
                    prop:value=move || search_query.get()
                    on:input=on_search_input
                />
                <CategoryFilter />
                <StatusLine />
            </div>
            <div style="position: relative; flex: 1;">
                <MapView />
            </div>
        </div>
    }
}

/// Feed state plus how many alerts survive the current search and category
/// filters.
#[component]
fn StatusLine() -> impl IntoView {
    let Alerts(alerts) = expect_context::<Alerts>();
    let SearchQuery(search_query) = expect_context::<SearchQuery>();
    let SelectedCategories(selected_categories) = expect_context::<SelectedCategories>();
    let FeedState(feed_status) = expect_context::<FeedState>();

    let text = move || match feed_status.get() {
        FeedStatus::Loading => "Loading alerts...".to_string(),
        FeedStatus::Failed => "Alert feed unavailable".to_string(),
        FeedStatus::Ready => {
            let wanted = selected_categories.get();
            let term = search_query.get();
            let count = alerts
                .get()
                .iter()
                .filter(|alert| wanted.is_empty() || wanted.contains(&alert.category))
                .filter(|alert| alert.matches_query(&term))
                .count();
            if count == 1 {
                "1 alert shown".to_string()
            } else {
                format!("{count} alerts shown")
            }
        }
    };

    view! {
        <span style="margin-left: auto; color: #8a8794; font-size: 0.78rem;">{text}</span>
    }
}

/// One toggle chip per category. No chip active means no category filter.
#[component]
fn CategoryFilter() -> impl IntoView {
    let SelectedCategories(selected_categories) = expect_context::<SelectedCategories>();

    let chips = AlertCategory::ALL
        .iter()
        .map(|&category| {
            let toggle = move |_| {
                selected_categories.update(|wanted| {
                    if let Some(index) = wanted.iter().position(|c| *c == category) {
                        wanted.remove(index);
                    } else {
                        wanted.push(category);
                    }
                });
            };
            let style = move || {
                let active = selected_categories.get().contains(&category);
                let (r, g, b) = category_rgb(category);
                if active {
                    format!(
                        "padding: 4px 10px; border-radius: 12px; border: 1px solid {0}; background: {1}; color: #ffffff; font-size: 0.72rem; cursor: pointer;",
                        rgba_css(r, g, b, 0.9),
                        rgba_css(r, g, b, 0.55),
                    )
                } else {
                    format!(
                        "padding: 4px 10px; border-radius: 12px; border: 1px solid {0}; background: transparent; color: #b8b5c0; font-size: 0.72rem; cursor: pointer;",
                        rgba_css(r, g, b, 0.45),
                    )
                }
            };
            view! {
                <button style=style on:click=toggle>
                    {category.label()}
                </button>
            }
        })
        .collect_view();

    view! {
        <div style="display: flex; gap: 6px;">{chips}</div>
    }
}
