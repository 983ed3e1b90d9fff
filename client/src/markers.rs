use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use beacon_shared::Alert;

use crate::engine::MarkerHandle;
use crate::time_format::format_age;

/// The minimal operations one reconciliation pass must perform so the live
/// marker set becomes exactly the image of the alert list. Lists are sorted
/// for deterministic application order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MarkerPlan {
    /// Ids whose alerts left the list. Destroyed before anything is created
    /// so a replaced id never has two live markers.
    pub remove: Vec<String>,
    /// Ids that appeared and need new markers.
    pub create: Vec<String>,
    /// Surviving ids whose focus state flipped and need an icon refresh.
    pub refresh: Vec<String>,
}

impl MarkerPlan {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.create.is_empty() && self.refresh.is_empty()
    }
}

/// Diff the live marker set against the desired alert list.
pub fn plan(
    live: &HashMap<String, MarkerHandle>,
    desired: &[&Alert],
    previous_focus: Option<&str>,
    focus: Option<&str>,
) -> MarkerPlan {
    let desired_ids: HashSet<&str> = desired.iter().map(|alert| alert.id.as_str()).collect();

    let mut remove: Vec<String> = live
        .keys()
        .filter(|id| !desired_ids.contains(id.as_str()))
        .cloned()
        .collect();
    remove.sort();

    let mut create: Vec<String> = desired
        .iter()
        .filter(|alert| !live.contains_key(&alert.id))
        .map(|alert| alert.id.clone())
        .collect();
    create.sort();

    let mut refresh: Vec<String> = desired
        .iter()
        .filter(|alert| live.contains_key(&alert.id))
        .filter(|alert| {
            let id = alert.id.as_str();
            (previous_focus == Some(id)) != (focus == Some(id))
        })
        .map(|alert| alert.id.clone())
        .collect();
    refresh.sort();

    MarkerPlan {
        remove,
        create,
        refresh,
    }
}

/// Popup body for one alert: title, address, relative age, and description
/// when present. Built once at marker creation.
pub fn popup_html(alert: &Alert, now: DateTime<Utc>) -> String {
    let mut html = format!(
        "<div style=\"font-size:0.82rem;font-weight:700;color:#1a1d2a;\">{}</div>\
         <div style=\"font-size:0.7rem;color:#5a5860;margin-top:2px;\">{}</div>",
        escape(&alert.title),
        escape(&alert.location.address),
    );
    if let Some(created_at) = alert.created_at {
        let age = format_age((now - created_at).num_seconds());
        html.push_str(&format!(
            "<div style=\"font-size:0.62rem;color:#9a9590;margin-top:2px;\">{} \u{00B7} {age}</div>",
            alert.category.label(),
        ));
    } else {
        html.push_str(&format!(
            "<div style=\"font-size:0.62rem;color:#9a9590;margin-top:2px;\">{}</div>",
            alert.category.label(),
        ));
    }
    if let Some(description) = alert.description.as_deref() {
        html.push_str(&format!(
            "<div style=\"font-size:0.7rem;color:#1a1d2a;margin-top:4px;\">{}</div>",
            escape(description),
        ));
    }
    html
}

/// Minimal HTML escaping for document-sourced text interpolated into popup
/// markup.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_shared::{AlertCategory, AlertLocation};
    use chrono::TimeZone;

    fn alert(id: &str) -> Alert {
        Alert {
            id: id.to_string(),
            title: format!("Alert {id}"),
            description: None,
            category: AlertCategory::Other,
            location: AlertLocation {
                lat: 40.0,
                lng: -75.0,
                address: "Main St".to_string(),
            },
            image_url: None,
            created_at: None,
            created_by: None,
        }
    }

    fn live(ids: &[&str]) -> HashMap<String, MarkerHandle> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| (id.to_string(), MarkerHandle(i as u64 + 1)))
            .collect()
    }

    #[test]
    fn disjoint_lists_swap_everything() {
        let live = live(&["a1", "a2"]);
        let b1 = alert("b1");
        let b2 = alert("b2");
        let plan = plan(&live, &[&b1, &b2], None, None);
        assert_eq!(plan.remove, vec!["a1", "a2"]);
        assert_eq!(plan.create, vec!["b1", "b2"]);
        assert!(plan.refresh.is_empty());
    }

    #[test]
    fn identical_lists_plan_nothing() {
        let live = live(&["a1", "a2"]);
        let a1 = alert("a1");
        let a2 = alert("a2");
        assert!(plan(&live, &[&a1, &a2], None, None).is_empty());
    }

    #[test]
    fn focus_flip_refreshes_both_sides() {
        let live = live(&["a1", "a2", "a3"]);
        let a1 = alert("a1");
        let a2 = alert("a2");
        let a3 = alert("a3");
        let plan = plan(&live, &[&a1, &a2, &a3], Some("a1"), Some("a3"));
        assert_eq!(plan.refresh, vec!["a1", "a3"]);
        assert!(plan.remove.is_empty() && plan.create.is_empty());
    }

    #[test]
    fn departed_focused_marker_is_removed_not_refreshed() {
        let live = live(&["a1"]);
        let a2 = alert("a2");
        let plan = plan(&live, &[&a2], Some("a1"), None);
        assert_eq!(plan.remove, vec!["a1"]);
        assert_eq!(plan.create, vec!["a2"]);
        assert!(plan.refresh.is_empty());
    }

    #[test]
    fn popup_contains_title_address_and_age() {
        let mut a = alert("a1");
        a.description = Some("Road closed <both> directions".to_string());
        a.created_at = Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 5, 0).unwrap();

        let html = popup_html(&a, now);
        assert!(html.contains("Alert a1"));
        assert!(html.contains("Main St"));
        assert!(html.contains("5 min ago"));
        assert!(html.contains("&lt;both&gt;"));
        assert!(!html.contains("<both>"));
    }
}
