use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A geotagged incident report published on the bulletin board.
///
/// Alert documents are owned by the page-level data source and delivered to the
/// map wholesale on every change; the map core treats them as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub title: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: AlertCategory,
    pub location: AlertLocation,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Alert {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.location.lat, self.location.lng)
    }

    /// Case-insensitive substring match over title, description, and address.
    /// An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query))
            || self.location.address.to_lowercase().contains(&query)
    }
}

/// Where an alert happened. `lat`/`lng` are WGS84, pre-resolved from the
/// free-text address by whoever created the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLocation {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: String,
}

impl AlertLocation {
    /// Whether the coordinates can actually be placed on a map. Documents with
    /// missing or corrupt coordinates arrive as NaN/out-of-range values and
    /// must not produce markers.
    pub fn is_renderable(&self) -> bool {
        GeoPoint::new(self.lat, self.lng).is_valid()
    }
}

/// Closed incident category set. Anything a newer client writes that this
/// build does not know collapses to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AlertCategory {
    Fire,
    Crime,
    Accident,
    Weather,
    #[default]
    Other,
}

impl AlertCategory {
    pub const ALL: [AlertCategory; 5] = [
        AlertCategory::Fire,
        AlertCategory::Crime,
        AlertCategory::Accident,
        AlertCategory::Weather,
        AlertCategory::Other,
    ];

    pub fn parse(value: &str) -> Self {
        match value {
            "fire" => AlertCategory::Fire,
            "crime" => AlertCategory::Crime,
            "accident" => AlertCategory::Accident,
            "weather" => AlertCategory::Weather,
            _ => AlertCategory::Other,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AlertCategory::Fire => "fire",
            AlertCategory::Crime => "crime",
            AlertCategory::Accident => "accident",
            AlertCategory::Weather => "weather",
            AlertCategory::Other => "other",
        }
    }

    /// Capitalized form for filter chips and popups.
    pub const fn label(self) -> &'static str {
        match self {
            AlertCategory::Fire => "Fire",
            AlertCategory::Crime => "Crime",
            AlertCategory::Accident => "Accident",
            AlertCategory::Weather => "Weather",
            AlertCategory::Other => "Other",
        }
    }
}

impl From<String> for AlertCategory {
    fn from(value: String) -> Self {
        AlertCategory::parse(&value)
    }
}
