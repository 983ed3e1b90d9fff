use beacon_shared::AlertCategory;

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

/// Marker palette for the closed category set. `Other` doubles as the
/// fallback color for anything a newer client wrote.
pub const fn category_rgb(category: AlertCategory) -> (u8, u8, u8) {
    match category {
        AlertCategory::Fire => (226, 88, 34),
        AlertCategory::Crime => (178, 34, 52),
        AlertCategory::Accident => (245, 166, 35),
        AlertCategory::Weather => (52, 120, 246),
        AlertCategory::Other => (108, 117, 125),
    }
}
