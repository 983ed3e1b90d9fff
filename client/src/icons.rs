use beacon_shared::AlertCategory;

use crate::colors::{category_rgb, rgba_css};

const BASE_SIZE_PX: u32 = 32;
const FOCUSED_SIZE_PX: u32 = 44;

/// Visual recipe for one marker, derived purely from the alert's category and
/// whether it currently holds focus. Equal inputs always produce equal values
/// (and equal markup), so engines can compare icons and skip redundant writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerIcon {
    pub category: AlertCategory,
    pub focused: bool,
}

impl MarkerIcon {
    pub const fn new(category: AlertCategory, focused: bool) -> Self {
        Self { category, focused }
    }

    pub const fn size_px(&self) -> u32 {
        if self.focused {
            FOCUSED_SIZE_PX
        } else {
            BASE_SIZE_PX
        }
    }

    /// Offset from the element's top-left to the point placed on the
    /// coordinate. Markers are circular badges, so they anchor at center.
    pub const fn anchor_px(&self) -> (i32, i32) {
        let half = (self.size_px() / 2) as i32;
        (half, half)
    }

    /// Inline-styled badge markup. Focused markers render larger with a
    /// heavier drop shadow.
    pub fn html(&self) -> String {
        let (r, g, b) = category_rgb(self.category);
        let size = self.size_px();
        let shadow = if self.focused {
            "0 4px 14px rgba(0,0,0,0.55)"
        } else {
            "0 2px 6px rgba(0,0,0,0.35)"
        };
        let font_px = size * 9 / 16;
        format!(
            "<div style=\"width:{size}px;height:{size}px;border-radius:50%;\
             background:{bg};border:2px solid #ffffff;box-shadow:{shadow};\
             display:flex;align-items:center;justify-content:center;\
             color:#ffffff;font-weight:700;font-size:{font_px}px;\
             font-family:'Inter',system-ui,sans-serif;\" \
             title=\"{label}\">!</div>",
            bg = rgba_css(r, g, b, 0.95),
            label = self.category.label(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_produce_identical_markup() {
        let a = MarkerIcon::new(AlertCategory::Fire, true);
        let b = MarkerIcon::new(AlertCategory::Fire, true);
        assert_eq!(a, b);
        assert_eq!(a.html(), b.html());
    }

    #[test]
    fn focused_markers_are_larger() {
        let unfocused = MarkerIcon::new(AlertCategory::Crime, false);
        let focused = MarkerIcon::new(AlertCategory::Crime, true);
        assert!(focused.size_px() > unfocused.size_px());
        assert_ne!(focused.html(), unfocused.html());
    }

    #[test]
    fn anchor_is_centered() {
        let icon = MarkerIcon::new(AlertCategory::Weather, false);
        let (ax, ay) = icon.anchor_px();
        assert_eq!(ax as u32 * 2, icon.size_px());
        assert_eq!(ay as u32 * 2, icon.size_px());
    }

    #[test]
    fn every_category_has_distinct_color() {
        let mut seen = std::collections::HashSet::new();
        for category in AlertCategory::ALL {
            assert!(seen.insert(crate::colors::category_rgb(category)));
        }
    }
}
