use beacon_shared::Alert;

/// What the map should currently emphasize, computed fresh from the transient
/// UI signals on every pass. At most one primary focus exists at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusOutcome {
    /// No highlight and no search match: leave the viewport alone.
    None,
    /// One alert holds focus: center on it and open its popup.
    Single(String),
    /// Several search matches: fit the viewport to all of them, emphasize and
    /// open none. Ids are sorted, so equal match sets compare equal.
    Region(Vec<String>),
}

impl FocusOutcome {
    /// The id of the single emphasized alert, if there is one.
    pub fn focused_id(&self) -> Option<&str> {
        match self {
            FocusOutcome::Single(id) => Some(id),
            _ => None,
        }
    }
}

/// Resolve the focus for the current inputs.
///
/// Rule order: a highlighted alert that is still present in the list always
/// wins; then a non-empty search term (matched case-insensitively over title,
/// description, and address); otherwise no focus. A highlight pointing at an
/// id no longer in the list is ignored, never an error.
pub fn resolve(alerts: &[Alert], search_term: &str, highlighted: Option<&str>) -> FocusOutcome {
    if let Some(id) = highlighted
        && alerts.iter().any(|alert| alert.id == id)
    {
        return FocusOutcome::Single(id.to_string());
    }

    if !search_term.is_empty() {
        let mut ids: Vec<String> = alerts
            .iter()
            .filter(|alert| alert.matches_query(search_term))
            .map(|alert| alert.id.clone())
            .collect();
        return match ids.len() {
            0 => FocusOutcome::None,
            1 => FocusOutcome::Single(ids.remove(0)),
            _ => {
                // Sorted so the outcome compares equal across passes that
                // merely reorder the alert list; a reorder must never read as
                // a focus change.
                ids.sort();
                FocusOutcome::Region(ids)
            }
        };
    }

    FocusOutcome::None
}
