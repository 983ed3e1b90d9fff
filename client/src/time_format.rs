/// Compact relative age for alert popups ("just now", "5 min ago", "3 h ago").
pub fn format_age(age_secs: i64) -> String {
    let secs = age_secs.max(0);
    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        format!("{} min ago", secs / 60)
    } else if secs < 86_400 {
        format!("{} h ago", secs / 3600)
    } else {
        format!("{} d ago", secs / 86_400)
    }
}
