/// Display form of a raw status value: first letter upper-cased, rest lower-cased.
/// Missing or empty input reads as "Unknown".
pub fn format_status(status: Option<&str>) -> String {
    let Some(status) = status.filter(|s| !s.is_empty()) else {
        return "Unknown".to_string();
    };

    let mut chars = status.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => "Unknown".to_string(),
    }
}
