//! Lenient parsing for labeled-line backend replies.
//!
//! The backend is asked for `LABEL: value` lines (RESULT/CONFIDENCE/…), but
//! compliance is not guaranteed. Parsing scans line by line for each label
//! and takes the remainder; every field has a safe default.

/// First line containing `LABEL:`, with the label and leading colon removed.
pub fn labeled_field(raw: &str, label: &str) -> Option<String> {
    let tag = format!("{label}:");
    raw.lines().find_map(|line| {
        line.find(&tag)
            .map(|i| line[i + tag.len()..].trim().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Coerce a confidence value into an integer in [0, 100].
///
/// A trailing `%` is stripped; anything unparseable ("high", missing line)
/// defaults to 50.
pub fn parse_confidence(value: Option<&str>) -> u8 {
    let Some(v) = value else { return 50 };
    let cleaned = v.trim().trim_end_matches('%').trim();
    match cleaned.parse::<f32>() {
        Ok(x) if x.is_finite() => x.round().clamp(0.0, 100.0) as u8,
        _ => 50,
    }
}
