//! Display-name ↔ code tables for the request surface.

/// Country display names and their request codes.
pub fn country_codes() -> &'static [(&'static str, &'static str)] {
    &[
        ("Worldwide", "worldwide"),
        ("United States", "us"),
        ("United Kingdom", "gb"),
        ("India", "in"),
        ("Canada", "ca"),
        ("Australia", "au"),
        ("Germany", "de"),
        ("France", "fr"),
        ("Spain", "es"),
        ("Japan", "jp"),
        ("Brazil", "br"),
        ("Italy", "it"),
        ("Netherlands", "nl"),
        ("South Korea", "kr"),
        ("Mexico", "mx"),
        ("Russia", "ru"),
        ("China", "cn"),
    ]
}

/// Language display names and their ISO codes.
pub fn language_codes() -> &'static [(&'static str, &'static str)] {
    &[
        ("English", "en"),
        ("Spanish", "es"),
        ("French", "fr"),
        ("German", "de"),
        ("Italian", "it"),
        ("Portuguese", "pt"),
        ("Japanese", "ja"),
        ("Chinese", "zh"),
        ("Korean", "ko"),
        ("Russian", "ru"),
        ("Dutch", "nl"),
        ("Hindi", "hi"),
    ]
}

/// Supported news categories.
pub fn categories() -> &'static [(&'static str, &'static str)] {
    &[
        ("General", "general"),
        ("Business", "business"),
        ("Technology", "technology"),
        ("Sports", "sports"),
        ("Health", "health"),
        ("Science", "science"),
        ("Entertainment", "entertainment"),
    ]
}
