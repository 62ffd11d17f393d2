// tests/resolver_matrix.rs
// Locale-matrix resolution properties: every input yields at least one
// non-empty tier, and misses fall back to the worldwide groups.

use news_veracity_analyzer::sources::{FeedMatrix, SourceKind, SourceResolver};

fn resolver(api_configured: bool) -> SourceResolver {
    SourceResolver::new(FeedMatrix::embedded(), api_configured)
}

#[test]
fn every_known_locale_yields_a_non_empty_tier() {
    let r = resolver(false);
    let known = [
        ("in", "hi"),
        ("in", "en"),
        ("us", "en"),
        ("us", "es"),
        ("gb", "en"),
        ("de", "de"),
        ("de", "en"),
        ("fr", "fr"),
        ("fr", "en"),
        ("es", "es"),
        ("jp", "ja"),
        ("jp", "en"),
        ("br", "pt"),
        ("ca", "en"),
        ("ca", "fr"),
        ("au", "en"),
        ("it", "it"),
        ("ru", "ru"),
        ("cn", "zh"),
        ("kr", "ko"),
    ];
    for (country, language) in known {
        let tiers = r.resolve("general", country, language);
        assert!(!tiers.is_empty(), "{country}/{language}: no tiers");
        assert!(
            tiers.iter().all(|t| !t.candidates.is_empty()),
            "{country}/{language}: empty tier"
        );
    }
}

#[test]
fn category_specific_feeds_beat_general_within_a_locale() {
    let r = resolver(false);
    let business = r.resolve("business", "gb", "en");
    let general = r.resolve("general", "gb", "en");
    let business_urls: Vec<_> = business[0].candidates.iter().map(|c| &c.endpoint).collect();
    assert!(
        business_urls.iter().any(|u| u.contains("business")),
        "expected the gb/en business group, got {business_urls:?}"
    );
    assert_ne!(
        business_urls,
        general[0]
            .candidates
            .iter()
            .map(|c| &c.endpoint)
            .collect::<Vec<_>>()
    );
}

#[test]
fn unknown_category_falls_back_to_locale_general() {
    let r = resolver(false);
    let tiers = r.resolve("sports", "gb", "en");
    // gb/en has no sports group; its general group applies, not worldwide's.
    assert_eq!(tiers[0].candidates[0].locale.country, "gb");
    let urls: Vec<_> = tiers[0].candidates.iter().map(|c| &c.endpoint).collect();
    assert!(urls.iter().any(|u| u.contains("bbci.co.uk/news/rss.xml")));
}

#[test]
fn unknown_locale_falls_back_to_worldwide_category_group() {
    let r = resolver(false);
    let tiers = r.resolve("technology", "zz", "xx");
    assert_eq!(tiers.len(), 1);
    assert_eq!(tiers[0].candidates[0].locale.country, "worldwide");
    let urls: Vec<_> = tiers[0].candidates.iter().map(|c| &c.endpoint).collect();
    assert!(urls.iter().any(|u| u.contains("technologyNews")));
}

#[test]
fn unknown_locale_and_category_fall_back_to_worldwide_general() {
    let r = resolver(false);
    let tiers = r.resolve("astrology", "zz", "xx");
    assert!(!tiers[0].candidates.is_empty());
    let urls: Vec<_> = tiers[0].candidates.iter().map(|c| &c.endpoint).collect();
    assert!(urls.iter().any(|u| u.contains("topNews") || u.contains("bbci")));
}

#[test]
fn structured_api_is_tier_zero_when_configured() {
    let with_api = resolver(true).resolve("general", "us", "en");
    assert_eq!(with_api[0].kind, SourceKind::StructuredApi);
    assert_eq!(with_api[1].kind, SourceKind::Feed);

    let without_api = resolver(false).resolve("general", "us", "en");
    assert_eq!(without_api[0].kind, SourceKind::Feed);
}

#[test]
fn api_tier_is_present_even_for_unknown_locales() {
    let tiers = resolver(true).resolve("general", "zz", "xx");
    assert_eq!(tiers[0].kind, SourceKind::StructuredApi);
    assert!(tiers[1].candidates.iter().all(|c| c.kind == SourceKind::Feed));
}
