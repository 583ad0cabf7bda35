use chrono::{TimeZone, Utc};
use rstest::rstest;
use tag_pattern::image::{ImageInfo, filter_and_sort, newest, sort_images};
use tag_pattern::pattern::{PATTERN_ALL, Pattern, TagMatcher};

const TAGS: &[&str] = &[
    "latest",
    "1.0.0",
    "1.0.0-rc1",
    "v1.2.3",
    "1.9.9",
    "2.0.0",
    "2.0",
    "not-a-version",
    "3.19-alpine",
    "",
];

#[rstest]
#[case("v1.*", "glob:v1.*")]
#[case("glob:v1.*", "glob:v1.*")]
#[case("latest", "glob:latest")]
#[case("semver:~1.2", "semver:~1.2")]
fn string_form_is_prefixed(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(Pattern::new(raw).to_string(), expected);
}

#[rstest]
#[case(">=1.2.0 <2.0.0")]
#[case("^1.2")]
#[case("~1.2.3 || 3.x")]
#[case("*")]
fn valid_semver_expressions_are_valid(#[case] expression: &str) {
    assert!(Pattern::new(&format!("semver:{expression}")).is_valid());
}

#[rstest]
#[case("")]
#[case(">=")]
#[case("bogus")]
#[case("^1.0 ||")]
fn malformed_semver_expressions_are_invalid_but_match_all_versions(#[case] expression: &str) {
    let pattern = Pattern::new(&format!("semver:{expression}"));

    assert!(!pattern.is_valid());
    for tag in ["0.0.1", "1.0.0-rc1", "v2", "99.1.0"] {
        assert!(pattern.matches(tag), "{pattern} should match {tag}");
    }
    assert!(!pattern.matches("latest"));
}

#[test]
fn semver_match_all_accepts_only_versions() {
    let pattern = Pattern::new("semver:*");

    for tag in ["1.0.0", "1.0.0-rc1", "v1.2.3", "2.0"] {
        assert!(pattern.matches(tag), "{tag}");
    }
    for tag in ["latest", "not-a-version", "1.2.3.4", ""] {
        assert!(!pattern.matches(tag), "{tag}");
    }
}

#[test]
fn glob_match_all_accepts_everything() {
    let pattern = Pattern::new("glob:*");

    for tag in TAGS {
        assert!(pattern.matches(tag), "{tag}");
    }
    assert_eq!(pattern, *PATTERN_ALL);
}

#[rstest]
#[case("glob:v1.*", "v1.2.3", true)]
#[case("glob:v1.*", "v2.0.0", false)]
#[case("semver:>=1.2.0 <2.0.0", "1.9.9", true)]
#[case("semver:>=1.2.0 <2.0.0", "2.0.0", false)]
#[case("semver:>=1.2.0 <2.0.0", "not-a-version", false)]
fn matches_expected_tags(#[case] raw: &str, #[case] tag: &str, #[case] expected: bool) {
    assert_eq!(Pattern::new(raw).matches(tag), expected);
}

#[rstest]
#[case("v1.*")]
#[case("glob:*")]
#[case("semver:>=1.2.0 <2.0.0")]
#[case("semver:bogus")]
#[case("semver:*")]
fn reparsing_string_form_preserves_matching(#[case] raw: &str) {
    let pattern = Pattern::new(raw);
    let reparsed = Pattern::new(&pattern.to_string());

    for tag in TAGS {
        assert_eq!(pattern.matches(tag), reparsed.matches(tag), "{tag}");
    }
    assert_eq!(pattern.is_valid(), reparsed.is_valid());
}

#[test]
fn patterns_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Pattern>();

    let pattern = std::sync::Arc::new(Pattern::new("semver:^1"));
    let handles: Vec<_> = ["1.0.0", "1.9.9", "2.0.0"]
        .into_iter()
        .map(|tag| {
            let pattern = std::sync::Arc::clone(&pattern);
            std::thread::spawn(move || pattern.matches(tag))
        })
        .collect();
    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results, vec![true, true, false]);
    assert!(std::thread::spawn(|| PATTERN_ALL.matches("x")).join().unwrap());
}

#[test]
fn glob_ordering_ranks_by_creation_time_only() {
    let pattern = Pattern::new("glob:*");
    let january = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let june = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let mut images = vec![
        ImageInfo::new("9.0.0").with_created_at(january),
        ImageInfo::new("1.0.0").with_created_at(june),
    ];

    sort_images(&mut images, pattern.image_newer_fn());

    assert_eq!(images[0].tag, "1.0.0");
}

#[test]
fn semver_ordering_ranks_by_precedence() {
    let pattern = Pattern::new("semver:*");
    let newer = pattern.image_newer_fn();

    assert!(newer(&ImageInfo::new("2.0.0"), &ImageInfo::new("1.9.9")).is_lt());
    assert!(newer(&ImageInfo::new("1.0.0"), &ImageInfo::new("1.0.0-rc1")).is_lt());
}

#[test]
fn newest_picks_highest_matching_version() {
    let images = TAGS.iter().map(|t| ImageInfo::new(*t));
    let best = newest(&Pattern::new("semver:<2.0.0"), images).unwrap();

    assert_eq!(best.tag, "1.9.9");
}

#[test]
fn filter_and_sort_drops_non_matching_tags() {
    let images = TAGS.iter().map(|t| ImageInfo::new(*t));
    let sorted = filter_and_sort(&Pattern::new("semver:^2"), images);
    let tags: Vec<&str> = sorted.iter().map(|i| i.tag.as_str()).collect();

    assert_eq!(tags, vec!["2.0.0", "2.0"]);
}
