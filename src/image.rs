//! Image tag metadata and newest-first ordering

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pattern::{TagMatcher, parse_version};

/// Ordering function for ranking images. `Ordering::Less` means the left image is newer.
pub type NewerFn = fn(&ImageInfo, &ImageInfo) -> Ordering;

/// A candidate image tag with its creation time, if known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub tag: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ImageInfo {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Newest creation time first. Images without a creation time come last;
/// ties are broken by tag.
pub fn by_created_desc(lhs: &ImageInfo, rhs: &ImageInfo) -> Ordering {
    rhs.created_at
        .cmp(&lhs.created_at)
        .then_with(|| lhs.tag.cmp(&rhs.tag))
}

/// Highest version first. Tags that are not versions come last, ordered by tag.
///
/// `1.10` and `1.10.0` have equal precedence; the more explicit `1.10.0` ranks first.
pub fn by_semver_tag_desc(lhs: &ImageInfo, rhs: &ImageInfo) -> Ordering {
    match (parse_version(&lhs.tag), parse_version(&rhs.tag)) {
        (Some(l), Some(r)) => r
            .cmp_precedence(&l)
            .then_with(|| rhs.tag.cmp(&lhs.tag)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => lhs.tag.cmp(&rhs.tag),
    }
}

/// Sort images in place, newest first
pub fn sort_images(images: &mut [ImageInfo], newer: NewerFn) {
    images.sort_by(newer);
}

/// Keep the images whose tag matches `pattern`, newest first by the pattern's ordering
pub fn filter_and_sort<M, I>(pattern: &M, images: I) -> Vec<ImageInfo>
where
    M: TagMatcher + ?Sized,
    I: IntoIterator<Item = ImageInfo>,
{
    let mut matching: Vec<ImageInfo> = images
        .into_iter()
        .filter(|image| pattern.matches(&image.tag))
        .collect();
    sort_images(&mut matching, pattern.image_newer_fn());
    matching
}

/// The newest image matching `pattern`
pub fn newest<M, I>(pattern: &M, images: I) -> Option<ImageInfo>
where
    M: TagMatcher + ?Sized,
    I: IntoIterator<Item = ImageInfo>,
{
    filter_and_sort(pattern, images).into_iter().next()
}
