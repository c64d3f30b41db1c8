//! Static lookup from attribute tags to the dashboard's badge images.
//! Lookups are case-insensitive; a miss logs and resolves to nothing.

use tracing::warn;

/// Which tag list a lookup key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCategory {
    DynamicRange,
    AudioFormat,
    CombinedFormat,
    Resolution,
    Edition,
}

const DYNAMIC_RANGE_IMAGES: &[(&str, &str)] = &[
    ("DV", "/static/images/mediainfo/codec/DV.png"),
    ("HDR", "/static/images/mediainfo/codec/HDR.png"),
    ("Plus", "/static/images/mediainfo/codec/Plus.png"),
    ("DV-HDR", "/static/images/mediainfo/codec/DV-HDR.png"),
    ("DV-Plus", "/static/images/mediainfo/codec/DV-Plus.png"),
];

const AUDIO_FORMAT_IMAGES: &[(&str, &str)] = &[
    ("DigitalPlus", "/static/images/mediainfo/codec/DigitalPlus.png"),
    ("DTS-HD", "/static/images/mediainfo/codec/DTS-HD.png"),
    ("DTS-X", "/static/images/mediainfo/codec/DTS-X.png"),
    ("TrueHD", "/static/images/mediainfo/codec/TrueHD.png"),
    ("Atmos", "/static/images/mediainfo/codec/Atmos.png"),
    ("TrueHD-Atmos", "/static/images/mediainfo/codec/TrueHD-Atmos.png"),
];

const COMBINED_FORMAT_IMAGES: &[(&str, &str)] = &[
    (
        "DV-DigitalPlus",
        "/static/images/mediainfo/codec/DV-DigitalPlus.png",
    ),
    (
        "HDR-DigitalPlus",
        "/static/images/mediainfo/codec/HDR-DigitalPlus.png",
    ),
    (
        "Plus-DigitalPlus",
        "/static/images/mediainfo/codec/Plus-DigitalPlus.png",
    ),
    (
        "DV-HDR-DigitalPlus",
        "/static/images/mediainfo/codec/DV-HDR-DigitalPlus.png",
    ),
    (
        "DV-Plus-DigitalPlus",
        "/static/images/mediainfo/codec/DV-Plus-DigitalPlus.png",
    ),
];

const RESOLUTION_IMAGES: &[(&str, &str)] = &[
    ("Ultra-HD", "/static/images/mediainfo/resolution/Ultra-HD.png"),
    ("1080p", "/static/images/mediainfo/resolution/1080P.png"),
    ("2160p", "/static/images/mediainfo/resolution/Ultra-HD.png"),
];

const EDITION_IMAGES: &[(&str, &str)] = &[
    ("IMAX", "/static/images/mediainfo/edition/IMAX.png"),
    (
        "Extended",
        "/static/images/mediainfo/edition/Extended-Edition.png",
    ),
    (
        "Extended-Cut",
        "/static/images/mediainfo/edition/Extended-Cut.png",
    ),
    (
        "Theatrical",
        "/static/images/mediainfo/edition/Theatrical.png",
    ),
    (
        "Directors",
        "/static/images/mediainfo/edition/Directors-Cut.png",
    ),
    (
        "Special",
        "/static/images/mediainfo/edition/Special-Edition.png",
    ),
    (
        "Unrated",
        "/static/images/mediainfo/edition/Unrated-Edition.png",
    ),
    (
        "Ultimate-Edition",
        "/static/images/mediainfo/edition/Ultimate-Edition.png",
    ),
];

fn table_for(category: AssetCategory) -> &'static [(&'static str, &'static str)] {
    match category {
        AssetCategory::DynamicRange => DYNAMIC_RANGE_IMAGES,
        AssetCategory::AudioFormat => AUDIO_FORMAT_IMAGES,
        AssetCategory::CombinedFormat => COMBINED_FORMAT_IMAGES,
        AssetCategory::Resolution => RESOLUTION_IMAGES,
        AssetCategory::Edition => EDITION_IMAGES,
    }
}

/// Resolve the badge image path for a tag. Key comparison ignores case.
pub fn media_info_image(category: AssetCategory, key: &str) -> Option<&'static str> {
    let found = table_for(category)
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, path)| *path);

    if found.is_none() {
        warn!("No image found for {:?} tag '{}'", category, key);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(
            media_info_image(AssetCategory::DynamicRange, "dv"),
            Some("/static/images/mediainfo/codec/DV.png")
        );
        assert_eq!(
            media_info_image(AssetCategory::Resolution, "ULTRA-HD"),
            Some("/static/images/mediainfo/resolution/Ultra-HD.png")
        );
    }

    #[test]
    fn both_resolution_spellings_resolve_to_the_same_asset() {
        assert_eq!(
            media_info_image(AssetCategory::Resolution, "2160p"),
            media_info_image(AssetCategory::Resolution, "Ultra-HD"),
        );
    }

    #[test]
    fn unknown_tag_resolves_to_none() {
        assert_eq!(media_info_image(AssetCategory::Edition, "Bootleg"), None);
    }
}
