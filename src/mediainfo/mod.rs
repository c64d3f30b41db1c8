pub mod assets;

use crate::models::MediaInfo;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Which list a rule's key is destined for. Format keys go through the
/// key-shape routing below; resolution and edition rules route directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleCategory {
    Format,
    Resolution,
    Edition,
}

/// One classification rule. `vetoes` replaces the negative lookaheads of the
/// source patterns: the rule fires only when `pattern` matches and no veto
/// does.
pub struct Rule {
    pub key: &'static str,
    pub category: RuleCategory,
    pattern: Regex,
    vetoes: Vec<Regex>,
}

impl Rule {
    fn new(key: &'static str, category: RuleCategory, pattern: &str, vetoes: &[&str]) -> Self {
        Self {
            key,
            category,
            pattern: case_insensitive(pattern),
            vetoes: vetoes.iter().map(|v| case_insensitive(v)).collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text) && !self.vetoes.iter().any(|v| v.is_match(text))
    }
}

fn case_insensitive(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("invalid classification pattern")
}

/// Keys admitted to the dynamic-range list.
const DYNAMIC_RANGE_KEYS: &[&str] = &["DV", "HDR", "Plus"];

/// Keys admitted to the audio-format list. Anything else without a separator
/// is silently dropped, as a guard against rule/vocabulary drift.
const AUDIO_FORMAT_KEYS: &[&str] = &[
    "DigitalPlus",
    "DTS-HD",
    "DTS-X",
    "TrueHD",
    "Atmos",
    "TrueHD-Atmos",
];

/// An ordered rule table. Every matching rule contributes its key; there is
/// no short-circuit, so one input can carry several tags per category.
pub struct RuleSet {
    rules: Vec<Rule>,
}

// Second halves of the combined-format patterns.
const EAC3: &str = r"\[(EAC3|DD\+|E-AC-3)( 5\.1| 7\.1)?\]";
const DTS_HD: &str = r"\[DTS-HD MA( 5\.1| 7\.1)?\]";
const DTS_X: &str = r"\[DTS-X( 5\.1| 7\.1)?\]";
const EAC3_ATMOS: &str = r"\[EAC3 Atmos( 5\.1)?\]";
const TRUEHD: &str = r"\[[^\]]*TrueHD( 7\.1)?\]";
const TRUEHD_ATMOS: &str = r"\[TrueHD Atmos( 7\.1)?\]";

// A bare [DV] tag only counts when no HDR signal follows it; the more
// specific DV-HDR rules pick those up instead.
const DV_HDR_VETO: &str = r"\[DV\].*HDR";
// A TrueHD match must not come from a bracket that also carries Atmos.
const TRUEHD_ATMOS_VETO: &str = r"\[[^\]]*(TrueHD[^\]]*Atmos|Atmos[^\]]*TrueHD)[^\]]*\]";

impl RuleSet {
    /// The standard rule table, in source order.
    pub fn standard() -> &'static RuleSet {
        static RULES: OnceLock<RuleSet> = OnceLock::new();
        RULES.get_or_init(|| RuleSet {
            rules: build_standard_rules(),
        })
    }

    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Classify a release name into attribute tags. Pure: same input, same
    /// output; rules are evaluated in order and all matches are collected.
    pub fn classify(&self, text: &str) -> MediaInfo {
        let mut info = MediaInfo::default();

        for rule in &self.rules {
            if !rule.matches(text) {
                continue;
            }
            match rule.category {
                RuleCategory::Resolution => info.resolution.push(rule.key.to_string()),
                RuleCategory::Edition => info.edition.push(rule.key.to_string()),
                RuleCategory::Format => {
                    // Key-shape routing: separator keys describe a combined
                    // signal; the rest must belong to a known vocabulary.
                    if rule.key.contains('-') {
                        info.combined_format.push(rule.key.to_string());
                    } else if DYNAMIC_RANGE_KEYS.contains(&rule.key) {
                        info.dynamic_range.push(rule.key.to_string());
                    } else if AUDIO_FORMAT_KEYS.contains(&rule.key) {
                        info.audio_format.push(rule.key.to_string());
                    } else {
                        debug!("Classification key '{}' outside known vocabularies, dropping", rule.key);
                    }
                }
            }
        }

        info
    }
}

/// Classify with the standard rule table.
pub fn classify(text: &str) -> MediaInfo {
    RuleSet::standard().classify(text)
}

fn build_standard_rules() -> Vec<Rule> {
    use RuleCategory::{Edition, Format, Resolution};

    let combined = |key: &'static str, first: &str, second: &str, vetoes: &[&str]| {
        Rule::new(key, Format, &format!("{}.*{}", first, second), vetoes)
    };

    vec![
        Rule::new("DV", Format, r"\[DV\]", &[DV_HDR_VETO]),
        Rule::new("HDR", Format, r"\[HDR10\]", &[]),
        Rule::new("Plus", Format, r"\[HDR10Plus\]", &[]),
        Rule::new("DigitalPlus", Format, r"\[EAC3( 5\.1)?\]", &[]),
        Rule::new("DTS-HD", Format, DTS_HD, &[]),
        Rule::new("DTS-X", Format, DTS_X, &[]),
        Rule::new("TrueHD", Format, TRUEHD, &[TRUEHD_ATMOS_VETO]),
        Rule::new("Atmos", Format, EAC3_ATMOS, &[]),
        Rule::new("TrueHD-Atmos", Format, TRUEHD_ATMOS, &[]),
        Rule::new("DV-HDR", Format, r"\[DV HDR10\]", &[]),
        Rule::new("DV-Plus", Format, r"\[DV HDR10Plus\]", &[]),
        // Combined formats
        combined("DV-DigitalPlus", r"\[DV\]", EAC3, &[DV_HDR_VETO]),
        combined("HDR-DigitalPlus", r"\[HDR10\]", EAC3, &[]),
        combined("Plus-DigitalPlus", r"\[HDR10\+\]", EAC3, &[]),
        combined("DV-HDR-DigitalPlus", r"\[DV HDR10\]", EAC3, &[]),
        combined("DV-Plus-DigitalPlus", r"\[DV HDR10\+\]", EAC3, &[]),
        combined("DV-DTS-HD", r"\[DV\]", DTS_HD, &[DV_HDR_VETO]),
        combined("HDR-DTS-HD", r"\[HDR10\]", DTS_HD, &[]),
        combined("Plus-DTS-HD", r"\[HDR10Plus\]", DTS_HD, &[]),
        combined("DV-HDR-DTS-HD", r"\[DV HDR10\]", DTS_HD, &[]),
        combined("DV-Plus-DTS-HD", r"\[DV HDR10Plus\]", DTS_HD, &[]),
        combined("DV-DTS-X", r"\[DV\]", DTS_X, &[DV_HDR_VETO]),
        combined("HDR-DTS-X", r"\[HDR10\]", DTS_X, &[]),
        combined("Plus-DTS-X", r"\[HDR10Plus\]", DTS_X, &[]),
        combined("DV-HDR-DTS-X", r"\[DV HDR10\]", DTS_X, &[]),
        combined("DV-Plus-DTS-X", r"\[DV HDR10Plus\]", DTS_X, &[]),
        combined("DV-Atmos", r"\[DV\]", EAC3_ATMOS, &[DV_HDR_VETO]),
        combined("HDR-Atmos", r"\[HDR10\]", EAC3_ATMOS, &[]),
        combined("Plus-Atmos", r"\[HDR10Plus\]", EAC3_ATMOS, &[]),
        combined("DV-HDR-Atmos", r"\[DV HDR10\]", EAC3_ATMOS, &[]),
        combined("DV-Plus-Atmos", r"\[DV HDR10Plus\]", EAC3_ATMOS, &[]),
        combined("DV-TrueHD", r"\[DV\]", TRUEHD, &[DV_HDR_VETO, TRUEHD_ATMOS_VETO]),
        combined("HDR-TrueHD", r"\[HDR10\]", TRUEHD, &[TRUEHD_ATMOS_VETO]),
        combined("Plus-TrueHD", r"\[HDR10Plus\]", TRUEHD, &[TRUEHD_ATMOS_VETO]),
        combined("DV-HDR-TrueHD", r"\[DV HDR10\]", TRUEHD, &[TRUEHD_ATMOS_VETO]),
        combined("DV-Plus-TrueHD", r"\[DV HDR10Plus\]", TRUEHD, &[TRUEHD_ATMOS_VETO]),
        combined("DV-TrueHD-Atmos", r"\[DV\]", TRUEHD_ATMOS, &[DV_HDR_VETO]),
        combined("HDR-TrueHD-Atmos", r"\[HDR10\]", TRUEHD_ATMOS, &[]),
        combined("Plus-TrueHD-Atmos", r"\[HDR10Plus\]", TRUEHD_ATMOS, &[]),
        combined("DV-HDR-TrueHD-Atmos", r"\[DV HDR10\]", TRUEHD_ATMOS, &[]),
        combined("DV-Plus-TrueHD-Atmos", r"\[DV HDR10Plus\]", TRUEHD_ATMOS, &[]),
        // Resolution
        Rule::new("1080P", Resolution, r"1080p", &[]),
        Rule::new("Ultra-HD", Resolution, r"(4k|2160p)", &[]),
        // Editions
        Rule::new("IMAX", Edition, r"\{edition-IMAX[^}]*\}", &[]),
        Rule::new("Unrated-Edition", Edition, r"\{edition-Unrated[^}]*\}", &[]),
        Rule::new(
            "Directors-Cut",
            Edition,
            r"\{edition-(Director|Ultimate Director)[^}]*\}",
            &[],
        ),
        Rule::new("Special-Edition", Edition, r"\{edition-Special[^}]*\}", &[]),
        Rule::new(
            "Anniversary-Edition",
            Edition,
            r"\{edition-\d+th Anniversary[^}]*\}",
            &[],
        ),
        Rule::new(
            "Collectors-Edition",
            Edition,
            r"\{edition-Collector[^}]*\}",
            &[],
        ),
        Rule::new("Minus-Color", Edition, r"\{edition-Minus Color[^}]*\}", &[]),
        Rule::new("Extended-Cut", Edition, r"\{edition-Extended Cut[^}]*\}", &[]),
        Rule::new(
            "Extended-Edition",
            Edition,
            r"\{edition-Extended[^}]*\}",
            &[r"\{edition-Extended Cut"],
        ),
        Rule::new("Open-Matte", Edition, r"\{edition-Open Matte[^}]*\}", &[]),
        Rule::new("Final-Cut", Edition, r"\{edition-Final Cut[^}]*\}", &[]),
        Rule::new("Remastered", Edition, r"\{edition-Remastered[^}]*\}", &[]),
        Rule::new("Restored", Edition, r"\{edition-Restored[^}]*\}", &[]),
        Rule::new(
            "Signature-Edition",
            Edition,
            r"\{edition-Signature[^}]*\}",
            &[],
        ),
        Rule::new(
            "Theatrical",
            Edition,
            r"\{edition-Theatrical[^}]*\}",
            &[r"\{edition-Theatrical Cut"],
        ),
        Rule::new(
            "Theatrical-Cut",
            Edition,
            r"\{edition-Theatrical Cut[^}]*\}",
            &[],
        ),
        Rule::new("Uncut", Edition, r"\{edition-Uncut[^}]*\}", &[]),
        Rule::new(
            "Ultimate-Edition",
            Edition,
            r"\{edition-Ultimate[^}]*\}",
            &[r"\{edition-Ultimate Director"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_all_matches_without_short_circuit() {
        let info = classify("Movie.Name.2020.[DV].[EAC3 5.1]");
        assert_eq!(info.dynamic_range, vec!["DV"]);
        assert_eq!(info.audio_format, vec!["DigitalPlus"]);
        assert_eq!(info.combined_format, vec!["DV-DigitalPlus"]);
    }

    #[test]
    fn bare_dv_suppressed_when_hdr_follows() {
        let info = classify("Movie.[DV].[HDR10].[EAC3]");
        assert!(!info.dynamic_range.contains(&"DV".to_string()));
        assert!(info.dynamic_range.contains(&"HDR".to_string()));
        // The HDR combined rule still fires.
        assert!(info.combined_format.contains(&"HDR-DigitalPlus".to_string()));
        assert!(!info.combined_format.contains(&"DV-DigitalPlus".to_string()));
    }

    #[test]
    fn truehd_not_counted_when_bracket_carries_atmos() {
        let info = classify("Movie.2020.[TrueHD Atmos 7.1]");
        assert!(!info.audio_format.contains(&"TrueHD".to_string()));
        assert!(info.combined_format.contains(&"TrueHD-Atmos".to_string()));

        let plain = classify("Movie.2020.[TrueHD 7.1]");
        assert_eq!(plain.audio_format, vec!["TrueHD"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let info = classify("movie.name.2020.[dv].[eac3 5.1].2160P");
        assert_eq!(info.dynamic_range, vec!["DV"]);
        assert_eq!(info.resolution, vec!["Ultra-HD"]);
    }

    #[test]
    fn resolution_tags() {
        assert_eq!(classify("Some.Movie.1080p.WEB").resolution, vec!["1080P"]);
        assert_eq!(classify("Some.Movie.4K.HDR").resolution, vec!["Ultra-HD"]);
        assert_eq!(classify("Some.Movie.2160p").resolution, vec!["Ultra-HD"]);
    }

    #[test]
    fn edition_tags() {
        let info = classify("Movie (2001) {edition-Extended Cut} 1080p");
        assert_eq!(info.edition, vec!["Extended-Cut"]);

        let info = classify("Movie (2001) {edition-Extended Director Approved}");
        assert_eq!(info.edition, vec!["Extended-Edition"]);

        let info = classify("Movie {edition-Theatrical}");
        assert_eq!(info.edition, vec!["Theatrical"]);

        let info = classify("Movie {edition-Theatrical Cut}");
        assert_eq!(info.edition, vec!["Theatrical-Cut"]);
    }

    #[test]
    fn out_of_vocabulary_key_is_dropped() {
        let rules = RuleSet::from_rules(vec![Rule::new(
            "FLAC",
            RuleCategory::Format,
            r"\[FLAC\]",
            &[],
        )]);
        let info = rules.classify("Movie.[FLAC]");
        assert!(info.dynamic_range.is_empty());
        assert!(info.audio_format.is_empty());
        assert!(info.combined_format.is_empty());
        assert!(info.resolution.is_empty());
        assert!(info.edition.is_empty());
    }

    #[test]
    fn separator_format_keys_route_to_combined() {
        let info = classify("Movie.[DTS-HD MA 5.1]");
        assert!(info.combined_format.contains(&"DTS-HD".to_string()));
        assert!(info.audio_format.is_empty());
    }

    #[test]
    fn plain_text_yields_nothing() {
        let info = classify("Completely Ordinary Name");
        assert_eq!(info, MediaInfo::default());
    }
}
