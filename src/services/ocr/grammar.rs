//! Per-platform text grammars.
//!
//! Each screen family has a fixed panel crop, an address pattern and a
//! last-seen pattern. The grammars are compiled once and shared read-only.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::models::ocr_result::DetectedPlatform;

/// Street-type suffixes accepted before the city part of an address
const STREET_SUFFIXES: &str = "Rd|Ave|St|Dr|Blvd|Pkwy|Way|Ln|Court|Place|Road|Avenue|Street|Drive|Boulevard|Parkway|Lane";

/// `<number> <street tokens> <suffix> [trailing tokens], <region> <postal>`
static ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?im)\d+\s+[\w\s\-]+(?:{})[.,\s]*[\w\s]+,\s*[A-Z]{{2}}\s+\d{{5}}",
        STREET_SUFFIXES
    );
    Regex::new(&pattern).expect("address pattern is valid")
});

static APPLE_LAST_SEEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+\s+(?:second|minute|hour|day)s?\s+ago").expect("last seen pattern is valid")
});

static GOOGLE_LAST_SEEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Last seen\s+\d+\s+(?:min|hr|day)s?\s+ago").expect("last seen pattern is valid")
});

static LAST_SEEN_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*last seen\s+").expect("prefix pattern is valid"));

static MINUTES_ABBREV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bmins?\b").expect("minutes pattern is valid"));

static HOURS_ABBREV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bhrs?\b").expect("hours pattern is valid"));

/// Screen family a screenshot was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Apple "Find My" item screen
    Apple,
    /// Google "Find My Device" screen
    Google,
}

/// Fixed text grammar of one platform
pub struct PlatformGrammar {
    /// Fraction of image height kept, measured from the bottom
    pub crop_fraction: f64,
    pub address: &'static Regex,
    pub last_seen: &'static Regex,
    /// Last-seen matches carry a literal "Last seen" prefix
    pub strips_last_seen_prefix: bool,
}

static APPLE_GRAMMAR: LazyLock<PlatformGrammar> = LazyLock::new(|| PlatformGrammar {
    crop_fraction: 0.40,
    address: &ADDRESS,
    last_seen: &APPLE_LAST_SEEN,
    strips_last_seen_prefix: false,
});

static GOOGLE_GRAMMAR: LazyLock<PlatformGrammar> = LazyLock::new(|| PlatformGrammar {
    crop_fraction: 0.35,
    address: &ADDRESS,
    last_seen: &GOOGLE_LAST_SEEN,
    strips_last_seen_prefix: true,
});

impl Platform {
    pub fn grammar(self) -> &'static PlatformGrammar {
        match self {
            Platform::Apple => &APPLE_GRAMMAR,
            Platform::Google => &GOOGLE_GRAMMAR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Apple => "apple",
            Platform::Google => "google",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Platform> for DetectedPlatform {
    fn from(platform: Platform) -> Self {
        match platform {
            Platform::Apple => DetectedPlatform::Apple,
            Platform::Google => DetectedPlatform::Google,
        }
    }
}

impl PlatformGrammar {
    /// Rewrite a matched last-seen phrase into the long form.
    ///
    /// "Last seen 5 min ago" becomes "5 minutes ago". Only whole-word
    /// abbreviations are expanded, so "minute" and "minutes" stay as they are.
    pub fn normalize_last_seen(&self, matched: &str) -> String {
        if !self.strips_last_seen_prefix {
            return matched.to_string();
        }
        let stripped = LAST_SEEN_PREFIX.replace(matched, "");
        let minutes = MINUTES_ABBREV.replace_all(&stripped, "minutes");
        HOURS_ABBREV.replace_all(&minutes, "hours").into_owned()
    }
}
