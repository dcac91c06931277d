//! Arabic / Cyrillic script detection.
//!
//! Everything here is a pure function of the input string. Counting works on
//! Unicode scalar values, so combining marks (harakat) count as Arabic
//! characters in their own right.

use std::ops::RangeInclusive;

const ARABIC_RANGES: &[RangeInclusive<char>] = &[
    // Arabic
    '\u{0600}'..='\u{06FF}',
    // Arabic Supplement
    '\u{0750}'..='\u{077F}',
    // Arabic Extended-A
    '\u{08A0}'..='\u{08FF}',
    // Arabic Presentation Forms-A
    '\u{FB50}'..='\u{FDFF}',
    // Arabic Presentation Forms-B
    '\u{FE70}'..='\u{FEFF}',
];

const CYRILLIC_RANGES: &[RangeInclusive<char>] = &[
    // Cyrillic
    '\u{0400}'..='\u{04FF}',
    // Cyrillic Supplement
    '\u{0500}'..='\u{052F}',
];

pub fn is_arabic(c: char) -> bool {
    ARABIC_RANGES.iter().any(|range| range.contains(&c))
}

pub fn is_cyrillic(c: char) -> bool {
    CYRILLIC_RANGES.iter().any(|range| range.contains(&c))
}

/// Per-script tally of the non-whitespace characters of a string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScriptCounts {
    pub arabic: usize,
    pub cyrillic: usize,
    pub other: usize,
}

impl ScriptCounts {
    pub fn non_whitespace(&self) -> usize {
        self.arabic + self.cyrillic + self.other
    }

    /// Share of Arabic characters among non-whitespace characters, in `[0, 1]`.
    pub fn arabic_ratio(&self) -> f64 {
        match self.non_whitespace() {
            0 => 0.0,
            total => self.arabic as f64 / total as f64,
        }
    }

    pub fn has_arabic(&self) -> bool {
        self.arabic > 0
    }

    pub fn has_cyrillic(&self) -> bool {
        self.cyrillic > 0
    }
}

pub fn count_scripts(text: &str) -> ScriptCounts {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .fold(ScriptCounts::default(), |mut counts, c| {
            if is_arabic(c) {
                counts.arabic += 1;
            } else if is_cyrillic(c) {
                counts.cyrillic += 1;
            } else {
                counts.other += 1;
            }
            counts
        })
}

/// `0.0` for text without any non-whitespace character.
pub fn script_ratio(text: &str) -> f64 {
    count_scripts(text).arabic_ratio()
}

/// Everything the classifier and the statistics report need to know about
/// the scripts used in one paragraph.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptProfile {
    pub counts: ScriptCounts,
    pub ratio: f64,
    pub word_count: usize,
    pub char_count: usize,
}

impl ScriptProfile {
    pub fn of(text: &str) -> Self {
        let counts = count_scripts(text);
        Self {
            counts,
            ratio: counts.arabic_ratio(),
            word_count: text.split_whitespace().count(),
            char_count: text.chars().count(),
        }
    }

    pub fn has_arabic(&self) -> bool {
        self.counts.has_arabic()
    }

    pub fn has_cyrillic(&self) -> bool {
        self.counts.has_cyrillic()
    }

    pub fn is_mixed(&self) -> bool {
        self.has_arabic() && self.has_cyrillic()
    }
}
