use std::sync::LazyLock;

use regex::Regex;
use tafsir_document::FontDescriptor;
use tafsir_script::ScriptProfile;

use crate::BlockType;

const SHORT_TRANSLATION_MAX_CHARS: usize = 500;

/// Lowercased label prefixes that mark an explanatory paragraph.
const EXPLANATION_PREFIXES: &[&str] = &[
    "пояснение:",
    "толкование:",
    "комментарий:",
    "тафсир:",
    "примечание:",
    "explanation:",
    "commentary:",
    "تفسير:",
    "شرح:",
];

static REFERENCE_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        // [12]
        Regex::new(r"\[\d+\]").unwrap(),
        // 2:255
        Regex::new(r"\d+\s*:\s*\d+").unwrap(),
        // 1. / 1)
        Regex::new(r"^\s*\d+[.)]\s").unwrap(),
        Regex::new(
            r"(?i)\b(?:сура|аят|хадис|глава|стих|chapter|verse|narration|hadith|surah|ayah)",
        )
        .unwrap(),
    ]
});

/// Why a block received its type. Every rule of the decision table has its
/// own tag so callers and tests can tell which rule fired.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    EmptyText,
    HeadingStyle,
    ExplanationLabel,
    RedArabicText,
    ArabicTypeface,
    DominantArabic,
    ArabicNamedFont,
    ShortCyrillic,
    CyrillicDominant,
    MixedCyrillicDominant,
    ReferencePattern,
    ArabicFallback,
    Unclassified,
}

/// The inputs of one classification decision.
#[derive(Debug, Clone, Copy)]
pub struct Signals<'a> {
    pub text: &'a str,
    pub style_name: Option<&'a str>,
    pub font: &'a FontDescriptor,
    pub script_ratio: f64,
    pub has_arabic: bool,
    pub has_cyrillic: bool,
}

impl<'a> Signals<'a> {
    pub fn new(text: &'a str, style_name: Option<&'a str>, font: &'a FontDescriptor) -> Self {
        Self::with_profile(text, style_name, font, &ScriptProfile::of(text))
    }

    pub fn with_profile(
        text: &'a str,
        style_name: Option<&'a str>,
        font: &'a FontDescriptor,
        profile: &ScriptProfile,
    ) -> Self {
        Self {
            text,
            style_name,
            font,
            script_ratio: profile.ratio,
            has_arabic: profile.has_arabic(),
            has_cyrillic: profile.has_cyrillic(),
        }
    }
}

struct Rule {
    reason: Reason,
    block_type: BlockType,
    applies: fn(&Signals<'_>) -> bool,
}

/// Evaluated top to bottom, first match wins. Stronger signals come first,
/// so reordering entries changes results for real documents.
static RULES: [Rule; 12] = [
    Rule {
        reason: Reason::EmptyText,
        block_type: BlockType::Empty,
        applies: is_empty,
    },
    Rule {
        reason: Reason::HeadingStyle,
        block_type: BlockType::Header,
        applies: has_heading_style,
    },
    Rule {
        reason: Reason::ExplanationLabel,
        block_type: BlockType::Explanation,
        applies: has_explanation_label,
    },
    Rule {
        reason: Reason::RedArabicText,
        block_type: BlockType::Scripture,
        applies: is_red_arabic,
    },
    Rule {
        reason: Reason::ArabicTypeface,
        block_type: BlockType::Scripture,
        applies: is_arabic_in_arabic_typeface,
    },
    Rule {
        reason: Reason::DominantArabic,
        block_type: BlockType::Scripture,
        applies: is_dominant_arabic,
    },
    Rule {
        reason: Reason::ArabicNamedFont,
        block_type: BlockType::Scripture,
        applies: is_arabic_in_arabic_named_font,
    },
    Rule {
        reason: Reason::ShortCyrillic,
        block_type: BlockType::Translation,
        applies: is_short_cyrillic,
    },
    Rule {
        reason: Reason::CyrillicDominant,
        block_type: BlockType::Commentary,
        applies: is_cyrillic_dominant,
    },
    Rule {
        reason: Reason::MixedCyrillicDominant,
        block_type: BlockType::Commentary,
        applies: is_mixed_cyrillic_dominant,
    },
    Rule {
        reason: Reason::ReferencePattern,
        block_type: BlockType::Reference,
        applies: is_reference,
    },
    Rule {
        reason: Reason::ArabicFallback,
        block_type: BlockType::Scripture,
        applies: is_arabic_only,
    },
];

pub fn classify(signals: &Signals<'_>) -> (BlockType, Reason) {
    RULES
        .iter()
        .find(|rule| (rule.applies)(signals))
        .map(|rule| (rule.block_type, rule.reason))
        .unwrap_or((BlockType::Unknown, Reason::Unclassified))
}

fn is_empty(s: &Signals<'_>) -> bool {
    s.text.trim().is_empty()
}

fn has_heading_style(s: &Signals<'_>) -> bool {
    s.style_name
        .is_some_and(|name| name.to_lowercase().contains("heading"))
}

fn has_explanation_label(s: &Signals<'_>) -> bool {
    let head = s.text.trim_start().to_lowercase();
    EXPLANATION_PREFIXES
        .iter()
        .any(|prefix| head.starts_with(prefix))
}

fn is_red_arabic(s: &Signals<'_>) -> bool {
    s.script_ratio > 0.9 && s.font.is_red()
}

fn is_arabic_in_arabic_typeface(s: &Signals<'_>) -> bool {
    s.script_ratio > 0.9 && s.font.is_arabic_typeface()
}

fn is_dominant_arabic(s: &Signals<'_>) -> bool {
    s.script_ratio > 0.95
}

fn is_arabic_in_arabic_named_font(s: &Signals<'_>) -> bool {
    s.script_ratio > 0.8 && s.font.mentions_arabic()
}

fn is_short_cyrillic(s: &Signals<'_>) -> bool {
    !s.has_arabic && s.has_cyrillic && s.text.chars().count() < SHORT_TRANSLATION_MAX_CHARS
}

fn is_cyrillic_dominant(s: &Signals<'_>) -> bool {
    s.has_cyrillic && s.script_ratio < 0.3
}

fn is_mixed_cyrillic_dominant(s: &Signals<'_>) -> bool {
    s.has_arabic && s.has_cyrillic && s.script_ratio < 0.5
}

fn is_reference(s: &Signals<'_>) -> bool {
    REFERENCE_PATTERNS
        .iter()
        .any(|pattern| pattern.is_match(s.text))
}

fn is_arabic_only(s: &Signals<'_>) -> bool {
    s.has_arabic && !s.has_cyrillic
}

#[cfg(test)]
mod tests {
    use tafsir_document::Rgb;

    use super::*;

    fn signals<'a>(text: &'a str, font: &'a FontDescriptor) -> Signals<'a> {
        Signals::new(text, None, font)
    }

    fn red(name: &str) -> FontDescriptor {
        FontDescriptor {
            name: Some(name.to_string()),
            color: Some(Rgb::new(192, 0, 0)),
            ..Default::default()
        }
    }

    #[test]
    fn red_high_ratio_wins_over_bare_ratio() {
        let font = red("Times New Roman");
        let s = Signals {
            text: "بِسْمِ اللَّهِ",
            style_name: None,
            font: &font,
            script_ratio: 0.97,
            has_arabic: true,
            has_cyrillic: false,
        };
        assert_eq!(classify(&s), (BlockType::Scripture, Reason::RedArabicText));
    }

    #[test]
    fn bare_ratio_applies_without_font_signals() {
        let font = FontDescriptor::default();
        assert_eq!(
            classify(&signals("بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ", &font)),
            (BlockType::Scripture, Reason::DominantArabic)
        );
    }

    #[test]
    fn arabic_typeface_applies_above_point_nine() {
        let font = FontDescriptor {
            name: Some("Amiri".to_string()),
            ..Default::default()
        };
        let s = Signals {
            script_ratio: 0.92,
            has_arabic: true,
            ..signals("اللَّهِ", &font)
        };
        assert_eq!(classify(&s), (BlockType::Scripture, Reason::ArabicTypeface));

        let s = Signals {
            script_ratio: 0.9,
            ..s
        };
        assert_ne!(classify(&s).1, Reason::ArabicTypeface);
    }

    #[test]
    fn empty_text_precedes_heading_style() {
        let font = FontDescriptor::default();
        let s = Signals::new("   ", Some("Heading 1"), &font);
        assert_eq!(classify(&s), (BlockType::Empty, Reason::EmptyText));
    }

    #[test]
    fn heading_style_precedes_script_rules() {
        let font = red("Traditional Arabic");
        let s = Signals::new("بِسْمِ اللَّهِ", Some("Heading 2"), &font);
        assert_eq!(classify(&s), (BlockType::Header, Reason::HeadingStyle));
    }

    #[test]
    fn explanation_label_is_case_insensitive_and_ignores_indent() {
        let font = FontDescriptor::default();
        for text in ["  ПОЯСНЕНИЕ: аят", "Commentary: text", "تفسير: الآية"] {
            assert_eq!(
                classify(&signals(text, &font)),
                (BlockType::Explanation, Reason::ExplanationLabel),
                "{text}"
            );
        }
    }

    #[test]
    fn short_and_long_cyrillic() {
        let font = FontDescriptor::default();
        assert_eq!(
            classify(&signals("Во истину Аллаh велик.", &font)),
            (BlockType::Translation, Reason::ShortCyrillic)
        );

        let long = "Толкование этого аята разъясняет смысл восхваления. ".repeat(10);
        assert_eq!(
            classify(&signals(long.trim_end(), &font)),
            (BlockType::Commentary, Reason::CyrillicDominant)
        );
    }

    #[test]
    fn mixed_between_point_three_and_half_is_commentary() {
        let font = FontDescriptor::default();
        let s = Signals {
            script_ratio: 0.4,
            has_arabic: true,
            has_cyrillic: true,
            ..signals("Слово الحمد", &font)
        };
        assert_eq!(
            classify(&s),
            (BlockType::Commentary, Reason::MixedCyrillicDominant)
        );
    }

    #[test]
    fn reference_patterns() {
        let font = FontDescriptor::default();
        for text in ["2:255", "[12]", "1) Ibn Kathir", "Sahih al-Bukhari, hadith"] {
            assert_eq!(
                classify(&signals(text, &font)),
                (BlockType::Reference, Reason::ReferencePattern),
                "{text}"
            );
        }
    }

    #[test]
    fn arabic_without_cyrillic_falls_back_to_scripture() {
        let font = FontDescriptor::default();
        assert_eq!(
            classify(&signals("الحمد لله (al-hamdu lillah)", &font)),
            (BlockType::Scripture, Reason::ArabicFallback)
        );
    }

    #[test]
    fn latin_only_is_unknown() {
        let font = FontDescriptor::default();
        assert_eq!(
            classify(&signals("Tafsir Ibn Kathir", &font)),
            (BlockType::Unknown, Reason::Unclassified)
        );
    }

    #[test]
    fn reason_tags_are_snake_case() {
        assert_eq!(Reason::RedArabicText.to_string(), "red_arabic_text");
        assert_eq!(
            serde_json::to_string(&Reason::MixedCyrillicDominant).unwrap(),
            r#""mixed_cyrillic_dominant""#
        );
    }
}
