//! Representative font of a paragraph.
//!
//! Paragraphs in the source documents are font-homogeneous in practice, so
//! the first informative run stands for the whole paragraph.

use crate::{Rgb, Run};

/// Typefaces used for Quranic and mixed Arabic text, compared case-insensitively.
const ARABIC_TYPEFACES: &[&str] = &[
    "Traditional Arabic",
    "Arabic Typesetting",
    "Simplified Arabic",
    "Amiri",
    "Amiri Quran",
    "Scheherazade",
    "Scheherazade New",
    "Noto Naskh Arabic",
    "Lateef",
    "KFGQPC Uthmanic Script HAFS",
    "KFGQPC HAFS Uthmanic Script",
    "Uthmanic Hafs",
    "me_quran",
    "Al Qalam Quran Majeed",
    "Sakkal Majalla",
    "Arial Unicode MS",
];

const RED_MIN: u8 = 150;
const GREEN_BLUE_MAX: u8 = 100;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontDescriptor {
    pub name: Option<String>,
    pub size_pt: Option<f32>,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<Rgb>,
}

impl FontDescriptor {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn is_red(&self) -> bool {
        self.color.is_some_and(is_red_color)
    }

    pub fn is_arabic_typeface(&self) -> bool {
        self.name.as_deref().is_some_and(is_arabic_font)
    }

    /// Font name mentions "arabic" anywhere, e.g. "Arabic Naskh Pro".
    pub fn mentions_arabic(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains("arabic"))
    }
}

impl From<&Run> for FontDescriptor {
    fn from(run: &Run) -> Self {
        Self {
            name: run.font_name.clone(),
            size_pt: run.font_size_pt,
            bold: run.bold,
            italic: run.italic,
            color: run.color,
        }
    }
}

/// Descriptor of the first non-blank run that names a font, or an empty
/// descriptor when no run does.
pub fn describe_font(runs: &[Run]) -> FontDescriptor {
    runs.iter()
        .filter(|run| !run.text.trim().is_empty())
        .find(|run| run.font_name.as_deref().is_some_and(|name| !name.trim().is_empty()))
        .map(FontDescriptor::from)
        .unwrap_or_default()
}

pub fn is_arabic_font(name: &str) -> bool {
    let name = name.trim();
    ARABIC_TYPEFACES
        .iter()
        .any(|typeface| typeface.eq_ignore_ascii_case(name))
}

/// Matches anything from pure red to dark crimson.
pub fn is_red_color(rgb: Rgb) -> bool {
    rgb.r > RED_MIN && rgb.g < GREEN_BLUE_MAX && rgb.b < GREEN_BLUE_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, font: Option<&str>) -> Run {
        Run {
            text: text.to_string(),
            font_name: font.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn skips_whitespace_runs_and_runs_without_font() {
        let runs = vec![
            run("   ", Some("Times New Roman")),
            run("Во имя", None),
            Run {
                color: Some(Rgb::new(200, 0, 0)),
                bold: true,
                ..run("Аллаха", Some("Traditional Arabic"))
            },
            run("Милостивого", Some("Arial")),
        ];

        let font = describe_font(&runs);
        assert_eq!(font.name.as_deref(), Some("Traditional Arabic"));
        assert!(font.bold);
        assert!(font.is_red());
        assert!(font.is_arabic_typeface());
    }

    #[test]
    fn no_named_font_gives_empty_descriptor() {
        let font = describe_font(&[run("текст", None), run("", Some("Amiri"))]);
        assert!(font.is_empty());
        assert!(describe_font(&[]).is_empty());
    }

    #[test]
    fn arabic_typefaces_match_case_insensitively() {
        assert!(is_arabic_font("traditional arabic"));
        assert!(is_arabic_font(" AMIRI "));
        assert!(!is_arabic_font("Times New Roman"));
        assert!(!is_arabic_font("Arabic Naskh Pro"));
    }

    #[test]
    fn mentions_arabic_is_broader_than_the_allow_list() {
        let font = FontDescriptor {
            name: Some("Arabic Naskh Pro".to_string()),
            ..Default::default()
        };
        assert!(font.mentions_arabic());
        assert!(!font.is_arabic_typeface());
    }

    #[test]
    fn red_heuristic_thresholds() {
        assert!(is_red_color(Rgb::new(255, 0, 0)));
        assert!(is_red_color(Rgb::new(151, 99, 99)));
        assert!(!is_red_color(Rgb::new(150, 0, 0)));
        assert!(!is_red_color(Rgb::new(200, 100, 0)));
        assert!(!is_red_color(Rgb::new(200, 0, 100)));
        assert!(!is_red_color(Rgb::new(0, 0, 0)));
    }
}
