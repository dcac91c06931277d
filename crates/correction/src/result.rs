use crate::CorrectionOutcome;

/// Outcome of correcting one block, as cached and reported.
///
/// A failed result never carries a change: `corrected_text` equals
/// `original_text` and `changed` is false.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CorrectionResult {
    pub block_index: usize,
    pub original_text: String,
    pub corrected_text: String,
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(default)]
    pub unchanged_by_gateway: bool,
}

impl CorrectionResult {
    pub fn from_outcome(
        block_index: usize,
        original_text: impl Into<String>,
        outcome: CorrectionOutcome,
    ) -> Self {
        let original_text = original_text.into();
        match outcome {
            CorrectionOutcome::Unchanged => Self {
                block_index,
                corrected_text: original_text.clone(),
                original_text,
                changed: false,
                failure: None,
                unchanged_by_gateway: true,
            },
            CorrectionOutcome::Corrected(corrected_text) => Self {
                block_index,
                changed: corrected_text.trim() != original_text.trim(),
                corrected_text,
                original_text,
                failure: None,
                unchanged_by_gateway: false,
            },
            CorrectionOutcome::Failed(reason) => Self {
                block_index,
                corrected_text: original_text.clone(),
                original_text,
                changed: false,
                failure: Some(reason),
                unchanged_by_gateway: false,
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Only these results produce a visible diff.
    pub fn has_diff(&self) -> bool {
        self.changed && !self.is_failed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_outcome_is_flagged() {
        let result = CorrectionResult::from_outcome(3, "Хвала Аллаху", CorrectionOutcome::Unchanged);
        assert!(!result.changed);
        assert!(result.unchanged_by_gateway);
        assert_eq!(result.corrected_text, "Хвала Аллаху");
    }

    #[test]
    fn whitespace_only_edits_do_not_count() {
        let result = CorrectionResult::from_outcome(
            0,
            "Хвала Аллаху ",
            CorrectionOutcome::Corrected("Хвала Аллаху".to_string()),
        );
        assert!(!result.changed);
        assert!(!result.unchanged_by_gateway);
        assert!(!result.has_diff());
    }

    #[test]
    fn failure_keeps_original_text() {
        let result = CorrectionResult::from_outcome(
            1,
            "Во истину",
            CorrectionOutcome::Failed("timeout".to_string()),
        );
        assert!(result.is_failed());
        assert!(!result.changed);
        assert_eq!(result.corrected_text, result.original_text);
    }

    #[test]
    fn failure_field_is_omitted_when_absent() {
        let result = CorrectionResult::from_outcome(
            2,
            "Во истину",
            CorrectionOutcome::Corrected("Воистину".to_string()),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("failure").is_none());
        assert_eq!(json["changed"], true);

        let back: CorrectionResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
