use tafsir_word_diff::{DiffRenderer, diff, render_runs};

use crate::CorrectionResult;

/// Renders every result that carries a change, in block-index order.
/// Failed and unchanged results are skipped. Returns how many were rendered.
pub fn apply_results<R: DiffRenderer>(
    renderer: &mut R,
    results: &[CorrectionResult],
) -> Result<usize, R::Error> {
    let mut changed: Vec<&CorrectionResult> = results.iter().filter(|r| r.has_diff()).collect();
    changed.sort_by_key(|r| r.block_index);

    for result in &changed {
        let runs = render_runs(&diff(&result.original_text, &result.corrected_text));
        renderer.render_block(result.block_index, &runs)?;
    }
    Ok(changed.len())
}

#[cfg(test)]
mod tests {
    use tafsir_word_diff::MarkupRenderer;

    use super::*;
    use crate::CorrectionOutcome;

    #[test]
    fn only_changed_results_are_rendered_in_order() {
        let results = vec![
            CorrectionResult::from_outcome(
                7,
                "Хвала Господу",
                CorrectionOutcome::Corrected("Хвала Аллаху".into()),
            ),
            CorrectionResult::from_outcome(
                3,
                "Во истину Аллаh велик.",
                CorrectionOutcome::Corrected("Воистину Аллаh велик.".into()),
            ),
            CorrectionResult::from_outcome(4, "текст", CorrectionOutcome::Unchanged),
            CorrectionResult::from_outcome(5, "текст", CorrectionOutcome::Failed("503".into())),
        ];

        let mut renderer = MarkupRenderer::new();
        let applied = apply_results(&mut renderer, &results).unwrap();

        assert_eq!(applied, 2);
        assert_eq!(
            renderer.iter().collect::<Vec<_>>(),
            vec![
                (3, "[-Во истину-]{+Воистину+} Аллаh велик."),
                (7, "Хвала [-Господу-]{+Аллаху+}"),
            ]
        );
    }
}
