//! Batch momentum annotation
//!
//! Walks a history and persists the score onto each bar. Annotations are
//! write-once: an existing value is kept unless `overwrite` is set.

use super::MomentumScorer;
use crate::history::PriceHistory;

/// Annotate every scoreable bar in `history`; returns the number written
pub fn annotate_history(
    history: &mut PriceHistory,
    scorer: &MomentumScorer,
    overwrite: bool,
) -> usize {
    let closes = history.closes();
    let mut written = 0;

    for (t, sample) in history.samples_mut().iter_mut().enumerate() {
        if sample.momentum.is_some() && !overwrite {
            continue;
        }
        if let Some(score) = scorer.score_closes(&closes, t) {
            sample.momentum = Some(score);
            written += 1;
        }
    }

    tracing::info!(written, overwrite, "Annotated momentum scores");
    written
}
