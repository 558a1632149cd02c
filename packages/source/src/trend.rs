//! Daily-count derivations shared by every schema adapter.

use covid_widget_summary_models::TrendDirection;

use crate::SourceError;

/// Minimum number of daily counts needed to compare the latest day against
/// a non-empty set of preceding days.
pub const MIN_TREND_POINTS: usize = 2;

/// Classifies the latest daily count against the mean of the preceding
/// counts.
///
/// Returns [`TrendDirection::Up`] only when the last count is strictly
/// greater than the mean; a tie is [`TrendDirection::Down`]. The comparison
/// is done as `last * n > sum` in integer arithmetic so no rounding is
/// involved.
///
/// # Errors
///
/// Returns [`SourceError::InsufficientData`] when fewer than
/// [`MIN_TREND_POINTS`] counts are supplied.
pub fn trend_direction(daily: &[u64]) -> Result<TrendDirection, SourceError> {
    let Some((last, preceding)) = daily.split_last().filter(|(_, rest)| !rest.is_empty()) else {
        return Err(SourceError::InsufficientData {
            required: MIN_TREND_POINTS,
            available: daily.len(),
        });
    };

    let sum: u128 = preceding.iter().map(|&c| u128::from(c)).sum();
    let n = preceding.len() as u128;

    if u128::from(*last) * n > sum {
        Ok(TrendDirection::Up)
    } else {
        Ok(TrendDirection::Down)
    }
}

/// New cases between two cumulative totals, never negative.
///
/// Downward revisions of the cumulative count yield zero.
#[must_use]
pub fn new_cases_from_cumulative(today: i64, yesterday: i64) -> u64 {
    u64::try_from(today.saturating_sub(yesterday)).unwrap_or(0)
}
