//! Score calculation.
//!
//! A won mission starts from the maximum mark (20 on the first attempt of
//! the session, 16 once any run has failed), loses up to 3 points for time
//! used and 1 point per error, and is clamped to `0..=max`. A failed
//! mission always scores 0/16.

/// Mission length in seconds.
pub const MISSION_SECONDS: u32 = 600;

pub const FULL_MARKS: u32 = 20;
pub const RETRY_MARKS: u32 = 16;

/// Remaining-time thresholds (percent of the mission) and their penalty.
/// Checked top to bottom; below the last threshold the penalty is 3.
const TIME_BANDS: [(u32, u32); 3] = [(60, 0), (45, 1), (30, 2)];
const SLOWEST_PENALTY: u32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Score {
    pub value: u32,
    pub max: u32,
}

impl Score {
    /// Score recorded for a run that ran out of time.
    pub fn failure() -> Self {
        Score { value: 0, max: RETRY_MARKS }
    }
}

pub fn max_score(has_failed_once: bool) -> u32 {
    if has_failed_once { RETRY_MARKS } else { FULL_MARKS }
}

/// Penalty for the share of the mission still left on the clock.
///
/// Compares `remaining / total` against the bands in integer percent so a
/// ratio sitting exactly on a threshold lands in the cheaper band.
pub fn time_penalty(remaining_secs: u32, total_secs: u32) -> u32 {
    let remaining = u64::from(remaining_secs) * 100;
    let total = u64::from(total_secs);
    TIME_BANDS
        .iter()
        .find(|(percent, _)| total > 0 && remaining >= total * u64::from(*percent))
        .map_or(SLOWEST_PENALTY, |&(_, penalty)| penalty)
}

pub fn success_score(remaining_secs: u32, total_secs: u32, errors: u32, has_failed_once: bool) -> Score {
    let max = max_score(has_failed_once);
    let value = max
        .saturating_sub(time_penalty(remaining_secs, total_secs))
        .saturating_sub(errors)
        .min(max);
    Score { value, max }
}
