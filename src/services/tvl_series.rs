//! Placeholder TVL history. There is no historical store, so a trailing window is
//! synthesized from current totals with a deterministic per-day jitter.

use chrono::{Datelike, Duration, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::TvlPoint;
use crate::utils::fixed_point::round_to;

pub const WINDOW_DAYS: i64 = 7;

/// Largest fraction shaved off a day's totals.
const MAX_JITTER: f64 = 0.1;

/// Series seed: the day number of `today`, so the series is stable within a day.
pub fn seed_for(today: NaiveDate) -> u64 {
    today.num_days_from_ce() as u64
}

/// Oldest first, ending at `today`. Each point scales the totals by a factor in
/// [0.9, 1.0].
pub fn generate(total_supplied: f64, total_borrowed: f64, today: NaiveDate) -> Vec<TvlPoint> {
    let mut rng = StdRng::seed_from_u64(seed_for(today));

    (0..WINDOW_DAYS)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let factor = 1.0 - rng.gen::<f64>() * MAX_JITTER;

            TvlPoint {
                date: date.format("%b %-d").to_string(),
                tvl: round_to(total_supplied * factor, 2),
                deposits: round_to((total_supplied - total_borrowed) * factor, 2),
                borrows: round_to(total_borrowed * factor, 2),
            }
        })
        .collect()
}
