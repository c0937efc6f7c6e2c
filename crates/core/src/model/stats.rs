use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::rating::Rating;

//
// ─── STATISTICS ────────────────────────────────────────────────────────────────
//

/// Aggregate study statistics, updated on every answer and never reset
/// automatically.
///
/// Calendar bucketing uses UTC dates throughout. Undo does not reverse these
/// counters; that asymmetry is deliberate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Statistics {
    pub total_answers: u64,
    pub correct_like: u64,
    pub daily: BTreeMap<NaiveDate, u32>,
    pub last_study_date: Option<NaiveDate>,
    pub streak: u32,
    pub total_seconds: u64,
}

impl Statistics {
    /// Records one answered card.
    ///
    /// Increments the totals, bumps today's bucket, accumulates study time,
    /// and updates the streak. Only the first answer of a calendar day can
    /// change the streak: it extends when the previous study day was exactly
    /// yesterday and resets to 1 otherwise.
    pub fn record_answer(&mut self, rating: Rating, elapsed_seconds: u64, today: NaiveDate) {
        self.total_answers += 1;
        if rating.is_correct_like() {
            self.correct_like += 1;
        }

        *self.daily.entry(today).or_insert(0) += 1;

        if self.last_study_date != Some(today) {
            let yesterday = today.checked_sub_days(Days::new(1));
            self.streak = if self.last_study_date == yesterday {
                self.streak + 1
            } else {
                1
            };
            self.last_study_date = Some(today);
        }

        self.total_seconds += elapsed_seconds;
    }

    /// Fraction of answers that counted as successful recall, in `0.0..=1.0`.
    ///
    /// Returns 0.0 before the first answer rather than dividing by zero.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total_answers == 0 {
            return 0.0;
        }
        self.correct_like as f64 / self.total_answers as f64
    }

    /// Daily answer counts for the trailing 7-day window ending `today`,
    /// oldest first. Days without answers report 0.
    #[must_use]
    pub fn weekly_series(&self, today: NaiveDate) -> [(NaiveDate, u32); 7] {
        std::array::from_fn(|i| {
            let offset = 6 - i as u64;
            let date = today
                .checked_sub_days(Days::new(offset))
                .unwrap_or(NaiveDate::MIN);
            (date, self.daily.get(&date).copied().unwrap_or(0))
        })
    }

    /// Number of distinct calendar days with at least one answer.
    #[must_use]
    pub fn study_days(&self) -> usize {
        self.daily.len()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
