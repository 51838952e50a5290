// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;

use crate::types::date::Date;

/// The running review ledger: total reviews, the streak of consecutive
/// calendar days with at least one review, and per-day review counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsLedger {
    pub total_reviews: usize,
    pub current_streak: usize,
    pub longest_streak: usize,
    pub last_review_date: Option<Date>,
    pub daily_counts: BTreeMap<Date, usize>,
}

impl StatsLedger {
    pub fn empty() -> Self {
        Self {
            total_reviews: 0,
            current_streak: 0,
            longest_streak: 0,
            last_review_date: None,
            daily_counts: BTreeMap::new(),
        }
    }

    /// Fold one recorded review into the ledger.
    ///
    /// Every call increments `total_reviews` and the day's count. The streak
    /// moves at most once per calendar day: a review on the day after
    /// `last_review_date` extends it, a review on a later day restarts it at
    /// 1, and further reviews on the same day leave it alone.
    pub fn touch(&mut self, date: Date) {
        self.total_reviews += 1;
        *self.daily_counts.entry(date).or_insert(0) += 1;

        match self.last_review_date {
            Some(last) if last == date => {}
            Some(last) if last.plus_days(1) == date => {
                self.current_streak += 1;
            }
            _ => {
                self.current_streak = 1;
            }
        }
        self.last_review_date = Some(date);
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_review_starts_a_streak() {
        let mut ledger = StatsLedger::empty();
        let day = Date::from_ymd(2025, 4, 1);
        ledger.touch(day);
        assert_eq!(ledger.total_reviews, 1);
        assert_eq!(ledger.current_streak, 1);
        assert_eq!(ledger.longest_streak, 1);
        assert_eq!(ledger.last_review_date, Some(day));
        assert_eq!(ledger.daily_counts.get(&day), Some(&1));
    }

    #[test]
    fn test_same_day_does_not_double_count_streak() {
        let mut ledger = StatsLedger::empty();
        let day = Date::from_ymd(2025, 4, 1);
        ledger.touch(day);
        ledger.touch(day);
        assert_eq!(ledger.total_reviews, 2);
        assert_eq!(ledger.current_streak, 1);
        assert_eq!(ledger.daily_counts.get(&day), Some(&2));
    }

    #[test]
    fn test_consecutive_days_extend_the_streak() {
        let mut ledger = StatsLedger::empty();
        let start = Date::from_ymd(2025, 4, 1);
        for i in 0..7 {
            ledger.touch(start.plus_days(i));
        }
        assert_eq!(ledger.current_streak, 7);
        assert_eq!(ledger.longest_streak, 7);
        assert_eq!(ledger.total_reviews, 7);
    }

    #[test]
    fn test_gap_resets_the_streak() {
        let mut ledger = StatsLedger::empty();
        let start = Date::from_ymd(2025, 4, 1);
        ledger.touch(start);
        ledger.touch(start.plus_days(1));
        ledger.touch(start.plus_days(2));
        // Skip a day.
        ledger.touch(start.plus_days(4));
        assert_eq!(ledger.current_streak, 1);
        assert_eq!(ledger.longest_streak, 3);
        assert_eq!(ledger.total_reviews, 4);
    }
}
