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

//! Point-in-time learning metrics over a collection of items, and the
//! mastery-date projection.

use serde::Serialize;

use crate::scheduler::INTERVALS;
use crate::types::date::Date;
use crate::types::item::LearningItem;
use crate::types::quality::Quality;
use crate::types::status::Status;

/// Snapshot statistics over one collection of items. The caller decides the
/// scope of the collection.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    #[serde(rename = "new")]
    pub new_count: usize,
    pub learning: usize,
    pub mastered: usize,
    pub due_today: usize,
    pub due_tomorrow: usize,
    pub due_within_7_days: usize,
    /// Percentage of the maximum possible rating across all history
    /// entries, rounded to one decimal. Zero when there is no history.
    pub accuracy_rate: f64,
    /// Mean ease factor. Informational only.
    pub average_ease: f64,
}

/// Compute statistics in a single pass over `items`.
pub fn compute_statistics(items: &[LearningItem], today: Date) -> Statistics {
    let mut stats = Statistics {
        total: items.len(),
        new_count: 0,
        learning: 0,
        mastered: 0,
        due_today: 0,
        due_tomorrow: 0,
        due_within_7_days: 0,
        accuracy_rate: 0.0,
        average_ease: 0.0,
    };
    let mut quality_sum: i64 = 0;
    let mut quality_count: usize = 0;
    let mut ease_sum: f64 = 0.0;
    for item in items {
        let schedule = &item.schedule;
        match schedule.status {
            Status::New => stats.new_count += 1,
            Status::Learning => stats.learning += 1,
            Status::Mastered => stats.mastered += 1,
            Status::Suspended => {}
        }
        if schedule.status.is_reviewable() {
            if schedule.next_review_date <= today {
                stats.due_today += 1;
            }
            if schedule.next_review_date == today.plus_days(1) {
                stats.due_tomorrow += 1;
            }
            if schedule.next_review_date <= today.plus_days(7) {
                stats.due_within_7_days += 1;
            }
        }
        for quality in &schedule.quality_history {
            quality_sum += quality.as_raw();
        }
        quality_count += schedule.quality_history.len();
        ease_sum += schedule.ease_factor;
    }
    if quality_count > 0 {
        let rate = 100.0 * (quality_sum as f64) / (3.0 * quality_count as f64);
        stats.accuracy_rate = (rate * 10.0).round() / 10.0;
    }
    if !items.is_empty() {
        stats.average_ease = ease_sum / items.len() as f64;
    }
    stats
}

/// Project the date an item would be mastered, assuming every future review
/// is rated Good: the sum of the day-offsets of every rung above the
/// current one, stretched by half again when the last few ratings average
/// below Good. Mastered items project to today; suspended items have no
/// projection.
pub fn estimate_mastery_date(item: &LearningItem, today: Date) -> Option<Date> {
    let schedule = &item.schedule;
    match schedule.status {
        Status::Suspended => return None,
        Status::Mastered => return Some(today),
        Status::New | Status::Learning => {}
    }
    let index = schedule.interval_index.min(INTERVALS.len() - 1);
    let mut days: i64 = INTERVALS[index + 1..].iter().sum();
    let recent: Vec<&Quality> = schedule
        .quality_history
        .iter()
        .rev()
        .take(3)
        .collect();
    if !recent.is_empty() {
        let sum: i64 = recent.iter().map(|q| q.as_raw()).sum();
        let mean = sum as f64 / recent.len() as f64;
        if mean < Quality::Good.as_raw() as f64 {
            days = (days as f64 * 1.5).round() as i64;
        }
    }
    Some(today.plus_days(days))
}
