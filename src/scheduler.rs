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

//! The interval state machine: a pure function from (interval position,
//! recall quality) to the next interval position, due date, and mastery
//! status.

use crate::types::date::Date;
use crate::types::quality::Quality;
use crate::types::status::Status;

/// The ladder of day-offsets from today: same day, one day, three days, one
/// week, two weeks, one month. An engine constant, not per-item.
pub const INTERVALS: [i64; 6] = [0, 1, 3, 7, 14, 30];

/// The result of one scheduling transition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Transition {
    pub interval_index: usize,
    pub due_date: Date,
    pub status: Status,
    pub days_until_review: i64,
}

/// Compute the next scheduling state for an item at `interval_index` rated
/// `quality`, with `today` read once by the caller so that every date in
/// the transition comes from the same clock instant.
///
/// Forgot resets to the bottom rung, Hard retries the current rung, Good
/// climbs one rung, Easy climbs two. An item is mastered only by reaching
/// the top rung with a Good or Easy rating; sitting at the top rung and
/// rating Hard or Forgot keeps it in learning.
pub fn next_state(interval_index: usize, quality: Quality, today: Date) -> Transition {
    let ceiling = INTERVALS.len() - 1;
    let interval_index = interval_index.min(ceiling);
    let next_index = match quality {
        Quality::Forgot => 0,
        Quality::Hard => interval_index,
        Quality::Good => (interval_index + 1).min(ceiling),
        Quality::Easy => (interval_index + 2).min(ceiling),
    };
    let status = if next_index == ceiling && matches!(quality, Quality::Good | Quality::Easy) {
        Status::Mastered
    } else {
        Status::Learning
    };
    let days_until_review = INTERVALS[next_index];
    Transition {
        interval_index: next_index,
        due_date: today.plus_days(days_until_review),
        status,
        days_until_review,
    }
}
