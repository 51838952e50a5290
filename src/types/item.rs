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

use crate::types::date::Date;
use crate::types::item_id::ItemId;
use crate::types::quality::Quality;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

/// The number of quality ratings kept per item. A sliding window: the oldest
/// rating is evicted first.
pub const HISTORY_WINDOW: usize = 10;

/// The initial ease factor. Kept for data-format compatibility with an
/// SM-2-style extension; no algorithm reads it.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// A unit of memorizable content plus its scheduling state.
#[derive(Clone, Debug)]
pub struct LearningItem {
    /// Immutable, set once at creation.
    pub id: ItemId,
    /// Opaque to the scheduler; owned by the content-generation subsystem.
    pub content: String,
    /// Used only for statistics grouping.
    pub category: String,
    pub created_at: Timestamp,
    /// Mutable only through the review recorder.
    pub schedule: Schedule,
}

#[derive(Clone, Debug)]
pub struct Schedule {
    /// Index into the interval table. Always within bounds.
    pub interval_index: usize,
    /// The date on or after which the item is due.
    pub next_review_date: Date,
    pub last_reviewed_at: Option<Timestamp>,
    /// Incremented exactly once per recorded review.
    pub review_count: usize,
    /// The last `HISTORY_WINDOW` ratings, most recent last.
    pub quality_history: Vec<Quality>,
    pub status: Status,
    pub ease_factor: f64,
}

impl LearningItem {
    /// Create a new item due today, at the bottom of the ladder.
    pub fn new(content: String, category: String, now: Timestamp) -> Self {
        let id = ItemId::derive(&content, &category, now);
        Self {
            id,
            content,
            category,
            created_at: now,
            schedule: Schedule {
                interval_index: 0,
                next_review_date: now.local_date(),
                last_reviewed_at: None,
                review_count: 0,
                quality_history: Vec::new(),
                status: Status::New,
                ease_factor: DEFAULT_EASE_FACTOR,
            },
        }
    }

    /// The instant to sort by when ordering reviews oldest-first. Items
    /// never reviewed stand in with their creation time.
    pub fn last_touched(&self) -> Timestamp {
        self.schedule.last_reviewed_at.unwrap_or(self.created_at)
    }
}

impl Schedule {
    /// Append a rating, evicting the oldest entry once the window is full.
    pub fn push_quality(&mut self, quality: Quality) {
        self.quality_history.push(quality);
        if self.quality_history.len() > HISTORY_WINDOW {
            let excess = self.quality_history.len() - HISTORY_WINDOW;
            self.quality_history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    fn ts() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_new_item() {
        let item = LearningItem::new("le chat".to_string(), "french".to_string(), ts());
        assert_eq!(item.schedule.interval_index, 0);
        assert_eq!(item.schedule.next_review_date, ts().local_date());
        assert_eq!(item.schedule.status, Status::New);
        assert_eq!(item.schedule.review_count, 0);
        assert!(item.schedule.quality_history.is_empty());
        assert!(item.schedule.last_reviewed_at.is_none());
        assert_eq!(item.schedule.ease_factor, DEFAULT_EASE_FACTOR);
    }

    #[test]
    fn test_history_window_is_a_suffix() {
        let mut item = LearningItem::new("x".to_string(), "y".to_string(), ts());
        let ratings = [
            Quality::Forgot,
            Quality::Hard,
            Quality::Good,
            Quality::Easy,
        ];
        for i in 0..25 {
            item.schedule.push_quality(ratings[i % 4]);
        }
        assert_eq!(item.schedule.quality_history.len(), HISTORY_WINDOW);
        // The window holds ratings 15..25 of the true history.
        let expected: Vec<Quality> = (15..25).map(|i| ratings[i % 4]).collect();
        assert_eq!(item.schedule.quality_history, expected);
    }
}
