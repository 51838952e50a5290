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

//! The review session orchestrator: selects an ordering over the due items,
//! steps through them one at a time, records ratings through the recorder,
//! and produces an end-of-session summary.

use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::Serialize;

use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;
use crate::recorder::record_review;
use crate::types::item::LearningItem;
use crate::types::item_id::ItemId;
use crate::types::quality::Quality;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionOrder {
    /// Ascending by interval index, ties broken by least recently touched.
    OldestFirst,
    /// A uniform shuffle.
    Random,
}

/// One rating recorded during this sitting.
#[derive(Clone, Debug)]
pub struct SessionReview {
    pub item_id: ItemId,
    pub quality: Quality,
    pub recorded_at: Timestamp,
}

/// A review session scoped to one sitting. Owned by the caller, so multiple
/// sessions (e.g. multiple users in a server) cannot cross-contaminate.
/// Dropping or calling [`ReviewSession::end`] discards it.
pub struct ReviewSession {
    items: Vec<LearningItem>,
    cursor: usize,
    started_at: Timestamp,
    reviews: Vec<SessionReview>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub duration_secs: i64,
    pub reviewed: usize,
    pub forgot: usize,
    pub hard: usize,
    pub good: usize,
    pub easy: usize,
    pub mean_quality: f64,
}

/// Sort items for review, oldest first: ascending by interval index, then
/// by last review time (items never reviewed stand in with their creation
/// time). The sort is stable.
pub fn optimal_review_order(items: &mut [LearningItem]) {
    items.sort_by_key(|item| (item.schedule.interval_index, item.last_touched()));
}

impl ReviewSession {
    /// Open a session over the given due items. Returns None when there is
    /// nothing to review, so callers can present "nothing due" without an
    /// error path.
    pub fn start(
        mut items: Vec<LearningItem>,
        order: SessionOrder,
        limit: Option<usize>,
        now: Timestamp,
    ) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        match order {
            SessionOrder::OldestFirst => optimal_review_order(&mut items),
            SessionOrder::Random => items.shuffle(&mut thread_rng()),
        }
        if let Some(limit) = limit {
            items.truncate(limit.max(1));
        }
        Some(Self {
            items,
            cursor: 0,
            started_at: now,
            reviews: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// The item at the cursor.
    pub fn current(&self) -> Option<&LearningItem> {
        self.items.get(self.cursor)
    }

    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.items.len()
    }

    /// Step the cursor forward and return the new current item. At the last
    /// item this returns None and changes nothing; the caller is expected
    /// to notice end-of-session via [`ReviewSession::has_next`].
    pub fn advance(&mut self) -> Option<&LearningItem> {
        if self.has_next() {
            self.cursor += 1;
            self.current()
        } else {
            None
        }
    }

    /// Record a rating for the current item through the review recorder and
    /// note it in the session accumulator.
    pub fn record_current(
        &mut self,
        db: &Database,
        raw_quality: i64,
        now: Timestamp,
    ) -> Fallible<LearningItem> {
        let item_id = match self.current() {
            Some(item) => item.id,
            None => return fail("no current item in session."),
        };
        let updated = record_review(db, item_id, raw_quality, now)?;
        self.reviews.push(SessionReview {
            item_id,
            quality: Quality::from_raw(raw_quality)?,
            recorded_at: now,
        });
        Ok(updated)
    }

    /// Summarize the sitting. Call before [`ReviewSession::end`].
    pub fn summary(&self, now: Timestamp) -> SessionSummary {
        let mut summary = SessionSummary {
            duration_secs: now.seconds_since(self.started_at),
            reviewed: self.reviews.len(),
            forgot: 0,
            hard: 0,
            good: 0,
            easy: 0,
            mean_quality: 0.0,
        };
        let mut sum: i64 = 0;
        for review in &self.reviews {
            match review.quality {
                Quality::Forgot => summary.forgot += 1,
                Quality::Hard => summary.hard += 1,
                Quality::Good => summary.good += 1,
                Quality::Easy => summary.easy += 1,
            }
            sum += review.quality.as_raw();
        }
        if !self.reviews.is_empty() {
            summary.mean_quality = sum as f64 / self.reviews.len() as f64;
        }
        summary
    }

    /// Discard the session. Consuming the session makes use-after-end
    /// unrepresentable.
    pub fn end(self) {}
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::Duration;
    use chrono::TimeZone;
    use chrono::Utc;
    use tempfile::tempdir;

    use crate::error::ErrorReport;
    use crate::types::status::Status;

    use super::*;

    fn ts_offset(seconds: i64) -> Timestamp {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        Timestamp::new(base + Duration::seconds(seconds))
    }

    fn item_at(rung: usize, created_offset: i64) -> LearningItem {
        let mut item = LearningItem::new(
            format!("item-{rung}-{created_offset}"),
            "test".to_string(),
            ts_offset(created_offset),
        );
        item.schedule.interval_index = rung;
        item
    }

    fn open_test_db() -> (tempfile::TempDir, Database) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rungs.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        (dir, db)
    }

    #[test]
    fn test_start_with_nothing_due() {
        let session = ReviewSession::start(Vec::new(), SessionOrder::OldestFirst, None, ts_offset(0));
        assert!(session.is_none());
    }

    #[test]
    fn test_oldest_first_ordering() {
        let a = item_at(2, 0);
        let b = item_at(0, 50);
        let c = item_at(0, 10);
        let mut d = item_at(1, 20);
        d.schedule.last_reviewed_at = Some(ts_offset(5));
        let mut items = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        optimal_review_order(&mut items);
        let ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![c.id, b.id, d.id, a.id]);
    }

    #[test]
    fn test_tie_break_uses_last_review_over_creation() {
        // Same rung: the item reviewed longest ago comes first, and a
        // never-reviewed item slots by creation time.
        let mut a = item_at(1, 100);
        a.schedule.last_reviewed_at = Some(ts_offset(500));
        let mut b = item_at(1, 200);
        b.schedule.last_reviewed_at = Some(ts_offset(300));
        let c = item_at(1, 400);
        let mut items = vec![a.clone(), b.clone(), c.clone()];
        optimal_review_order(&mut items);
        let ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);
    }

    #[test]
    fn test_random_order_preserves_the_selection() {
        let items: Vec<LearningItem> = (0..20).map(|i| item_at(0, i)).collect();
        let expected: HashSet<ItemId> = items.iter().map(|i| i.id).collect();
        let mut session =
            ReviewSession::start(items, SessionOrder::Random, None, ts_offset(0)).unwrap();
        assert_eq!(session.len(), 20);
        let mut actual = HashSet::new();
        actual.insert(session.current().unwrap().id);
        while session.has_next() {
            actual.insert(session.advance().unwrap().id);
        }
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_limit_truncates_after_ordering() {
        let items = vec![item_at(3, 0), item_at(0, 1), item_at(1, 2)];
        let keep = items[1].id;
        let session =
            ReviewSession::start(items, SessionOrder::OldestFirst, Some(1), ts_offset(0)).unwrap();
        assert_eq!(session.len(), 1);
        assert_eq!(session.current().unwrap().id, keep);
        assert!(!session.has_next());
    }

    #[test]
    fn test_advance_stops_at_the_last_item() {
        let items = vec![item_at(0, 0), item_at(0, 1)];
        let mut session =
            ReviewSession::start(items, SessionOrder::OldestFirst, None, ts_offset(0)).unwrap();
        assert!(session.has_next());
        assert!(session.advance().is_some());
        assert!(!session.has_next());
        assert!(session.advance().is_none());
        // The cursor did not move off the end.
        assert!(session.current().is_some());
    }

    #[test]
    fn test_full_sitting() -> Fallible<()> {
        let (_dir, db) = open_test_db();
        let now = ts_offset(0);
        for i in 0..3 {
            let item = LearningItem::new(format!("due-{i}"), "test".to_string(), ts_offset(i));
            db.insert_item(&item)?;
        }
        let due = db.due_items(now.local_date())?;
        let mut session =
            ReviewSession::start(due, SessionOrder::OldestFirst, None, now).unwrap();
        assert_eq!(session.len(), 3);

        session.record_current(&db, 2, ts_offset(10))?;
        session.advance();
        session.record_current(&db, 0, ts_offset(20))?;
        session.advance();
        assert!(!session.has_next());
        session.record_current(&db, 3, ts_offset(30))?;

        let summary = session.summary(ts_offset(45));
        assert_eq!(summary.duration_secs, 45);
        assert_eq!(summary.reviewed, 3);
        assert_eq!(summary.forgot, 1);
        assert_eq!(summary.hard, 0);
        assert_eq!(summary.good, 1);
        assert_eq!(summary.easy, 1);
        // (2 + 0 + 3) / 3.
        assert!((summary.mean_quality - 5.0 / 3.0).abs() < 1e-9);
        session.end();

        // The reviews actually landed in the store.
        let ledger = db.get_ledger()?;
        assert_eq!(ledger.total_reviews, 3);
        let remaining = db.due_items(now.local_date())?;
        // The forgotten item reset to rung zero and is still due today.
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].schedule.status, Status::Learning);
        Ok(())
    }

    #[test]
    fn test_record_rejects_invalid_quality() {
        let (_dir, db) = open_test_db();
        let items = vec![item_at(0, 0)];
        let mut session =
            ReviewSession::start(items, SessionOrder::OldestFirst, None, ts_offset(0)).unwrap();
        let err = session.record_current(&db, 9, ts_offset(1)).err().unwrap();
        assert!(matches!(err, ErrorReport::InvalidQuality(9)));
        // Nothing was accumulated.
        assert_eq!(session.summary(ts_offset(2)).reviewed, 0);
    }

    #[test]
    fn test_empty_summary() {
        let items = vec![item_at(0, 0)];
        let session =
            ReviewSession::start(items, SessionOrder::OldestFirst, None, ts_offset(0)).unwrap();
        let summary = session.summary(ts_offset(0));
        assert_eq!(summary.reviewed, 0);
        assert_eq!(summary.mean_quality, 0.0);
        assert_eq!(summary.duration_secs, 0);
    }
}
