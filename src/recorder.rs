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

//! The review recorder: applies one scoring event to an item and folds it
//! into the review ledger.

use crate::db::Database;
use crate::error::Fallible;
use crate::scheduler::next_state;
use crate::types::item::LearningItem;
use crate::types::item_id::ItemId;
use crate::types::quality::Quality;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

/// Record one review of an item.
///
/// The raw rating is validated before any I/O. The schedule write is the
/// authoritative one: if the ledger update fails afterwards, the failure is
/// logged and the updated item is still returned, since the ledger is an
/// advisory aggregate reconcilable from review history.
pub fn record_review(
    db: &Database,
    item_id: ItemId,
    raw_quality: i64,
    now: Timestamp,
) -> Fallible<LearningItem> {
    let quality = Quality::from_raw(raw_quality)?;
    let item = db.get_item(item_id)?;
    let today = now.local_date();

    let transition = next_state(item.schedule.interval_index, quality, today);
    log::debug!(
        "{} {} rung={} due={} status={}",
        &item_id.to_hex()[..8],
        quality.as_str(),
        transition.interval_index,
        transition.due_date,
        transition.status
    );

    let mut schedule = item.schedule;
    schedule.interval_index = transition.interval_index;
    schedule.next_review_date = transition.due_date;
    schedule.status = transition.status;
    schedule.last_reviewed_at = Some(now);
    schedule.review_count += 1;
    schedule.push_quality(quality);
    // The ease factor is carried over unchanged.

    let updated = db.update_schedule(item_id, &schedule)?;

    match touch_ledger(db, now) {
        Ok(()) => {}
        Err(e) => {
            log::warn!("ledger update failed after schedule write: {e}");
        }
    }

    Ok(updated)
}

fn touch_ledger(db: &Database, now: Timestamp) -> Fallible<()> {
    let mut ledger = db.get_ledger()?;
    ledger.touch(now.local_date());
    db.put_ledger(&ledger)
}

/// Exclude an item from due-selection. Idempotent.
pub fn suspend_item(db: &Database, item_id: ItemId) -> Fallible<LearningItem> {
    let item = db.get_item(item_id)?;
    if item.schedule.status == Status::Suspended {
        return Ok(item);
    }
    let mut schedule = item.schedule;
    schedule.status = Status::Suspended;
    db.update_schedule(item_id, &schedule)
}

/// Return a suspended item to circulation: learning if it has prior
/// reviews, new otherwise.
pub fn resume_item(db: &Database, item_id: ItemId) -> Fallible<LearningItem> {
    let item = db.get_item(item_id)?;
    if item.schedule.status != Status::Suspended {
        return Ok(item);
    }
    let mut schedule = item.schedule;
    schedule.status = if schedule.review_count > 0 {
        Status::Learning
    } else {
        Status::New
    };
    db.update_schedule(item_id, &schedule)
}
