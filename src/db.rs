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
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::date::Date;
use crate::types::item::LearningItem;
use crate::types::item::Schedule;
use crate::types::item_id::ItemId;
use crate::types::ledger::StatsLedger;
use crate::types::quality::Quality;
use crate::types::status::Status;
use crate::types::timestamp::Timestamp;

const ITEM_COLUMNS: &str = "item_id, content, category, created_at, interval_index, next_review_date, last_reviewed_at, review_count, quality_history, status, ease_factor";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Add a new item to the database.
    pub fn insert_item(&self, item: &LearningItem) -> Fallible<()> {
        log::debug!("Adding new item: {}", item.id);
        let conn = self.acquire();
        let sql = format!("insert into items ({ITEM_COLUMNS}) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);");
        conn.execute(
            &sql,
            (
                item.id,
                &item.content,
                &item.category,
                item.created_at,
                item.schedule.interval_index as i64,
                item.schedule.next_review_date,
                item.schedule.last_reviewed_at,
                item.schedule.review_count as i64,
                encode_history(&item.schedule.quality_history),
                item.schedule.status,
                item.schedule.ease_factor,
            ),
        )?;
        Ok(())
    }

    /// Look up an item by id.
    pub fn get_item(&self, id: ItemId) -> Fallible<LearningItem> {
        let conn = self.acquire();
        let sql = format!("select {ITEM_COLUMNS} from items where item_id = ?;");
        let row: Option<ItemRow> = conn
            .query_row(&sql, [id], read_item_row)
            .optional()?;
        match row {
            Some(row) => row.into_item(),
            None => Err(ErrorReport::NotFound(id)),
        }
    }

    /// Overwrite an item's scheduling state, leaving identity and content
    /// untouched. Returns the updated item.
    pub fn update_schedule(&self, id: ItemId, schedule: &Schedule) -> Fallible<LearningItem> {
        {
            let conn = self.acquire();
            let sql = "update items set interval_index = ?, next_review_date = ?, last_reviewed_at = ?, review_count = ?, quality_history = ?, status = ?, ease_factor = ? where item_id = ?;";
            let changed = conn.execute(
                sql,
                (
                    schedule.interval_index as i64,
                    schedule.next_review_date,
                    schedule.last_reviewed_at,
                    schedule.review_count as i64,
                    encode_history(&schedule.quality_history),
                    schedule.status,
                    schedule.ease_factor,
                    id,
                ),
            )?;
            if changed == 0 {
                return Err(ErrorReport::NotFound(id));
            }
        }
        self.get_item(id)
    }

    /// All items, in insertion order.
    pub fn list_items(&self) -> Fallible<Vec<LearningItem>> {
        let conn = self.acquire();
        let sql = format!("select {ITEM_COLUMNS} from items;");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(read_item_row(row)?.into_item()?);
        }
        Ok(items)
    }

    /// Items due on or before `today`, excluding mastered and suspended
    /// ones.
    pub fn due_items(&self, today: Date) -> Fallible<Vec<LearningItem>> {
        let conn = self.acquire();
        let sql = format!(
            "select {ITEM_COLUMNS} from items where next_review_date <= ? and status not in ('mastered', 'suspended');"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([today])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(read_item_row(row)?.into_item()?);
        }
        Ok(items)
    }

    /// Read the review ledger. A database with no recorded reviews yields
    /// the empty ledger.
    pub fn get_ledger(&self) -> Fallible<StatsLedger> {
        let conn = self.acquire();
        let sql = "select total_reviews, current_streak, longest_streak, last_review_date from ledger where ledger_id = 1;";
        let header: Option<(usize, usize, usize, Option<Date>)> = conn
            .query_row(sql, [], |row| {
                Ok((
                    row.get::<_, i64>(0)? as usize,
                    row.get::<_, i64>(1)? as usize,
                    row.get::<_, i64>(2)? as usize,
                    row.get(3)?,
                ))
            })
            .optional()?;
        let (total_reviews, current_streak, longest_streak, last_review_date) = match header {
            Some(header) => header,
            None => return Ok(StatsLedger::empty()),
        };
        let mut daily_counts = BTreeMap::new();
        let mut stmt = conn.prepare("select review_date, review_count from daily_reviews;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let date: Date = row.get(0)?;
            let count: usize = row.get::<_, i64>(1)? as usize;
            daily_counts.insert(date, count);
        }
        Ok(StatsLedger {
            total_reviews,
            current_streak,
            longest_streak,
            last_review_date,
            daily_counts,
        })
    }

    /// Write the review ledger.
    pub fn put_ledger(&self, ledger: &StatsLedger) -> Fallible<()> {
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        tx.execute(
            "insert or replace into ledger (ledger_id, total_reviews, current_streak, longest_streak, last_review_date) values (1, ?, ?, ?, ?);",
            (
                ledger.total_reviews as i64,
                ledger.current_streak as i64,
                ledger.longest_streak as i64,
                ledger.last_review_date,
            ),
        )?;
        for (date, count) in &ledger.daily_counts {
            tx.execute(
                "insert or replace into daily_reviews (review_date, review_count) values (?, ?);",
                (date, *count as i64),
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

struct ItemRow {
    id: ItemId,
    content: String,
    category: String,
    created_at: Timestamp,
    interval_index: usize,
    next_review_date: Date,
    last_reviewed_at: Option<Timestamp>,
    review_count: usize,
    quality_history: String,
    status: Status,
    ease_factor: f64,
}

impl ItemRow {
    fn into_item(self) -> Fallible<LearningItem> {
        let quality_history = decode_history(&self.quality_history)?;
        Ok(LearningItem {
            id: self.id,
            content: self.content,
            category: self.category,
            created_at: self.created_at,
            schedule: Schedule {
                interval_index: self.interval_index,
                next_review_date: self.next_review_date,
                last_reviewed_at: self.last_reviewed_at,
                review_count: self.review_count,
                quality_history,
                status: self.status,
                ease_factor: self.ease_factor,
            },
        })
    }
}

fn read_item_row(row: &rusqlite::Row) -> rusqlite::Result<ItemRow> {
    Ok(ItemRow {
        id: row.get(0)?,
        content: row.get(1)?,
        category: row.get(2)?,
        created_at: row.get(3)?,
        interval_index: row.get::<_, i64>(4)? as usize,
        next_review_date: row.get(5)?,
        last_reviewed_at: row.get(6)?,
        review_count: row.get::<_, i64>(7)? as usize,
        quality_history: row.get(8)?,
        status: row.get(9)?,
        ease_factor: row.get(10)?,
    })
}

fn encode_history(history: &[Quality]) -> String {
    let raw: Vec<i64> = history.iter().map(|q| q.as_raw()).collect();
    serde_json::to_string(&raw).expect("a vector of integers serializes")
}

fn decode_history(encoded: &str) -> Fallible<Vec<Quality>> {
    let raw: Vec<i64> = serde_json::from_str(encoded)?;
    raw.into_iter().map(Quality::from_raw).collect()
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["items"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;

    fn ts() -> Timestamp {
        Timestamp::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap())
    }

    fn open_test_db() -> (tempfile::TempDir, Database) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rungs.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        (dir, db)
    }

    #[test]
    fn test_insert_and_get() -> Fallible<()> {
        let (_dir, db) = open_test_db();
        let item = LearningItem::new("el gato".to_string(), "spanish".to_string(), ts());
        db.insert_item(&item)?;
        let loaded = db.get_item(item.id)?;
        assert_eq!(loaded.id, item.id);
        assert_eq!(loaded.content, "el gato");
        assert_eq!(loaded.category, "spanish");
        assert_eq!(loaded.created_at, item.created_at);
        assert_eq!(loaded.schedule.status, Status::New);
        assert_eq!(loaded.schedule.interval_index, 0);
        Ok(())
    }

    #[test]
    fn test_get_missing_item() {
        let (_dir, db) = open_test_db();
        let id = ItemId::derive("nothing", "nowhere", ts());
        let err = db.get_item(id).err().unwrap();
        assert!(matches!(err, ErrorReport::NotFound(missing) if missing == id));
    }

    #[test]
    fn test_update_schedule() -> Fallible<()> {
        let (_dir, db) = open_test_db();
        let item = LearningItem::new("el perro".to_string(), "spanish".to_string(), ts());
        db.insert_item(&item)?;
        let mut schedule = item.schedule.clone();
        schedule.interval_index = 2;
        schedule.next_review_date = ts().local_date().plus_days(3);
        schedule.last_reviewed_at = Some(ts());
        schedule.review_count = 1;
        schedule.push_quality(Quality::Good);
        schedule.status = Status::Learning;
        let updated = db.update_schedule(item.id, &schedule)?;
        assert_eq!(updated.schedule.interval_index, 2);
        assert_eq!(updated.schedule.review_count, 1);
        assert_eq!(updated.schedule.quality_history, vec![Quality::Good]);
        assert_eq!(updated.schedule.status, Status::Learning);
        assert_eq!(updated.schedule.last_reviewed_at, Some(ts()));
        // Content and identity are untouched.
        assert_eq!(updated.content, "el perro");
        Ok(())
    }

    #[test]
    fn test_update_schedule_missing_item() {
        let (_dir, db) = open_test_db();
        let item = LearningItem::new("ghost".to_string(), "none".to_string(), ts());
        let err = db.update_schedule(item.id, &item.schedule).err().unwrap();
        assert!(matches!(err, ErrorReport::NotFound(_)));
    }

    #[test]
    fn test_due_items_filter() -> Fallible<()> {
        let (_dir, db) = open_test_db();
        let today = ts().local_date();

        let due = LearningItem::new("due".to_string(), "t".to_string(), ts());
        db.insert_item(&due)?;

        let mut future = LearningItem::new("future".to_string(), "t".to_string(), ts());
        future.schedule.next_review_date = today.plus_days(7);
        db.insert_item(&future)?;

        let mut mastered = LearningItem::new("mastered".to_string(), "t".to_string(), ts());
        mastered.schedule.status = Status::Mastered;
        db.insert_item(&mastered)?;

        let mut suspended = LearningItem::new("suspended".to_string(), "t".to_string(), ts());
        suspended.schedule.status = Status::Suspended;
        db.insert_item(&suspended)?;

        let due_today = db.due_items(today)?;
        assert_eq!(due_today.len(), 1);
        assert_eq!(due_today[0].id, due.id);

        // A week later the future item is due as well.
        let due_later = db.due_items(today.plus_days(7))?;
        assert_eq!(due_later.len(), 2);
        Ok(())
    }

    #[test]
    fn test_ledger_round_trip() -> Fallible<()> {
        let (_dir, db) = open_test_db();
        assert_eq!(db.get_ledger()?, StatsLedger::empty());

        let mut ledger = StatsLedger::empty();
        let day = Date::from_ymd(2025, 6, 1);
        ledger.touch(day);
        ledger.touch(day);
        ledger.touch(day.plus_days(1));
        db.put_ledger(&ledger)?;

        let loaded = db.get_ledger()?;
        assert_eq!(loaded, ledger);
        Ok(())
    }

    #[test]
    fn test_history_encoding() -> Fallible<()> {
        let history = vec![Quality::Forgot, Quality::Easy, Quality::Good];
        let encoded = encode_history(&history);
        assert_eq!(encoded, "[0,3,2]");
        assert_eq!(decode_history(&encoded)?, history);
        Ok(())
    }
}
