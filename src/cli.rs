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

use std::fmt::Display;
use std::fmt::Formatter;
use std::path::PathBuf;

use clap::Parser;
use clap::ValueEnum;
use serde::Serialize;

use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::recorder::resume_item;
use crate::recorder::suspend_item;
use crate::session::ReviewSession;
use crate::session::SessionOrder;
use crate::stats::Statistics;
use crate::stats::compute_statistics;
use crate::types::item::LearningItem;
use crate::types::item_id::ItemId;
use crate::types::timestamp::Timestamp;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Add a new item.
    Add {
        /// The item's content.
        content: String,
        /// The category used for statistics grouping.
        #[arg(long, default_value = "general")]
        category: String,
        /// Optional path to the collection directory.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Review the items due today.
    Drill {
        /// Optional path to the collection directory.
        directory: Option<String>,
        /// Review order.
        #[arg(long, value_enum, default_value_t = DrillOrder::Oldest)]
        order: DrillOrder,
        /// Cap on the number of items in the session.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print collection statistics.
    Stats {
        /// Optional path to the collection directory.
        directory: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = StatsFormat::Json)]
        format: StatsFormat,
    },
    /// Exclude an item from review.
    Suspend {
        /// The item's id.
        id: String,
        /// Optional path to the collection directory.
        #[arg(long)]
        directory: Option<String>,
    },
    /// Return a suspended item to review.
    Resume {
        /// The item's id.
        id: String,
        /// Optional path to the collection directory.
        #[arg(long)]
        directory: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum DrillOrder {
    /// Least advanced, least recently seen items first.
    Oldest,
    /// A uniform shuffle.
    Random,
}

impl DrillOrder {
    fn session_order(self) -> SessionOrder {
        match self {
            DrillOrder::Oldest => SessionOrder::OldestFirst,
            DrillOrder::Random => SessionOrder::Random,
        }
    }
}

impl Display for DrillOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DrillOrder::Oldest => write!(f, "oldest"),
            DrillOrder::Random => write!(f, "random"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum StatsFormat {
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Add {
            content,
            category,
            directory,
        } => {
            let db = open_database(directory)?;
            let item = LearningItem::new(content, category, Timestamp::now());
            db.insert_item(&item)?;
            println!("Added item {}.", item.id);
            Ok(())
        }
        Command::Drill {
            directory,
            order,
            limit,
        } => {
            let db = open_database(directory)?;
            drill(&db, order.session_order(), limit)
        }
        Command::Stats { directory, format } => {
            let db = open_database(directory)?;
            print_stats(&db, format)
        }
        Command::Suspend { id, directory } => {
            let db = open_database(directory)?;
            let item = suspend_item(&db, ItemId::from_hex(&id)?)?;
            println!("Suspended item {}.", item.id);
            Ok(())
        }
        Command::Resume { id, directory } => {
            let db = open_database(directory)?;
            let item = resume_item(&db, ItemId::from_hex(&id)?)?;
            println!("Resumed item {} ({}).", item.id, item.schedule.status);
            Ok(())
        }
    }
}

fn open_database(directory: Option<String>) -> Fallible<Database> {
    let directory: PathBuf = match directory {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    if !directory.exists() {
        return fail("directory does not exist.");
    }
    let db_path = directory.join("rungs.db");
    let db_path = db_path
        .to_str()
        .ok_or_else(|| ErrorReport::new("invalid path"))?;
    Database::new(db_path)
}

fn drill(db: &Database, order: SessionOrder, limit: Option<usize>) -> Fallible<()> {
    let session_started_at = Timestamp::now();
    let due = db.due_items(session_started_at.local_date())?;
    let mut session = match ReviewSession::start(due, order, limit, session_started_at) {
        Some(session) => session,
        None => {
            println!("Nothing to review today.");
            return Ok(());
        }
    };
    println!("Reviewing {} items.", session.len());
    loop {
        let content = match session.current() {
            Some(item) => item.content.clone(),
            None => break,
        };
        println!();
        println!("{content}");
        let quality = read_quality();
        session.record_current(db, quality, Timestamp::now())?;
        if session.has_next() {
            session.advance();
        } else {
            break;
        }
    }
    let summary = session.summary(Timestamp::now());
    println!();
    println!(
        "Session complete: {} items in {}s.",
        summary.reviewed, summary.duration_secs
    );
    println!(
        "Forgot: {}, Hard: {}, Good: {}, Easy: {}. Mean quality: {:.2}.",
        summary.forgot, summary.hard, summary.good, summary.easy, summary.mean_quality
    );
    session.end();
    Ok(())
}

fn read_quality() -> i64 {
    loop {
        println!("Rate: (0 = Forgot, 1 = Hard, 2 = Good, 3 = Easy)");
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).unwrap();
        match input.trim().parse::<i64>() {
            Ok(raw @ 0..=3) => return raw,
            _ => println!("Invalid input. Please enter a number between 0 and 3."),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsReport {
    items: Statistics,
    total_reviews: usize,
    current_streak: usize,
    longest_streak: usize,
}

fn print_stats(db: &Database, format: StatsFormat) -> Fallible<()> {
    let items = db.list_items()?;
    let today = Timestamp::now().local_date();
    let ledger = db.get_ledger()?;
    let report = StatsReport {
        items: compute_statistics(&items, today),
        total_reviews: ledger.total_reviews,
        current_streak: ledger.current_streak,
        longest_streak: ledger.longest_streak,
    };
    match format {
        StatsFormat::Json => {
            let report_json = serde_json::to_string_pretty(&report)?;
            println!("{}", report_json);
        }
    }
    Ok(())
}
