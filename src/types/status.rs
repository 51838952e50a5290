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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

/// The mastery status of an item.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Status {
    /// Never reviewed.
    New,
    /// Somewhere on the interval ladder.
    Learning,
    /// Reached the top of the ladder with a passing grade.
    Mastered,
    /// Explicitly excluded from due-selection.
    Suspended,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Learning => "learning",
            Status::Mastered => "mastered",
            Status::Suspended => "suspended",
        }
    }

    /// Items in these states are never selected for review.
    pub fn is_reviewable(self) -> bool {
        !matches!(self, Status::Mastered | Status::Suspended)
    }
}

impl ToSql for Status {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Status {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        match string.as_str() {
            "new" => Ok(Status::New),
            "learning" => Ok(Status::Learning),
            "mastered" => Ok(Status::Mastered),
            "suspended" => Ok(Status::Suspended),
            other => Err(FromSqlError::Other(
                format!("invalid status in database: {other}").into(),
            )),
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
