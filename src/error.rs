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

use crate::types::item_id::ItemId;

/// The error type for every fallible operation in the engine.
#[derive(Debug)]
pub enum ErrorReport {
    /// A quality rating outside the `{0,1,2,3}` domain. Rejected before any
    /// I/O is attempted.
    InvalidQuality(i64),
    /// The referenced item does not exist in the store.
    NotFound(ItemId),
    /// The persistence layer failed. Not retried here: retry policy belongs
    /// to the caller.
    Store(rusqlite::Error),
    Io(std::io::Error),
    Message(String),
}

pub type Fallible<T> = Result<T, ErrorReport>;

impl ErrorReport {
    pub fn new(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

pub fn fail<T>(message: &str) -> Fallible<T> {
    Err(ErrorReport::new(message))
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorReport::InvalidQuality(q) => {
                write!(f, "error: invalid quality rating: {q} (expected 0-3).")
            }
            ErrorReport::NotFound(id) => write!(f, "error: no item with id {id}."),
            ErrorReport::Store(e) => write!(f, "error: store failure: {e}"),
            ErrorReport::Io(e) => write!(f, "error: {e}"),
            ErrorReport::Message(m) => write!(f, "error: {m}"),
        }
    }
}

impl std::error::Error for ErrorReport {}

impl From<rusqlite::Error> for ErrorReport {
    fn from(e: rusqlite::Error) -> Self {
        Self::Store(e)
    }
}

impl From<std::io::Error> for ErrorReport {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(e: serde_json::Error) -> Self {
        Self::Message(e.to_string())
    }
}
