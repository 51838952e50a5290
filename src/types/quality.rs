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

use crate::error::ErrorReport;
use crate::error::Fallible;

/// The user's self-assessment of recall difficulty.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Quality {
    Forgot,
    Hard,
    Good,
    Easy,
}

impl Quality {
    /// Parse a raw rating. Values outside `{0,1,2,3}` are a caller error and
    /// must be rejected before any I/O.
    pub fn from_raw(raw: i64) -> Fallible<Self> {
        match raw {
            0 => Ok(Quality::Forgot),
            1 => Ok(Quality::Hard),
            2 => Ok(Quality::Good),
            3 => Ok(Quality::Easy),
            _ => Err(ErrorReport::InvalidQuality(raw)),
        }
    }

    pub fn as_raw(self) -> i64 {
        match self {
            Quality::Forgot => 0,
            Quality::Hard => 1,
            Quality::Good => 2,
            Quality::Easy => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Forgot => "Forgot",
            Quality::Hard => "Hard",
            Quality::Good => "Good",
            Quality::Easy => "Easy",
        }
    }
}
