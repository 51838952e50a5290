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

//! A fixed-ladder spaced repetition scheduling engine.
//!
//! Items climb a six-rung ladder of review intervals (same day, one day,
//! three days, one week, two weeks, one month). Each review rating moves
//! the item up, holds it, or resets it, until it is mastered at the top of
//! the ladder.

pub mod cli;
pub mod db;
pub mod error;
pub mod recorder;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod types;
