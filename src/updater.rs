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

use crate::error::Fallible;
use crate::store::ProgressStore;
use crate::types::box_position::BoxPosition;
use crate::types::progress::ProgressRecord;
use crate::types::timestamp::Timestamp;

/// Moves cards through the boxes as they are answered.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgressUpdater;

impl ProgressUpdater {
    pub fn new() -> Self {
        Self
    }

    /// The state of `record` after an answer at `now`.
    ///
    /// A correct answer moves a new card straight to box 2 and any other card
    /// up one box. A wrong answer sends the card back to box 1.
    pub fn advance(&self, record: &ProgressRecord, correct: bool, now: Timestamp) -> ProgressRecord {
        let box_position = if correct {
            record.box_position.promoted()
        } else {
            BoxPosition::FIRST
        };
        // Never move the practice time backwards.
        let last_practiced_at = match record.last_practiced_at {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        ProgressRecord {
            box_position,
            last_practiced_at: Some(last_practiced_at),
            repetitions: record.repetitions.saturating_add(1),
            ..record.clone()
        }
    }

    /// Apply an answer and persist it. `record` is only changed if the store
    /// accepted the write. Returns whether it did.
    pub fn record_answer<S: ProgressStore + ?Sized>(
        &self,
        store: &S,
        record: &mut ProgressRecord,
        correct: bool,
        now: Timestamp,
    ) -> Fallible<bool> {
        let updated = self.advance(record, correct, now);
        if !store.update_progress_record(&updated)? {
            log::warn!(
                "No progress record for learner {} and card {}.",
                record.learner_id,
                record.card_id
            );
            return Ok(false);
        }
        log::debug!(
            "Card {}: box {} -> {} (correct={correct}).",
            record.card_id,
            record.box_position,
            updated.box_position
        );
        *record = updated;
        Ok(true)
    }
}
