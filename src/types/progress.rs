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

use serde::Serialize;

use crate::types::box_position::BoxPosition;
use crate::types::ids::CardId;
use crate::types::ids::LearnerId;
use crate::types::timestamp::Timestamp;

/// A learner's scheduling state for one card.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ProgressRecord {
    pub learner_id: LearnerId,
    pub card_id: CardId,
    pub box_position: BoxPosition,
    /// `None` until the card is first answered.
    pub last_practiced_at: Option<Timestamp>,
    /// The number of times the card was answered.
    pub repetitions: u32,
    /// The name of the card's topic, joined from the catalog.
    pub topic_name: Option<String>,
}

impl ProgressRecord {
    /// The record a card starts with when it enters a learner's system.
    pub fn new(learner_id: LearnerId, card_id: CardId, topic_name: Option<String>) -> Self {
        Self {
            learner_id,
            card_id,
            box_position: BoxPosition::NEW,
            last_practiced_at: None,
            repetitions: 0,
            topic_name,
        }
    }
}

/// How a card is labelled for a learner.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    New,
    Box(u8),
    Mastered,
}

impl CardStatus {
    pub fn of(record: Option<&ProgressRecord>) -> Self {
        match record.map(|r| r.box_position) {
            None => CardStatus::New,
            Some(position) if position.is_new() => CardStatus::New,
            Some(position) if position.is_mastered() => CardStatus::Mastered,
            Some(position) => CardStatus::Box(position.value()),
        }
    }
}

impl Display for CardStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CardStatus::New => write!(f, "new"),
            CardStatus::Box(n) => write!(f, "{n}"),
            CardStatus::Mastered => write!(f, "mastered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_new_record() {
        let record = ProgressRecord::new(LearnerId::new(1), CardId::new(2), None);
        assert!(record.box_position.is_new());
        assert_eq!(record.repetitions, 0);
        assert_eq!(record.last_practiced_at, None);
    }

    #[test]
    fn test_status() -> Fallible<()> {
        let mut record = ProgressRecord::new(LearnerId::new(1), CardId::new(2), None);
        assert_eq!(CardStatus::of(None), CardStatus::New);
        assert_eq!(CardStatus::of(Some(&record)), CardStatus::New);
        record.box_position = BoxPosition::new(3)?;
        assert_eq!(CardStatus::of(Some(&record)), CardStatus::Box(3));
        assert_eq!(CardStatus::of(Some(&record)).to_string(), "3");
        record.box_position = BoxPosition::MASTERED;
        assert_eq!(CardStatus::of(Some(&record)).to_string(), "mastered");
        Ok(())
    }
}
