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

use crate::db::Database;
use crate::deck::DeckModel;
use crate::error::Fallible;
use crate::error::fail;
use crate::types::ids::CardId;
use crate::types::ids::LearnerId;
use crate::types::progress::CardStatus;
use crate::types::timestamp::Timestamp;
use crate::types::topic_filter::TopicFilter;

/// Record a learner's answer to a card, and return the card's new status.
pub fn record_answer(
    db: &Database,
    learner: LearnerId,
    card: CardId,
    correct: bool,
) -> Fallible<CardStatus> {
    let Some(deck) = db.card_deck(card)? else {
        return fail("card does not exist.");
    };
    let mut model = DeckModel::new(db, learner, deck, None, None, TopicFilter::All, Timestamp::now())?;
    if !model.record_answer(card, correct)? {
        return fail("answer not recorded: the card is not approved, or its progress could not be saved.");
    }
    let record = db.get_progress_record(learner, card)?;
    let status = CardStatus::of(record.as_ref());
    println!("Card {card}: {status}");
    Ok(status)
}
