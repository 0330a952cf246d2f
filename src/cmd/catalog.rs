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
use crate::error::Fallible;
use crate::error::fail;
use crate::store::CardCatalog;
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::ids::TopicId;
use crate::types::timestamp::Timestamp;

pub fn add_topic(db: &Database, deck: DeckId, name: &str) -> Fallible<TopicId> {
    let name = name.trim();
    if name.is_empty() {
        return fail("topic name is empty.");
    }
    let topic = db.add_topic(deck, name)?;
    println!("{topic}");
    Ok(topic)
}

pub fn add_card(
    db: &Database,
    deck: DeckId,
    topic: Option<TopicId>,
    approved: bool,
) -> Fallible<CardId> {
    if let Some(topic) = topic {
        if db.topic_name(topic)?.is_none() {
            return fail("topic does not exist.");
        }
    }
    let card = db.add_card(deck, topic, approved, Timestamp::now())?;
    println!("{card}");
    Ok(card)
}

pub fn approve_card(db: &Database, card: CardId) -> Fallible<()> {
    if !db.approve_card(card)? {
        return fail("card does not exist.");
    }
    Ok(())
}

pub fn delete_card(db: &Database, card: CardId) -> Fallible<()> {
    if !db.delete_card(card)? {
        return fail("card does not exist.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::topic_filter::TopicFilter;

    #[test]
    fn test_add_and_approve() -> Fallible<()> {
        let db = Database::in_memory()?;
        let deck = DeckId::new(1);
        let topic = add_topic(&db, deck, " Verbs ")?;
        assert_eq!(db.topic_name(topic)?, Some("Verbs".to_string()));
        let card = add_card(&db, deck, Some(topic), false)?;
        assert!(db.approved_card_ids(deck, TopicFilter::All)?.is_empty());
        approve_card(&db, card)?;
        assert_eq!(db.approved_card_ids(deck, TopicFilter::All)?, vec![card]);
        Ok(())
    }

    #[test]
    fn test_empty_topic_name() -> Fallible<()> {
        let db = Database::in_memory()?;
        assert!(add_topic(&db, DeckId::new(1), "  ").is_err());
        Ok(())
    }

    #[test]
    fn test_unknown_topic() -> Fallible<()> {
        let db = Database::in_memory()?;
        assert!(add_card(&db, DeckId::new(1), Some(TopicId::new(9)), true).is_err());
        Ok(())
    }

    #[test]
    fn test_unknown_card() -> Fallible<()> {
        let db = Database::in_memory()?;
        assert!(approve_card(&db, CardId::new(9)).is_err());
        assert!(delete_card(&db, CardId::new(9)).is_err());
        Ok(())
    }

    #[test]
    fn test_delete() -> Fallible<()> {
        let db = Database::in_memory()?;
        let deck = DeckId::new(1);
        let card = add_card(&db, deck, None, true)?;
        delete_card(&db, card)?;
        assert!(db.approved_card_ids(deck, TopicFilter::All)?.is_empty());
        Ok(())
    }
}
