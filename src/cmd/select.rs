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
use crate::selector::CardSelector;
use crate::sequencer::CardSequencer;
use crate::store::CardCatalog;
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::ids::LearnerId;
use crate::types::ids::TopicId;
use crate::types::timestamp::Timestamp;
use crate::types::topic_filter::TopicFilter;

pub struct SelectOptions {
    pub priority_topic: Option<TopicId>,
    pub filter: TopicFilter,
    pub due_only: bool,
    pub limit: usize,
}

/// The cards to practice next, in presentation order.
pub fn select_cards(
    db: &Database,
    learner: LearnerId,
    deck: DeckId,
    options: &SelectOptions,
) -> Fallible<Option<Vec<CardId>>> {
    let priority_topic = match options.priority_topic {
        Some(topic) => db.topic_name(topic)?,
        None => None,
    };
    let selector = CardSelector::new(priority_topic, !options.due_only);
    let model = DeckModel::new(
        db,
        learner,
        deck,
        Some(selector),
        Some(CardSequencer::new()),
        options.filter,
        Timestamp::now(),
    )?;
    Ok(model.get_card_selection(options.limit))
}

pub fn print_selection(
    db: &Database,
    learner: LearnerId,
    deck: DeckId,
    options: &SelectOptions,
) -> Fallible<()> {
    match select_cards(db, learner, deck, options)? {
        Some(cards) if !cards.is_empty() => {
            for card in cards {
                println!("{card}");
            }
        }
        Some(_) => println!("Nothing to practice right now."),
        None => println!("No cards to practice in this deck."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::error::ErrorReport;
    use crate::selector::SESSION_SIZE;
    use crate::store::ProgressStore;
    use crate::types::box_position::BoxPosition;

    fn options() -> SelectOptions {
        SelectOptions {
            priority_topic: None,
            filter: TopicFilter::All,
            due_only: true,
            limit: 0,
        }
    }

    #[test]
    fn test_empty_deck() -> Fallible<()> {
        let db = Database::in_memory()?;
        let selection = select_cards(&db, LearnerId::new(1), DeckId::new(1), &options())?;
        assert_eq!(selection, None);
        print_selection(&db, LearnerId::new(1), DeckId::new(1), &options())?;
        Ok(())
    }

    #[test]
    fn test_due_only() -> Fallible<()> {
        let db = Database::in_memory()?;
        let learner = LearnerId::new(1);
        let deck = DeckId::new(1);
        let now = Timestamp::now();
        let card = db.add_card(deck, None, true, now)?;
        db.ensure_progress_records(learner, deck, TopicFilter::All)?;
        let mut record = db
            .get_progress_record(learner, card)?
            .ok_or_else(|| ErrorReport::new("missing record"))?;
        record.box_position = BoxPosition::new(4)?;
        record.last_practiced_at = Some(now - Duration::hours(1));
        db.update_progress_record(&record)?;

        assert_eq!(select_cards(&db, learner, deck, &options())?, Some(vec![]));
        let all = SelectOptions {
            due_only: false,
            ..options()
        };
        assert_eq!(select_cards(&db, learner, deck, &all)?, Some(vec![card]));
        Ok(())
    }

    #[test]
    fn test_priority_topic_makes_the_cut() -> Fallible<()> {
        let db = Database::in_memory()?;
        let learner = LearnerId::new(1);
        let deck = DeckId::new(1);
        let now = Timestamp::now();
        let verbs = db.add_topic(deck, "Verbs")?;
        let nouns = db.add_topic(deck, "Nouns")?;
        let mut cards = Vec::new();
        for _ in 0..SESSION_SIZE + 1 {
            cards.push((db.add_card(deck, Some(nouns), true, now)?, 10));
        }
        let verb = db.add_card(deck, Some(verbs), true, now)?;
        cards.push((verb, 2));
        db.ensure_progress_records(learner, deck, TopicFilter::All)?;
        for (card, days) in cards {
            let mut record = db
                .get_progress_record(learner, card)?
                .ok_or_else(|| ErrorReport::new("missing record"))?;
            record.box_position = BoxPosition::FIRST;
            record.last_practiced_at = Some(now - Duration::days(days));
            db.update_progress_record(&record)?;
        }

        let plain = select_cards(&db, learner, deck, &options())?.unwrap_or_default();
        assert_eq!(plain.len(), SESSION_SIZE);
        assert!(!plain.contains(&verb));

        let prioritized = SelectOptions {
            priority_topic: Some(verbs),
            ..options()
        };
        let selection = select_cards(&db, learner, deck, &prioritized)?.unwrap_or_default();
        assert_eq!(selection.len(), SESSION_SIZE);
        assert!(selection.contains(&verb));

        let unknown = SelectOptions {
            priority_topic: Some(TopicId::new(99)),
            ..options()
        };
        let selection = select_cards(&db, learner, deck, &unknown)?.unwrap_or_default();
        assert!(!selection.contains(&verb));
        Ok(())
    }
}
