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

use std::time::Instant;

use rand::Rng;
use serde::Serialize;

use crate::error::Fallible;
use crate::selector::CardSelector;
use crate::selector::DueSplit;
use crate::sequencer::CardSequencer;
use crate::spacing::DueState;
use crate::store::CardCatalog;
use crate::store::ProgressStore;
use crate::types::box_position::BOX_COUNT;
use crate::types::box_position::BoxPosition;
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::ids::LearnerId;
use crate::types::progress::ProgressRecord;
use crate::types::timestamp::Timestamp;
use crate::types::topic_filter::TopicFilter;
use crate::updater::ProgressUpdater;

/// One learner's view of one deck, for the length of a request.
///
/// Building the model brings newly approved cards into the learner's system
/// and loads their progress. Every query after that is computed from the
/// loaded state, as of the timestamp the model was built with.
pub struct DeckModel<'a, S: ProgressStore + CardCatalog + ?Sized> {
    store: &'a S,
    learner: LearnerId,
    deck: DeckId,
    now: Timestamp,
    selector: Option<CardSelector>,
    sequencer: Option<CardSequencer>,
    updater: ProgressUpdater,
    topics: Vec<String>,
    records: Vec<ProgressRecord>,
    /// Indices into `records`, by box position.
    boxes: [Vec<usize>; BOX_COUNT],
}

/// Per-box counts for a learner's deck.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStatus {
    /// Cards in box 0.
    pub new: usize,
    /// Due and not-due cards in boxes 1 through 5.
    pub boxes: [DueSplit; 5],
    /// Cards in box 6.
    pub mastered: usize,
}

impl<'a, S: ProgressStore + CardCatalog + ?Sized> DeckModel<'a, S> {
    pub fn new(
        store: &'a S,
        learner: LearnerId,
        deck: DeckId,
        selector: Option<CardSelector>,
        sequencer: Option<CardSequencer>,
        filter: TopicFilter,
        now: Timestamp,
    ) -> Fallible<Self> {
        store.ensure_progress_records(learner, deck, filter)?;

        log::debug!("Loading progress for learner {learner} in deck {deck}...");
        let start = Instant::now();
        let records = store.load_progress_records(learner, deck, filter)?;
        let duration = start.elapsed().as_millis();
        log::debug!("Loaded {} records in {duration}ms.", records.len());

        let topics = store.topic_names(deck)?;
        let mut model = Self {
            store,
            learner,
            deck,
            now,
            selector,
            sequencer,
            updater: ProgressUpdater::new(),
            topics,
            records,
            boxes: Default::default(),
        };
        model.fill_boxes();
        Ok(model)
    }

    pub fn count_cards(&self) -> usize {
        self.records.len()
    }

    pub fn count_due_cards(&self) -> usize {
        self.records
            .iter()
            .filter(|record| DueState::of(record, self.now).is_due(self.now))
            .count()
    }

    pub fn count_mastered_cards(&self) -> usize {
        self.boxes[BoxPosition::MASTERED.index()].len()
    }

    /// Whether the learner has no cards in this deck.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the learner has cards, and has mastered all of them.
    pub fn all_mastered(&self) -> bool {
        !self.is_empty() && self.count_mastered_cards() == self.count_cards()
    }

    /// The ids of the cards to practice, in presentation order. A `limit` of
    /// zero means no limit beyond the session size.
    ///
    /// Returns `None` when there is nothing to select from, or no selector.
    pub fn get_card_selection(&self, limit: usize) -> Option<Vec<CardId>> {
        self.get_card_selection_with_rng(limit, &mut rand::thread_rng())
    }

    pub fn get_card_selection_with_rng<R: Rng + ?Sized>(
        &self,
        limit: usize,
        rng: &mut R,
    ) -> Option<Vec<CardId>> {
        let selector = self.selector.as_ref()?;
        let mut selection = selector.select(&self.records, self.now)?;
        if let Some(sequencer) = &self.sequencer {
            if !selection.is_empty() {
                selection = sequencer.sequence(selection, &self.topics, rng);
            }
        }
        let ids = selection.iter().map(|record| record.card_id);
        let ids: Vec<CardId> = if limit == 0 {
            ids.collect()
        } else {
            ids.take(limit).collect()
        };
        Some(ids)
    }

    pub fn get_status(&self) -> DeckStatus {
        let mut boxes = [DueSplit::default(); 5];
        for (i, split) in boxes.iter_mut().enumerate() {
            let records: Vec<ProgressRecord> = self.boxes[i + 1]
                .iter()
                .map(|&index| self.records[index].clone())
                .collect();
            *split = CardSelector::count_due_and_not_due(&records, self.now);
        }
        DeckStatus {
            new: self.boxes[BoxPosition::NEW.index()].len(),
            boxes,
            mastered: self.count_mastered_cards(),
        }
    }

    /// Record the learner's answer to a card. Returns `false` if the card is
    /// not tracked in this model or the store did not accept the update.
    pub fn record_answer(&mut self, card: CardId, correct: bool) -> Fallible<bool> {
        let Some(index) = self.records.iter().position(|r| r.card_id == card) else {
            log::warn!("Card {card} is not in deck {} for learner {}.", self.deck, self.learner);
            return Ok(false);
        };
        let record = &mut self.records[index];
        let written = self
            .updater
            .record_answer(self.store, record, correct, Timestamp::now())?;
        if written {
            self.fill_boxes();
        }
        Ok(written)
    }

    fn fill_boxes(&mut self) {
        for bucket in self.boxes.iter_mut() {
            bucket.clear();
        }
        for (index, record) in self.records.iter().enumerate() {
            self.boxes[record.box_position.index()].push(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::db::Database;
    use crate::error::ErrorReport;
    use crate::selector::SESSION_SIZE;

    fn learner() -> LearnerId {
        LearnerId::new(1)
    }

    fn deck() -> DeckId {
        DeckId::new(1)
    }

    fn set_progress(
        db: &Database,
        card: CardId,
        position: u8,
        last: Option<Timestamp>,
        repetitions: u32,
    ) -> Fallible<()> {
        let mut record = db
            .get_progress_record(learner(), card)?
            .ok_or_else(|| ErrorReport::new("missing record"))?;
        record.box_position = BoxPosition::new(position)?;
        record.last_practiced_at = last;
        record.repetitions = repetitions;
        db.update_progress_record(&record)?;
        Ok(())
    }

    fn model(db: &Database, practice_all: bool, now: Timestamp) -> Fallible<DeckModel<'_, Database>> {
        DeckModel::new(
            db,
            learner(),
            deck(),
            Some(CardSelector::new(None, practice_all)),
            Some(CardSequencer::new()),
            TopicFilter::All,
            now,
        )
    }

    /// Card 1 is new, card 2 sat in box 1 for three days, card 3 is mastered.
    fn three_card_deck(now: Timestamp) -> Fallible<(Database, [CardId; 3])> {
        let db = Database::in_memory()?;
        let c1 = db.add_card(deck(), None, true, now)?;
        let c2 = db.add_card(deck(), None, true, now)?;
        let c3 = db.add_card(deck(), None, true, now)?;
        db.ensure_progress_records(learner(), deck(), TopicFilter::All)?;
        set_progress(&db, c2, 1, Some(now - Duration::days(3)), 1)?;
        set_progress(&db, c3, 6, Some(now - Duration::days(20)), 6)?;
        Ok((db, [c1, c2, c3]))
    }

    #[test]
    fn test_counts() -> Fallible<()> {
        let now = Timestamp::now();
        let (db, _) = three_card_deck(now)?;
        let model = model(&db, false, now)?;
        assert_eq!(model.count_cards(), 3);
        assert_eq!(model.count_due_cards(), 2);
        assert_eq!(model.count_mastered_cards(), 1);
        assert!(!model.is_empty());
        assert!(!model.all_mastered());
        Ok(())
    }

    #[test]
    fn test_selection_order() -> Fallible<()> {
        let now = Timestamp::now();
        let (db, [c1, c2, _]) = three_card_deck(now)?;
        let model = model(&db, false, now)?;
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            model.get_card_selection_with_rng(0, &mut rng),
            Some(vec![c2, c1])
        );
        Ok(())
    }

    #[test]
    fn test_new_cards_enter_on_load() -> Fallible<()> {
        let now = Timestamp::now();
        let (db, _) = three_card_deck(now)?;
        let c4 = db.add_card(deck(), None, false, now)?;
        assert_eq!(model(&db, false, now)?.count_cards(), 3);
        db.approve_card(c4)?;
        let model = model(&db, false, now)?;
        assert_eq!(model.count_cards(), 4);
        assert_eq!(model.get_status().new, 2);
        Ok(())
    }

    #[test]
    fn test_no_selector() -> Fallible<()> {
        let now = Timestamp::now();
        let (db, _) = three_card_deck(now)?;
        let model = DeckModel::new(&db, learner(), deck(), None, None, TopicFilter::All, now)?;
        assert_eq!(model.get_card_selection(0), None);
        Ok(())
    }

    #[test]
    fn test_empty_deck() -> Fallible<()> {
        let db = Database::in_memory()?;
        let model = model(&db, true, Timestamp::now())?;
        assert!(model.is_empty());
        assert!(!model.all_mastered());
        assert_eq!(model.get_card_selection(0), None);
        Ok(())
    }

    #[test]
    fn test_all_mastered() -> Fallible<()> {
        let now = Timestamp::now();
        let db = Database::in_memory()?;
        let card = db.add_card(deck(), None, true, now)?;
        db.ensure_progress_records(learner(), deck(), TopicFilter::All)?;
        set_progress(&db, card, 6, Some(now), 7)?;
        let model = model(&db, true, now)?;
        assert!(model.all_mastered());
        assert_eq!(model.count_due_cards(), 0);
        assert_eq!(model.get_card_selection(0), Some(vec![]));
        Ok(())
    }

    #[test]
    fn test_limit_is_prefix_of_ranking() -> Fallible<()> {
        let now = Timestamp::now();
        let db = Database::in_memory()?;
        for days in 1..=15 {
            let card = db.add_card(deck(), None, true, now)?;
            db.ensure_progress_records(learner(), deck(), TopicFilter::All)?;
            set_progress(&db, card, 1, Some(now - Duration::days(days)), 1)?;
        }
        let ranked = DeckModel::new(
            &db,
            learner(),
            deck(),
            Some(CardSelector::new(None, false)),
            None,
            TopicFilter::All,
            now,
        )?;
        let all = ranked.get_card_selection(0).unwrap_or_default();
        assert_eq!(all.len(), SESSION_SIZE);
        let three = ranked.get_card_selection(3).unwrap_or_default();
        assert_eq!(three, all[..3].to_vec());
        Ok(())
    }

    #[test]
    fn test_status() -> Fallible<()> {
        let now = Timestamp::now();
        let (db, _) = three_card_deck(now)?;
        let c4 = db.add_card(deck(), None, true, now)?;
        db.ensure_progress_records(learner(), deck(), TopicFilter::All)?;
        set_progress(&db, c4, 3, Some(now - Duration::days(1)), 3)?;
        let status = model(&db, false, now)?.get_status();
        assert_eq!(status.new, 1);
        assert_eq!(status.mastered, 1);
        assert_eq!(status.boxes[0], DueSplit { due: 1, not_due: 0 });
        assert_eq!(status.boxes[2], DueSplit { due: 0, not_due: 1 });
        assert_eq!(status.boxes[4], DueSplit::default());
        Ok(())
    }

    #[test]
    fn test_record_answer() -> Fallible<()> {
        let now = Timestamp::now();
        let (db, [c1, c2, _]) = three_card_deck(now)?;
        let mut model = model(&db, false, now)?;
        assert!(model.record_answer(c1, true)?);
        assert!(model.record_answer(c2, false)?);
        assert_eq!(model.get_status().new, 0);

        let stored = db
            .get_progress_record(learner(), c1)?
            .ok_or_else(|| ErrorReport::new("missing record"))?;
        assert_eq!(stored.box_position, BoxPosition::SECOND);
        assert_eq!(stored.repetitions, 1);
        assert!(stored.last_practiced_at.is_some());

        let stored = db
            .get_progress_record(learner(), c2)?
            .ok_or_else(|| ErrorReport::new("missing record"))?;
        assert_eq!(stored.box_position, BoxPosition::FIRST);
        assert_eq!(stored.repetitions, 2);
        Ok(())
    }

    #[test]
    fn test_record_answer_unknown_card() -> Fallible<()> {
        let now = Timestamp::now();
        let (db, _) = three_card_deck(now)?;
        let mut model = model(&db, false, now)?;
        assert!(!model.record_answer(CardId::new(404), true)?);
        Ok(())
    }

    #[test]
    fn test_topic_filter() -> Fallible<()> {
        let now = Timestamp::now();
        let db = Database::in_memory()?;
        let math = db.add_topic(deck(), "Math")?;
        let m = db.add_card(deck(), Some(math), true, now)?;
        db.add_card(deck(), None, true, now)?;
        let model = DeckModel::new(
            &db,
            learner(),
            deck(),
            Some(CardSelector::new(None, false)),
            Some(CardSequencer::new()),
            TopicFilter::Topic(math),
            now,
        )?;
        assert_eq!(model.count_cards(), 1);
        assert_eq!(model.get_card_selection(0), Some(vec![m]));
        Ok(())
    }
}
