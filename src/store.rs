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
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::ids::LearnerId;
use crate::types::ids::TopicId;
use crate::types::progress::ProgressRecord;
use crate::types::topic_filter::TopicFilter;

/// Where learners' progress records live.
pub trait ProgressStore {
    /// Create a new-card record for every approved card in the deck (within
    /// the filter) that the learner has no record for. Existing records are
    /// left untouched. Returns the number of records created.
    fn ensure_progress_records(
        &self,
        learner: LearnerId,
        deck: DeckId,
        filter: TopicFilter,
    ) -> Fallible<usize>;

    /// The learner's records for the deck, within the filter, each joined
    /// with its card's topic name, ordered by box position.
    fn load_progress_records(
        &self,
        learner: LearnerId,
        deck: DeckId,
        filter: TopicFilter,
    ) -> Fallible<Vec<ProgressRecord>>;

    /// Write a record back. Returns `false` if there was no such record.
    fn update_progress_record(&self, record: &ProgressRecord) -> Fallible<bool>;
}

/// Read access to cards and topics.
pub trait CardCatalog {
    /// The ids of the approved cards in a deck, within the filter.
    fn approved_card_ids(&self, deck: DeckId, filter: TopicFilter) -> Fallible<Vec<CardId>>;

    /// The names of a deck's topics, in creation order.
    fn topic_names(&self, deck: DeckId) -> Fallible<Vec<String>>;

    /// The name of a topic, if it exists.
    fn topic_name(&self, topic: TopicId) -> Fallible<Option<String>>;
}
