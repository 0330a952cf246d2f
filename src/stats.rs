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

use serde::Serialize;

use crate::db::Database;
use crate::db::SessionId;
use crate::db::SessionRow;
use crate::error::Fallible;
use crate::types::box_position::BOX_COUNT;
use crate::types::ids::DeckId;
use crate::types::ids::LearnerId;
use crate::types::timestamp::Timestamp;

/// How a deck's progress records are spread over the boxes, across all
/// learners.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStatistics {
    pub learner_count: usize,
    /// Records in each box.
    pub absolute: [usize; BOX_COUNT],
    /// Records in each box per practising learner.
    pub average: [f64; BOX_COUNT],
}

impl DeckStatistics {
    pub fn compute(db: &Database, deck: DeckId) -> Fallible<Self> {
        let absolute = db.box_counts(deck)?;
        let learner_count = db.practising_learner_count(deck)?;
        Ok(Self::from_counts(absolute, learner_count))
    }

    fn from_counts(absolute: [usize; BOX_COUNT], learner_count: usize) -> Self {
        let mut average = [0.0; BOX_COUNT];
        if learner_count > 0 {
            for (avg, count) in average.iter_mut().zip(absolute) {
                *avg = count as f64 / learner_count as f64;
            }
        }
        Self {
            learner_count,
            absolute,
            average,
        }
    }
}

/// A finished practice session, as shown in a learner's history.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub card_count: usize,
    pub correct_count: usize,
    pub duration_seconds: i64,
    pub percent_correct: f64,
}

impl From<SessionRow> for SessionSummary {
    fn from(row: SessionRow) -> Self {
        let duration_seconds = (row.ended_at - row.started_at).num_seconds();
        let percent_correct = if row.card_count == 0 {
            0.0
        } else {
            row.correct_count as f64 * 100.0 / row.card_count as f64
        };
        Self {
            session_id: row.session_id,
            started_at: row.started_at,
            ended_at: row.ended_at,
            card_count: row.card_count,
            correct_count: row.correct_count,
            duration_seconds,
            percent_correct,
        }
    }
}

pub fn session_history(
    db: &Database,
    learner: LearnerId,
    deck: DeckId,
) -> Fallible<Vec<SessionSummary>> {
    let rows = db.sessions(learner, deck)?;
    Ok(rows.into_iter().map(SessionSummary::from).collect())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::store::ProgressStore;
    use crate::types::box_position::BoxPosition;
    use crate::types::topic_filter::TopicFilter;

    #[test]
    fn test_empty_deck() -> Fallible<()> {
        let db = Database::in_memory()?;
        let stats = DeckStatistics::compute(&db, DeckId::new(1))?;
        assert_eq!(stats.learner_count, 0);
        assert_eq!(stats.absolute, [0; BOX_COUNT]);
        assert_eq!(stats.average, [0.0; BOX_COUNT]);
        Ok(())
    }

    #[test]
    fn test_averages() -> Fallible<()> {
        let db = Database::in_memory()?;
        let deck = DeckId::new(1);
        let now = Timestamp::now();
        db.add_card(deck, None, true, now)?;
        let card = db.add_card(deck, None, true, now)?;
        for learner in [LearnerId::new(1), LearnerId::new(2)] {
            db.ensure_progress_records(learner, deck, TopicFilter::All)?;
        }
        if let Some(mut record) = db.get_progress_record(LearnerId::new(1), card)? {
            record.box_position = BoxPosition::MASTERED;
            db.update_progress_record(&record)?;
        }
        let stats = DeckStatistics::compute(&db, deck)?;
        assert_eq!(stats.learner_count, 2);
        assert_eq!(stats.absolute, [3, 0, 0, 0, 0, 0, 1]);
        assert_eq!(stats.average, [1.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5]);
        Ok(())
    }

    #[test]
    fn test_session_summary() -> Fallible<()> {
        let db = Database::in_memory()?;
        let learner = LearnerId::new(1);
        let deck = DeckId::new(1);
        let start = Timestamp::parse("2025-03-01T10:00:00Z")?;
        db.save_session(learner, deck, start, start + Duration::seconds(95), 8, 6)?;
        db.save_session(learner, deck, start + Duration::hours(1), start + Duration::hours(1), 0, 0)?;

        let history = session_history(&db, learner, deck)?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].duration_seconds, 95);
        assert_eq!(history[0].percent_correct, 75.0);
        assert_eq!(history[1].duration_seconds, 0);
        assert_eq!(history[1].percent_correct, 0.0);
        assert!(session_history(&db, LearnerId::new(2), deck)?.is_empty());
        Ok(())
    }
}
