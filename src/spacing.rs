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

use chrono::Duration;

use crate::types::box_position::BoxPosition;
use crate::types::progress::ProgressRecord;
use crate::types::timestamp::Timestamp;

/// Days between repetitions for boxes 1 through 5.
const SPACING_DAYS: [i64; 5] = [1, 2, 4, 8, 16];

/// The spacing interval of an active box. New and mastered boxes have none.
pub fn interval(position: BoxPosition) -> Option<Duration> {
    match position.value() {
        n @ 1..=5 => Some(Duration::days(SPACING_DAYS[usize::from(n) - 1])),
        _ => None,
    }
}

/// When a card is next due for practice.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DueState {
    /// Due at the given time, which may be in the past.
    At(Timestamp),
    /// Mastered: never scheduled again.
    Never,
}

impl DueState {
    pub fn of(record: &ProgressRecord, now: Timestamp) -> Self {
        if record.box_position.is_mastered() {
            return DueState::Never;
        }
        match (interval(record.box_position), record.last_practiced_at) {
            (Some(interval), Some(last)) => DueState::At(last + interval),
            // New cards, and active cards that somehow lack a practice
            // time, are due right away.
            _ => DueState::At(now),
        }
    }

    pub fn due_at(self) -> Option<Timestamp> {
        match self {
            DueState::At(ts) => Some(ts),
            DueState::Never => None,
        }
    }

    pub fn is_due(self, now: Timestamp) -> bool {
        match self {
            DueState::At(ts) => ts <= now,
            DueState::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::types::ids::CardId;
    use crate::types::ids::LearnerId;

    fn record(position: u8, last: Option<Timestamp>) -> Fallible<ProgressRecord> {
        let mut record = ProgressRecord::new(LearnerId::new(1), CardId::new(1), None);
        record.box_position = BoxPosition::new(position)?;
        record.last_practiced_at = last;
        Ok(record)
    }

    #[test]
    fn test_interval() -> Fallible<()> {
        assert_eq!(interval(BoxPosition::NEW), None);
        assert_eq!(interval(BoxPosition::new(1)?), Some(Duration::days(1)));
        assert_eq!(interval(BoxPosition::new(2)?), Some(Duration::days(2)));
        assert_eq!(interval(BoxPosition::new(3)?), Some(Duration::days(4)));
        assert_eq!(interval(BoxPosition::new(4)?), Some(Duration::days(8)));
        assert_eq!(interval(BoxPosition::new(5)?), Some(Duration::days(16)));
        assert_eq!(interval(BoxPosition::MASTERED), None);
        Ok(())
    }

    #[test]
    fn test_new_card_is_due_now() -> Fallible<()> {
        let now = Timestamp::now();
        let state = DueState::of(&record(0, None)?, now);
        assert_eq!(state, DueState::At(now));
        assert!(state.is_due(now));
        Ok(())
    }

    #[test]
    fn test_mastered_card_is_never_due() -> Fallible<()> {
        let now = Timestamp::now();
        let state = DueState::of(&record(6, Some(now - Duration::days(365)))?, now);
        assert_eq!(state, DueState::Never);
        assert!(!state.is_due(now));
        assert_eq!(state.due_at(), None);
        Ok(())
    }

    #[test]
    fn test_active_card() -> Fallible<()> {
        let now = Timestamp::now();
        let last = now - Duration::days(3);
        // Box 2 waits two days: overdue by one.
        let state = DueState::of(&record(2, Some(last))?, now);
        assert_eq!(state, DueState::At(last + Duration::days(2)));
        assert!(state.is_due(now));
        // Box 3 waits four days: due tomorrow.
        let state = DueState::of(&record(3, Some(last))?, now);
        assert!(!state.is_due(now));
        Ok(())
    }

    #[test]
    fn test_due_exactly_at_deadline() -> Fallible<()> {
        let now = Timestamp::now();
        let state = DueState::of(&record(1, Some(now - Duration::days(1)))?, now);
        assert!(state.is_due(now));
        Ok(())
    }
}
