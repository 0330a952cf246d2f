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

use std::cmp::Reverse;

use chrono::Duration;
use serde::Serialize;

use crate::spacing::DueState;
use crate::types::box_position::BoxPosition;
use crate::types::progress::ProgressRecord;
use crate::types::timestamp::Timestamp;

/// The maximum number of cards in a practice session.
pub const SESSION_SIZE: usize = 10;

/// Due times closer together than this are treated as equally urgent.
const DUE_WINDOW_HOURS: i64 = 3;

/// Picks the cards a learner should practice next.
#[derive(Clone, Debug, Default)]
pub struct CardSelector {
    /// Cards with this topic name rank before all others.
    priority_topic: Option<String>,
    /// Whether cards that are not yet due are eligible too.
    practice_all: bool,
}

/// The number of due and not-due cards in a group of records.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueSplit {
    pub due: usize,
    pub not_due: usize,
}

/// A record's place in the priority queue. Fields are compared in
/// declaration order, so each one only breaks ties left by the previous.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
struct RankKey {
    /// 0 for the priority topic, 1 for everything else.
    topic_rank: u8,
    due_bucket: usize,
    box_position: BoxPosition,
    /// More repetitions first.
    repetitions: Reverse<u32>,
    /// Never-practiced cards first, then longest untouched.
    last_practiced_at: Option<Timestamp>,
}

impl CardSelector {
    pub fn new(priority_topic: Option<String>, practice_all: bool) -> Self {
        Self {
            priority_topic,
            practice_all,
        }
    }

    /// Rank a learner's records and return up to [`SESSION_SIZE`] of them,
    /// most urgent first. Returns `None` when there are no records at all.
    pub fn select<'a>(
        &self,
        records: &'a [ProgressRecord],
        now: Timestamp,
    ) -> Option<Vec<&'a ProgressRecord>> {
        if records.is_empty() {
            return None;
        }
        let mut ranked = self.rank(records, now);
        ranked.truncate(SESSION_SIZE);
        log::debug!(
            "Selected {} of {} records for practice.",
            ranked.len(),
            records.len()
        );
        Some(ranked)
    }

    /// The whole candidate pool in priority order.
    fn rank<'a>(&self, records: &'a [ProgressRecord], now: Timestamp) -> Vec<&'a ProgressRecord> {
        let mut pool: Vec<(u8, Timestamp, &ProgressRecord)> = records
            .iter()
            .filter_map(|record| {
                let due_at = DueState::of(record, now).due_at()?;
                if due_at <= now || self.practice_all {
                    Some((self.topic_rank(record), due_at, record))
                } else {
                    None
                }
            })
            .collect();
        pool.sort_by_key(|(topic_rank, due_at, _)| (*topic_rank, *due_at));

        // Due buckets never span the priority split.
        let mut keyed: Vec<(RankKey, &ProgressRecord)> = Vec::with_capacity(pool.len());
        let window = Duration::hours(DUE_WINDOW_HOURS);
        let mut bucket = 0;
        let mut bucket_start: Option<(u8, Timestamp)> = None;
        for (topic_rank, due_at, record) in pool {
            match bucket_start {
                Some((rank, start)) if rank == topic_rank && due_at - start < window => {}
                Some(_) => {
                    bucket += 1;
                    bucket_start = Some((topic_rank, due_at));
                }
                None => bucket_start = Some((topic_rank, due_at)),
            }
            let key = RankKey {
                topic_rank,
                due_bucket: bucket,
                box_position: record.box_position,
                repetitions: Reverse(record.repetitions),
                last_practiced_at: record.last_practiced_at,
            };
            keyed.push((key, record));
        }
        keyed.sort_by_key(|(key, _)| *key);
        keyed.into_iter().map(|(_, record)| record).collect()
    }

    /// 0 for the priority topic, 1 for everything else.
    fn topic_rank(&self, record: &ProgressRecord) -> u8 {
        match (&self.priority_topic, &record.topic_name) {
            (Some(priority), Some(topic)) if priority == topic => 0,
            _ => 1,
        }
    }

    /// Count due and not-due records. Meant for the active boxes; used for
    /// status reporting, not selection.
    pub fn count_due_and_not_due(records: &[ProgressRecord], now: Timestamp) -> DueSplit {
        let mut split = DueSplit::default();
        for record in records {
            if DueState::of(record, now).is_due(now) {
                split.due += 1;
            } else {
                split.not_due += 1;
            }
        }
        split
    }
}
