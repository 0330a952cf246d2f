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

use rand::Rng;
use rand::seq::SliceRandom;

use crate::types::progress::ProgressRecord;

/// Orders a selected batch of cards for presentation.
///
/// Topics are interleaved so that consecutive cards vary, then cards from
/// box 1 move to the front and new cards to the back of the session, where
/// primacy and recency make them easiest to remember.
#[derive(Clone, Copy, Debug, Default)]
pub struct CardSequencer;

impl CardSequencer {
    pub fn new() -> Self {
        Self
    }

    /// Reorder `batch`. `topics` are the names of the deck's topics, in
    /// catalog order.
    pub fn sequence<'a, R: Rng + ?Sized>(
        &self,
        mut batch: Vec<&'a ProgressRecord>,
        topics: &[String],
        rng: &mut R,
    ) -> Vec<&'a ProgressRecord> {
        batch.shuffle(rng);
        let mut sequence = if topics.is_empty() {
            batch
        } else {
            interleave_topics(batch, topics)
        };
        sequence.sort_by_key(|record| primacy_rank(record));
        sequence
    }
}

/// Round-robin over topic groups: the i-th card of every group, then the
/// (i+1)-th, and so on. Untagged cards form the first group.
fn interleave_topics<'a>(
    batch: Vec<&'a ProgressRecord>,
    topics: &[String],
) -> Vec<&'a ProgressRecord> {
    let total = batch.len();
    let mut groups: Vec<(Option<&str>, Vec<&'a ProgressRecord>)> = Vec::new();
    groups.push((None, Vec::new()));
    for topic in topics {
        groups.push((Some(topic.as_str()), Vec::new()));
    }
    for record in batch {
        let topic = record.topic_name.as_deref();
        match groups.iter_mut().find(|(name, _)| *name == topic) {
            Some((_, group)) => group.push(record),
            None => groups.push((topic, vec![record])),
        }
    }

    let mut sequence = Vec::with_capacity(total);
    let mut i = 0;
    while sequence.len() < total {
        for (_, group) in &groups {
            if let Some(record) = group.get(i) {
                sequence.push(*record);
            }
        }
        i += 1;
    }
    sequence
}

/// Box 1 first, new cards last, everything else keeps its place between.
fn primacy_rank(record: &ProgressRecord) -> u8 {
    match record.box_position.value() {
        1 => 0,
        0 => 2,
        _ => 1,
    }
}
