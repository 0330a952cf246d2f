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

use crate::cmd::OutputFormat;
use crate::db::Database;
use crate::deck::DeckModel;
use crate::deck::DeckStatus;
use crate::error::Fallible;
use crate::types::ids::DeckId;
use crate::types::ids::LearnerId;
use crate::types::timestamp::Timestamp;
use crate::types::topic_filter::TopicFilter;

#[derive(Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    total_count: usize,
    due_count: usize,
    mastered_count: usize,
    all_mastered: bool,
    status: DeckStatus,
}

impl StatusReport {
    pub fn build(
        db: &Database,
        learner: LearnerId,
        deck: DeckId,
        filter: TopicFilter,
    ) -> Fallible<Self> {
        let model = DeckModel::new(db, learner, deck, None, None, filter, Timestamp::now())?;
        Ok(Self {
            total_count: model.count_cards(),
            due_count: model.count_due_cards(),
            mastered_count: model.count_mastered_cards(),
            all_mastered: model.all_mastered(),
            status: model.get_status(),
        })
    }
}

pub fn print_status(
    db: &Database,
    learner: LearnerId,
    deck: DeckId,
    filter: TopicFilter,
    format: OutputFormat,
) -> Fallible<()> {
    let report = StatusReport::build(db, learner, deck, filter)?;
    match format {
        OutputFormat::Text => {
            if report.total_count == 0 {
                println!("No cards to practice in this deck.");
                return Ok(());
            }
            println!("Cards: {}", report.total_count);
            println!("Due: {}", report.due_count);
            println!("New: {}", report.status.new);
            for (i, split) in report.status.boxes.iter().enumerate() {
                println!(
                    "Box {}: {} due, {} not due",
                    i + 1,
                    split.due,
                    split.not_due
                );
            }
            println!("Mastered: {}", report.mastered_count);
            if report.all_mastered {
                println!("Every card is mastered.");
            }
        }
        OutputFormat::Json => {
            let report_json = serde_json::to_string_pretty(&report)?;
            println!("{}", report_json);
        }
    }
    Ok(())
}
