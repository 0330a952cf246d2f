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

use crate::cmd::OutputFormat;
use crate::db::Database;
use crate::error::Fallible;
use crate::stats::DeckStatistics;
use crate::types::box_position::BoxPosition;
use crate::types::ids::DeckId;

pub fn print_deck_stats(db: &Database, deck: DeckId, format: OutputFormat) -> Fallible<()> {
    let stats = DeckStatistics::compute(db, deck)?;
    match format {
        OutputFormat::Text => {
            println!("Learners: {}", stats.learner_count);
            for position in BoxPosition::all() {
                let label = if position.is_new() {
                    "New".to_string()
                } else if position.is_mastered() {
                    "Mastered".to_string()
                } else {
                    format!("Box {position}")
                };
                let i = position.index();
                println!("{label}: {} ({:.2} per learner)", stats.absolute[i], stats.average[i]);
            }
        }
        OutputFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print() -> Fallible<()> {
        let db = Database::in_memory()?;
        print_deck_stats(&db, DeckId::new(1), OutputFormat::Text)?;
        print_deck_stats(&db, DeckId::new(1), OutputFormat::Json)?;
        Ok(())
    }
}
