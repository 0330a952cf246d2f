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
use crate::db::SessionId;
use crate::error::Fallible;
use crate::error::fail;
use crate::stats::session_history;
use crate::types::ids::DeckId;
use crate::types::ids::LearnerId;
use crate::types::timestamp::Timestamp;

pub struct SessionInput {
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub card_count: usize,
    pub correct_count: usize,
}

pub fn log_session(
    db: &Database,
    learner: LearnerId,
    deck: DeckId,
    input: &SessionInput,
) -> Fallible<SessionId> {
    if input.ended_at < input.started_at {
        return fail("session ends before it starts.");
    }
    if input.correct_count > input.card_count {
        return fail("more correct answers than cards.");
    }
    let session = db.save_session(
        learner,
        deck,
        input.started_at,
        input.ended_at,
        input.card_count,
        input.correct_count,
    )?;
    println!("{session}");
    Ok(session)
}

pub fn print_history(
    db: &Database,
    learner: LearnerId,
    deck: DeckId,
    format: OutputFormat,
) -> Fallible<()> {
    let history = session_history(db, learner, deck)?;
    match format {
        OutputFormat::Text => {
            if history.is_empty() {
                println!("No sessions yet.");
            }
            for session in history {
                println!(
                    "{}  {}s  {}/{} correct ({:.0}%)",
                    session.started_at,
                    session.duration_seconds,
                    session.correct_count,
                    session.card_count,
                    session.percent_correct
                );
            }
        }
        OutputFormat::Json => {
            let history_json = serde_json::to_string_pretty(&history)?;
            println!("{}", history_json);
        }
    }
    Ok(())
}
