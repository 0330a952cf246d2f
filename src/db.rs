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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use rusqlite::params_from_iter;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::store::CardCatalog;
use crate::store::ProgressStore;
use crate::types::box_position::BOX_COUNT;
use crate::types::box_position::BoxPosition;
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::ids::LearnerId;
use crate::types::ids::TopicId;
use crate::types::progress::ProgressRecord;
use crate::types::timestamp::Timestamp;
use crate::types::topic_filter::TopicFilter;

/// A SQLite-backed card catalog and progress store.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

pub type SessionId = i64;

/// A finished practice session.
pub struct SessionRow {
    pub session_id: SessionId,
    pub started_at: Timestamp,
    pub ended_at: Timestamp,
    pub card_count: usize,
    pub correct_count: usize,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let conn = Connection::open(database_path)?;
        Self::setup(conn)
    }

    pub fn in_memory() -> Fallible<Self> {
        let conn = Connection::open_in_memory()?;
        Self::setup(conn)
    }

    fn setup(mut conn: Connection) -> Fallible<Self> {
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Add a topic to a deck.
    pub fn add_topic(&self, deck: DeckId, name: &str) -> Fallible<TopicId> {
        let conn = self.acquire();
        let sql = "insert into topics (deck_id, name) values (?, ?) returning topic_id;";
        let topic_id: TopicId = conn.query_row(sql, (deck, name), |row| row.get(0))?;
        log::debug!("Added topic {topic_id} ({name}) to deck {deck}.");
        Ok(topic_id)
    }

    /// Add a card to a deck. Unapproved cards are invisible to learners.
    pub fn add_card(
        &self,
        deck: DeckId,
        topic: Option<TopicId>,
        approved: bool,
        created_at: Timestamp,
    ) -> Fallible<CardId> {
        let conn = self.acquire();
        let sql = "insert into cards (deck_id, topic_id, approved, created_at) values (?, ?, ?, ?) returning card_id;";
        let card_id: CardId =
            conn.query_row(sql, (deck, topic, approved, created_at), |row| row.get(0))?;
        log::debug!("Added card {card_id} to deck {deck}.");
        Ok(card_id)
    }

    /// Approve a card. Returns `false` if there is no such card.
    pub fn approve_card(&self, card: CardId) -> Fallible<bool> {
        let conn = self.acquire();
        let changed = conn.execute("update cards set approved = 1 where card_id = ?;", [card])?;
        Ok(changed > 0)
    }

    /// Delete a card, and every learner's progress on it. Returns `false` if
    /// there is no such card.
    pub fn delete_card(&self, card: CardId) -> Fallible<bool> {
        let conn = self.acquire();
        let changed = conn.execute("delete from cards where card_id = ?;", [card])?;
        Ok(changed > 0)
    }

    /// A learner's record for a single card, if any.
    pub fn get_progress_record(
        &self,
        learner: LearnerId,
        card: CardId,
    ) -> Fallible<Option<ProgressRecord>> {
        let conn = self.acquire();
        let sql = format!("{SELECT_PROGRESS} where p.learner_id = ? and p.card_id = ?;");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query((learner, card))?;
        match rows.next()? {
            Some(row) => Ok(Some(progress_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// The deck the card belongs to, if the card exists.
    pub fn card_deck(&self, card: CardId) -> Fallible<Option<DeckId>> {
        let conn = self.acquire();
        let mut stmt = conn.prepare("select deck_id from cards where card_id = ?;")?;
        let mut rows = stmt.query([card])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// The number of progress records in each box, across all learners.
    pub fn box_counts(&self, deck: DeckId) -> Fallible<[usize; BOX_COUNT]> {
        let conn = self.acquire();
        let sql = "select p.box_position, count(*) from progress p join cards c on c.card_id = p.card_id where c.deck_id = ? group by p.box_position;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([deck])?;
        let mut counts = [0; BOX_COUNT];
        while let Some(row) = rows.next()? {
            let position: BoxPosition = row.get(0)?;
            counts[position.index()] = count_from_sql(row.get(1)?)?;
        }
        Ok(counts)
    }

    /// The number of learners with at least one record in the deck.
    pub fn practising_learner_count(&self, deck: DeckId) -> Fallible<usize> {
        let conn = self.acquire();
        let sql = "select count(distinct p.learner_id) from progress p join cards c on c.card_id = p.card_id where c.deck_id = ?;";
        let count: i64 = conn.query_row(sql, [deck], |row| row.get(0))?;
        count_from_sql(count)
    }

    /// Record a finished practice session.
    pub fn save_session(
        &self,
        learner: LearnerId,
        deck: DeckId,
        started_at: Timestamp,
        ended_at: Timestamp,
        card_count: usize,
        correct_count: usize,
    ) -> Fallible<SessionId> {
        let card_count = count_to_sql(card_count)?;
        let correct_count = count_to_sql(correct_count)?;
        let mut conn = self.acquire();
        let tx = conn.transaction()?;
        let sql = "insert into sessions (learner_id, deck_id, started_at, ended_at, card_count, correct_count) values (?, ?, ?, ?, ?, ?) returning session_id;";
        let session_id: SessionId = tx.query_row(
            sql,
            (
                learner,
                deck,
                started_at,
                ended_at,
                card_count,
                correct_count,
            ),
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(session_id)
    }

    /// A learner's sessions on a deck, oldest first.
    pub fn sessions(&self, learner: LearnerId, deck: DeckId) -> Fallible<Vec<SessionRow>> {
        let conn = self.acquire();
        let sql = "select session_id, started_at, ended_at, card_count, correct_count from sessions where learner_id = ? and deck_id = ? order by started_at, session_id;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query((learner, deck))?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            sessions.push(SessionRow {
                session_id: row.get(0)?,
                started_at: row.get(1)?,
                ended_at: row.get(2)?,
                card_count: count_from_sql(row.get(3)?)?,
                correct_count: count_from_sql(row.get(4)?)?,
            });
        }
        Ok(sessions)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

impl ProgressStore for Database {
    fn ensure_progress_records(
        &self,
        learner: LearnerId,
        deck: DeckId,
        filter: TopicFilter,
    ) -> Fallible<usize> {
        let conn = self.acquire();
        let (clause, mut params) = filter_clause(filter);
        params.insert(0, learner.into_inner());
        params.insert(1, deck.into_inner());
        params.insert(2, learner.into_inner());
        let sql = format!(
            "insert into progress (learner_id, card_id, box_position, last_practiced_at, repetitions) \
             select ?, c.card_id, 0, null, 0 from cards c \
             where c.deck_id = ? and c.approved = 1 \
             and not exists (select 1 from progress p where p.learner_id = ? and p.card_id = c.card_id){clause};"
        );
        let created = conn.execute(&sql, params_from_iter(params))?;
        log::debug!("Created {created} progress records for learner {learner} in deck {deck}.");
        Ok(created)
    }

    fn load_progress_records(
        &self,
        learner: LearnerId,
        deck: DeckId,
        filter: TopicFilter,
    ) -> Fallible<Vec<ProgressRecord>> {
        let conn = self.acquire();
        let (clause, mut params) = filter_clause(filter);
        params.insert(0, learner.into_inner());
        params.insert(1, deck.into_inner());
        let sql = format!(
            "{SELECT_PROGRESS} where p.learner_id = ? and c.deck_id = ?{clause} order by p.box_position, p.card_id;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(progress_from_row(row)?);
        }
        Ok(records)
    }

    fn update_progress_record(&self, record: &ProgressRecord) -> Fallible<bool> {
        let conn = self.acquire();
        let sql = "update progress set box_position = ?, last_practiced_at = ?, repetitions = ? where learner_id = ? and card_id = ?;";
        let changed = conn.execute(
            sql,
            (
                record.box_position,
                record.last_practiced_at,
                record.repetitions,
                record.learner_id,
                record.card_id,
            ),
        )?;
        Ok(changed > 0)
    }
}

impl CardCatalog for Database {
    fn approved_card_ids(&self, deck: DeckId, filter: TopicFilter) -> Fallible<Vec<CardId>> {
        let conn = self.acquire();
        let (clause, mut params) = filter_clause(filter);
        params.insert(0, deck.into_inner());
        let sql = format!(
            "select c.card_id from cards c where c.deck_id = ? and c.approved = 1{clause} order by c.card_id;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params))?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    fn topic_names(&self, deck: DeckId) -> Fallible<Vec<String>> {
        let conn = self.acquire();
        let mut stmt = conn.prepare("select name from topics where deck_id = ? order by topic_id;")?;
        let mut rows = stmt.query([deck])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get(0)?);
        }
        Ok(names)
    }

    fn topic_name(&self, topic: TopicId) -> Fallible<Option<String>> {
        let conn = self.acquire();
        let mut stmt = conn.prepare("select name from topics where topic_id = ?;")?;
        let mut rows = stmt.query([topic])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }
}

const SELECT_PROGRESS: &str = "select p.learner_id, p.card_id, p.box_position, p.last_practiced_at, p.repetitions, t.name \
     from progress p \
     join cards c on c.card_id = p.card_id \
     left join topics t on t.topic_id = c.topic_id";

fn progress_from_row(row: &rusqlite::Row<'_>) -> Fallible<ProgressRecord> {
    Ok(ProgressRecord {
        learner_id: row.get(0)?,
        card_id: row.get(1)?,
        box_position: row.get(2)?,
        last_practiced_at: row.get(3)?,
        repetitions: row.get(4)?,
        topic_name: row.get(5)?,
    })
}

/// The extra condition on the `cards c` table for a topic filter, and its
/// parameters.
fn filter_clause(filter: TopicFilter) -> (&'static str, Vec<i64>) {
    match filter {
        TopicFilter::All => ("", Vec::new()),
        TopicFilter::Untagged => (" and c.topic_id is null", Vec::new()),
        TopicFilter::Topic(topic) => (" and c.topic_id = ?", vec![topic.into_inner()]),
    }
}

fn count_from_sql(count: i64) -> Fallible<usize> {
    usize::try_from(count).map_err(|_| ErrorReport::new(format!("invalid count: {count}")))
}

fn count_to_sql(count: usize) -> Fallible<i64> {
    i64::try_from(count).map_err(|_| ErrorReport::new(format!("count too large: {count}")))
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}
