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

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

use crate::cmd::OutputFormat;
use crate::cmd::answer::record_answer;
use crate::cmd::catalog::add_card;
use crate::cmd::catalog::add_topic;
use crate::cmd::catalog::approve_card;
use crate::cmd::catalog::delete_card;
use crate::cmd::select::SelectOptions;
use crate::cmd::select::print_selection;
use crate::cmd::session::SessionInput;
use crate::cmd::session::log_session;
use crate::cmd::session::print_history;
use crate::cmd::stats::print_deck_stats;
use crate::cmd::status::print_status;
use crate::config::Config;
use crate::db::Database;
use crate::error::Fallible;
use crate::types::ids::CardId;
use crate::types::ids::DeckId;
use crate::types::ids::LearnerId;
use crate::types::ids::TopicId;
use crate::types::timestamp::Timestamp;
use crate::types::topic_filter::TopicFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage a deck's topics.
    Topic {
        #[command(subcommand)]
        command: TopicCommand,
    },
    /// Manage a deck's cards.
    Card {
        #[command(subcommand)]
        command: CardCommand,
    },
    /// Show how a learner's cards are spread over the boxes.
    Status {
        #[arg(long)]
        deck: DeckId,
        #[arg(long)]
        learner: Option<LearnerId>,
        #[command(flatten)]
        topic: TopicArgs,
        /// Output format.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the cards to practice next, one id per line.
    Select {
        #[arg(long)]
        deck: DeckId,
        #[arg(long)]
        learner: Option<LearnerId>,
        /// Rank cards in this topic first.
        #[arg(long)]
        priority_topic: Option<TopicId>,
        #[command(flatten)]
        topic: TopicArgs,
        /// Leave out cards that are not due yet.
        #[arg(long)]
        due_only: bool,
        /// The maximum number of cards. Zero means a full session.
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },
    /// Record an answer to a card.
    Answer {
        #[arg(long)]
        learner: Option<LearnerId>,
        card: CardId,
        #[command(flatten)]
        outcome: OutcomeArgs,
    },
    /// Show the box distribution of a deck across all learners.
    Stats {
        #[arg(long)]
        deck: DeckId,
        /// Output format.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Log and list practice sessions.
    Session {
        #[command(subcommand)]
        command: SessionCommand,
    },
}

#[derive(Subcommand)]
enum TopicCommand {
    /// Add a topic to a deck.
    Add {
        #[arg(long)]
        deck: DeckId,
        name: String,
    },
}

#[derive(Subcommand)]
enum CardCommand {
    /// Add a card to a deck.
    Add {
        #[arg(long)]
        deck: DeckId,
        #[arg(long)]
        topic: Option<TopicId>,
        /// Make the card visible to learners right away.
        #[arg(long)]
        approved: bool,
    },
    /// Make a card visible to learners.
    Approve { card: CardId },
    /// Delete a card and all progress on it.
    Delete { card: CardId },
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Record a finished session.
    Add {
        #[arg(long)]
        deck: DeckId,
        #[arg(long)]
        learner: Option<LearnerId>,
        /// RFC 3339 start time.
        #[arg(long)]
        started: Timestamp,
        /// RFC 3339 end time.
        #[arg(long)]
        ended: Timestamp,
        #[arg(long)]
        cards: usize,
        #[arg(long)]
        correct: usize,
    },
    /// List a learner's sessions on a deck.
    List {
        #[arg(long)]
        deck: DeckId,
        #[arg(long)]
        learner: Option<LearnerId>,
        /// Output format.
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Args)]
#[group(multiple = false)]
struct TopicArgs {
    /// Only cards in this topic.
    #[arg(long)]
    only_topic: Option<TopicId>,
    /// Only cards without a topic.
    #[arg(long)]
    untagged: bool,
}

impl TopicArgs {
    fn filter(&self) -> TopicFilter {
        match (self.only_topic, self.untagged) {
            (Some(topic), _) => TopicFilter::Topic(topic),
            (None, true) => TopicFilter::Untagged,
            (None, false) => TopicFilter::All,
        }
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct OutcomeArgs {
    #[arg(long)]
    correct: bool,
    #[arg(long)]
    wrong: bool,
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let db = Database::new(config.database_path()?)?;
    match cli.command {
        Command::Topic { command } => match command {
            TopicCommand::Add { deck, name } => {
                add_topic(&db, deck, &name)?;
            }
        },
        Command::Card { command } => match command {
            CardCommand::Add {
                deck,
                topic,
                approved,
            } => {
                add_card(&db, deck, topic, approved)?;
            }
            CardCommand::Approve { card } => approve_card(&db, card)?,
            CardCommand::Delete { card } => delete_card(&db, card)?,
        },
        Command::Status {
            deck,
            learner,
            topic,
            format,
        } => {
            let learner = config.learner(learner)?;
            print_status(&db, learner, deck, topic.filter(), format)?;
        }
        Command::Select {
            deck,
            learner,
            priority_topic,
            topic,
            due_only,
            limit,
        } => {
            let learner = config.learner(learner)?;
            let options = SelectOptions {
                priority_topic,
                filter: topic.filter(),
                due_only,
                limit,
            };
            print_selection(&db, learner, deck, &options)?;
        }
        Command::Answer {
            learner,
            card,
            outcome,
        } => {
            let learner = config.learner(learner)?;
            record_answer(&db, learner, card, outcome.correct && !outcome.wrong)?;
        }
        Command::Stats { deck, format } => {
            print_deck_stats(&db, deck, format)?;
        }
        Command::Session { command } => match command {
            SessionCommand::Add {
                deck,
                learner,
                started,
                ended,
                cards,
                correct,
            } => {
                let learner = config.learner(learner)?;
                let input = SessionInput {
                    started_at: started,
                    ended_at: ended,
                    card_count: cards,
                    correct_count: correct,
                };
                log_session(&db, learner, deck, &input)?;
            }
            SessionCommand::List {
                deck,
                learner,
                format,
            } => {
                let learner = config.learner(learner)?;
                print_history(&db, learner, deck, format)?;
            }
        },
    }
    Ok(())
}
