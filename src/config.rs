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

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::ids::LearnerId;

pub const DEFAULT_CONFIG_PATH: &str = "cardbox.toml";

#[derive(Clone, PartialEq, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path to the SQLite database.
    #[serde(default = "default_database")]
    pub database: PathBuf,
    /// The learner to act as when a command is not given one.
    #[serde(default)]
    pub learner: Option<LearnerId>,
}

fn default_database() -> PathBuf {
    PathBuf::from("cardbox.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            learner: None,
        }
    }
}

impl Config {
    /// Load the configuration at `path`, or at the default path. A missing
    /// file means the defaults.
    pub fn load(path: Option<&Path>) -> Fallible<Self> {
        let path = path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults.", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Fallible<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Pick the learner from the command line, falling back to the
    /// configured one.
    pub fn learner(&self, learner: Option<LearnerId>) -> Fallible<LearnerId> {
        match learner.or(self.learner) {
            Some(learner) => Ok(learner),
            None => fail("no learner given, and none configured."),
        }
    }

    pub fn database_path(&self) -> Fallible<&str> {
        match self.database.to_str() {
            Some(path) => Ok(path),
            None => fail("invalid database path."),
        }
    }
}
