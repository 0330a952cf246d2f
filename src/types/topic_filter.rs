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

use crate::types::ids::TopicId;

/// Restricts a deck session to part of the deck.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TopicFilter {
    /// Every card in the deck.
    #[default]
    All,
    /// Only cards that have no topic.
    Untagged,
    /// Only cards with the given topic. A topic that does not exist matches
    /// nothing.
    Topic(TopicId),
}
