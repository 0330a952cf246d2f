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

use std::fmt::Display;
use std::fmt::Formatter;

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

/// The number of boxes, including the new box and the mastered box.
pub const BOX_COUNT: usize = 7;

/// A card's position in a learner's Leitner system.
///
/// Box 0 holds cards that were never answered, boxes 1 through 5 are the
/// active repetition boxes, and box 6 holds mastered cards, which are no
/// longer scheduled.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
#[serde(transparent)]
pub struct BoxPosition(u8);

impl BoxPosition {
    pub const NEW: BoxPosition = BoxPosition(0);
    pub const FIRST: BoxPosition = BoxPosition(1);
    pub const SECOND: BoxPosition = BoxPosition(2);
    pub const MASTERED: BoxPosition = BoxPosition(6);

    pub fn new(position: u8) -> Fallible<Self> {
        if usize::from(position) < BOX_COUNT {
            Ok(Self(position))
        } else {
            fail(format!("invalid box position: {position}"))
        }
    }

    /// All box positions, lowest first.
    pub fn all() -> impl Iterator<Item = BoxPosition> {
        (0..BOX_COUNT as u8).map(BoxPosition)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn is_new(self) -> bool {
        self == Self::NEW
    }

    pub fn is_mastered(self) -> bool {
        self == Self::MASTERED
    }

    /// The box a card moves to after a correct answer. Saturates at the
    /// mastered box.
    pub fn promoted(self) -> BoxPosition {
        if self.is_new() {
            Self::SECOND
        } else {
            BoxPosition((self.0 + 1).min(Self::MASTERED.0))
        }
    }
}

impl Display for BoxPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for BoxPosition {
    type Error = ErrorReport;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(position) => BoxPosition::new(position),
            Err(_) => fail(format!("invalid box position: {value}")),
        }
    }
}

impl ToSql for BoxPosition {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.0)))
    }
}

impl FromSql for BoxPosition {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let position: i64 = FromSql::column_result(value)?;
        BoxPosition::try_from(position).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        assert!(BoxPosition::new(0).is_ok());
        assert!(BoxPosition::new(6).is_ok());
        assert!(BoxPosition::new(7).is_err());
        assert!(BoxPosition::try_from(-1).is_err());
    }

    #[test]
    fn test_all() {
        let all: Vec<u8> = BoxPosition::all().map(|b| b.value()).collect();
        assert_eq!(all, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_promoted() -> Fallible<()> {
        assert_eq!(BoxPosition::NEW.promoted(), BoxPosition::SECOND);
        assert_eq!(BoxPosition::FIRST.promoted(), BoxPosition::SECOND);
        assert_eq!(BoxPosition::new(3)?.promoted(), BoxPosition::new(4)?);
        assert_eq!(BoxPosition::new(5)?.promoted(), BoxPosition::MASTERED);
        assert_eq!(BoxPosition::MASTERED.promoted(), BoxPosition::MASTERED);
        Ok(())
    }
}
