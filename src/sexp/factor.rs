//! Categorical values
//!
//! A factor stores one 0-based level index per case plus the level names.
//! On the wire the indices are 1-based and the names arrive as a vector of
//! string expressions; [`Factor::from_wire`] converts between the two.

use std::fmt;

use super::Expression;

/// Parallel `ids`/`levels` pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Factor {
    ids: Vec<i32>,
    /// `None` where the wire level entry was not a string
    levels: Vec<Option<String>>,
}

impl Factor {
    /// Build from 0-based ids and level names
    pub fn new(ids: Vec<i32>, levels: Vec<String>) -> Self {
        Self {
            ids,
            levels: levels.into_iter().map(Some).collect(),
        }
    }

    /// Build from 1-based wire ids and a vector of level expressions
    pub fn from_wire(ids: &[i32], levels: &[Expression]) -> Self {
        Self {
            ids: ids.iter().map(|id| id - 1).collect(),
            levels: levels
                .iter()
                .map(|level| level.as_str().map(str::to_string))
                .collect(),
        }
    }

    /// Append a case, reusing the level if it already exists
    pub fn add(&mut self, level: &str) {
        let index = match self.levels.iter().position(|l| l.as_deref() == Some(level)) {
            Some(index) => index,
            None => {
                self.levels.push(Some(level.to_string()));
                self.levels.len() - 1
            }
        };
        self.ids.push(index as i32);
    }

    /// Number of cases
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Level name of case `index`
    pub fn at(&self, index: usize) -> Option<&str> {
        let id = *self.ids.get(index)?;
        let level = usize::try_from(id).ok()?;
        self.levels.get(level)?.as_deref()
    }

    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    pub fn levels(&self) -> &[Option<String>] {
        &self.levels
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{levels=(")?;
        for (i, level) in self.levels.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match level {
                Some(name) => write!(f, "\"{}\"", name)?,
                None => f.write_str("null")?,
            }
        }
        f.write_str("),ids=(")?;
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", id)?;
        }
        f.write_str(")}")
    }
}
