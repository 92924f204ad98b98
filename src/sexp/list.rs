//! Pair-cell list view
//!
//! A list is a `(head, body)` pair with an optional tag. When head and body
//! are both vectors of the same length the list reads as key/value pairs:
//! head holds the names, body the values.

use super::{Expression, Value};

/// Head/body/tag triple
#[derive(Debug, Clone, PartialEq)]
pub struct RList {
    head: Box<Expression>,
    body: Box<Expression>,
    tag: Option<Box<Expression>>,
}

impl RList {
    pub fn new(head: Expression, body: Expression) -> Self {
        Self {
            head: Box::new(head),
            body: Box::new(body),
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: Expression) -> Self {
        self.tag = Some(Box::new(tag));
        self
    }

    pub fn head(&self) -> &Expression {
        &self.head
    }

    pub fn body(&self) -> &Expression {
        &self.body
    }

    pub fn tag(&self) -> Option<&Expression> {
        self.tag.as_deref()
    }

    /// Split into `(head, body, tag)`
    pub fn into_parts(self) -> (Expression, Expression, Option<Expression>) {
        (*self.head, *self.body, self.tag.map(|tag| *tag))
    }

    /// Whether head and body are vectors of equal length.
    ///
    /// Recomputed on every call; lookups below call it themselves.
    pub fn standardize(&self) -> bool {
        self.pairs().is_some()
    }

    /// Body element at `index`, standardized lists only
    pub fn at(&self, index: usize) -> Option<&Expression> {
        let (_, values) = self.pairs()?;
        values.get(index)
    }

    /// Body element whose head entry is the string `key`; first match wins
    pub fn at_key(&self, key: &str) -> Option<&Expression> {
        let (names, values) = self.pairs()?;
        names
            .iter()
            .position(|name| name.as_str() == Some(key))
            .and_then(|index| values.get(index))
    }

    /// Head entries as strings, `None` for entries that are not strings
    pub fn keys(&self) -> Option<Vec<Option<&str>>> {
        let (names, _) = self.pairs()?;
        Some(names.iter().map(Expression::as_str).collect())
    }

    /// Number of key/value pairs, standardized lists only
    pub fn len(&self) -> Option<usize> {
        self.pairs().map(|(names, _)| names.len())
    }

    fn pairs(&self) -> Option<(&[Expression], &[Expression])> {
        match (self.head.value(), self.body.value()) {
            (Value::Vector(names), Value::Vector(values)) if names.len() == values.len() => {
                Some((names, values))
            }
            _ => None,
        }
    }
}
