//! Sort specification
//!
//! Ordered field → direction list. Re-setting a field overwrites its
//! direction but keeps its original position, so tie-break order is the
//! order fields were first mentioned.

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// A single sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortField {
    pub field: String,
    pub direction: SortDirection,
}

/// Ordered sort keys
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct SortSpec {
    fields: Vec<SortField>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field's direction (last write wins, position kept)
    pub fn set(&mut self, field: impl Into<String>, direction: SortDirection) {
        let field = field.into();
        match self.fields.iter_mut().find(|f| f.field == field) {
            Some(existing) => existing.direction = direction,
            None => self.fields.push(SortField { field, direction }),
        }
    }

    pub fn with(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.set(field, direction);
        self
    }

    pub fn asc(self, field: impl Into<String>) -> Self {
        self.with(field, SortDirection::Asc)
    }

    pub fn desc(self, field: impl Into<String>) -> Self {
        self.with(field, SortDirection::Desc)
    }

    /// Apply every key of `other` in order
    pub fn merge(&mut self, other: SortSpec) {
        for SortField { field, direction } in other.fields {
            self.set(field, direction);
        }
    }

    pub fn direction_of(&self, field: &str) -> Option<SortDirection> {
        self.fields.iter().find(|f| f.field == field).map(|f| f.direction)
    }

    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}
