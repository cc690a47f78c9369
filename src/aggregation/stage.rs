//! Pipeline stage AST

use serde::Serialize;

use crate::query::{PredicateTree, SortSpec};

/// Calendar component extracted from a date field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateUnit {
    Year,
    Month,
    Day,
    Hour,
}

impl DateUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateUnit::Year => "year",
            DateUnit::Month => "month",
            DateUnit::Day => "day",
            DateUnit::Hour => "hour",
        }
    }
}

/// One component of a composite group key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPart {
    /// Value of a document field
    Field(String),
    /// Calendar component of a date field
    DatePart { field: String, unit: DateUnit },
}

/// Grouping key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// Everything in one group
    #[default]
    None,
    /// Group by a single field
    Field(String),
    /// Named parts, emitted as an object key
    Composite(Vec<(String, KeyPart)>),
}

/// Per-group accumulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accumulator {
    Count,
    Avg(String),
    Sum(String),
}

/// Join against another collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupSpec {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    /// Field the joined documents are written to
    pub alias: String,
    /// Emit one row per joined document instead of an array
    pub unwind: bool,
}

impl LookupSpec {
    pub fn new(
        from: impl Into<String>,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            alias: alias.into(),
            unwind: false,
        }
    }

    pub fn unwind(mut self, unwind: bool) -> Self {
        self.unwind = unwind;
        self
    }
}

/// A single pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Match(PredicateTree),
    Group {
        key: GroupKey,
        accumulators: Vec<(String, Accumulator)>,
    },
    Sort(SortSpec),
    Limit(u64),
    Skip(u64),
    Lookup(LookupSpec),
    /// (field, include) pairs
    Project(Vec<(String, bool)>),
    Unwind(String),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "match",
            Stage::Group { .. } => "group",
            Stage::Sort(_) => "sort",
            Stage::Limit(_) => "limit",
            Stage::Skip(_) => "skip",
            Stage::Lookup(_) => "lookup",
            Stage::Project(_) => "project",
            Stage::Unwind(_) => "unwind",
        }
    }
}

/// Ordered pipeline; stages run exactly in this order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct AggregationPlan {
    stages: Vec<Stage>,
}

impl AggregationPlan {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Stage names, in order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
