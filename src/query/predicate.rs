//! Predicate AST
//!
//! A `PredicateTree` is an ordered list of predicates combined with AND.
//! Field names are unique at the top level: setting a field again
//! replaces its constraint in place, except ranges, which merge bounds.
//! `Or`/`And` groups carry nested trees and may repeat.

use serde::Serialize;
use serde_json::Value;

/// Inclusive range bounds; either side may be open
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RangeBounds {
    pub min: Option<Value>,
    pub max: Option<Value>,
}

impl RangeBounds {
    pub fn new(min: Option<Value>, max: Option<Value>) -> Self {
        Self { min, max }
    }

    /// Overwrite only the bounds `other` supplies
    pub fn merge(&mut self, other: RangeBounds) {
        if other.min.is_some() {
            self.min = other.min;
        }
        if other.max.is_some() {
            self.max = other.max;
        }
    }

    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// A circle on the globe; the radius is already in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCircle {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

/// Constraint on a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// field == value
    Equals(Value),
    /// field != value
    NotEquals(Value),
    /// field is one of the values
    In(Vec<Value>),
    /// min <= field <= max
    Range(RangeBounds),
    /// field matches the pattern
    Regex {
        pattern: String,
        case_sensitive: bool,
    },
    /// field is (or is not) present
    Exists(bool),
    /// array field contains the value
    ArrayContains(Value),
    /// array field has exactly n elements
    ArraySize(usize),
    /// point field lies within the circle
    GeoNear(GeoCircle),
}

impl Constraint {
    /// Operation name for explain output
    pub fn op_name(&self) -> &'static str {
        match self {
            Constraint::Equals(_) => "eq",
            Constraint::NotEquals(_) => "ne",
            Constraint::In(_) => "in",
            Constraint::Range(_) => "range",
            Constraint::Regex { .. } => "regex",
            Constraint::Exists(_) => "exists",
            Constraint::ArrayContains(_) => "contains",
            Constraint::ArraySize(_) => "size",
            Constraint::GeoNear(_) => "near",
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Constraint::Range(_))
    }
}

/// One entry of a predicate tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Constraint on a named field
    Field {
        field: String,
        constraint: Constraint,
    },
    /// At least one nested tree matches
    Or(Vec<PredicateTree>),
    /// Every nested tree matches
    And(Vec<PredicateTree>),
}

impl Predicate {
    /// Field name for field predicates
    pub fn field(&self) -> Option<&str> {
        match self {
            Predicate::Field { field, .. } => Some(field),
            Predicate::Or(_) | Predicate::And(_) => None,
        }
    }
}

/// Ordered set of predicates, combined with AND
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PredicateTree {
    predicates: Vec<Predicate>,
}

impl PredicateTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field constraint. Replaces an existing constraint on the same
    /// field in place; ranges merge into an existing range.
    pub fn set(&mut self, field: impl Into<String>, constraint: Constraint) {
        let field = field.into();
        let existing = self.predicates.iter_mut().find_map(|p| match p {
            Predicate::Field { field: f, constraint } if *f == field => Some(constraint),
            _ => None,
        });

        match (existing, constraint) {
            (Some(Constraint::Range(bounds)), Constraint::Range(incoming)) => bounds.merge(incoming),
            (Some(slot), constraint) => *slot = constraint,
            (None, constraint) => self.predicates.push(Predicate::Field { field, constraint }),
        }
    }

    /// Append an `Or`/`And` group
    pub fn push_group(&mut self, group: Predicate) {
        self.predicates.push(group);
    }

    /// Chainable `set`, for building nested trees
    pub fn with(mut self, field: impl Into<String>, constraint: Constraint) -> Self {
        self.set(field, constraint);
        self
    }

    /// Constraint currently set on a top-level field
    pub fn get(&self, field: &str) -> Option<&Constraint> {
        self.predicates.iter().find_map(|p| match p {
            Predicate::Field { field: f, constraint } if f == field => Some(constraint),
            _ => None,
        })
    }

    /// Top-level field names, in insertion order
    pub fn fields(&self) -> Vec<&str> {
        self.predicates.iter().filter_map(Predicate::field).collect()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn clear(&mut self) {
        self.predicates.clear();
    }
}
