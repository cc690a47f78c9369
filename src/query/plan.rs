//! Compiled query plan and its explain output

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::page::Pagination;
use super::predicate::{Constraint, Predicate, PredicateTree};
use super::sort::SortSpec;

/// Immutable snapshot of a compiler's state. Read it through the accessors:
///
/// ```compile_fail
/// let mut plan = hubquery::query::QueryCompiler::new().compile();
/// plan.pagination.skip = 5;
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QueryPlan {
    pub(crate) predicates: PredicateTree,
    pub(crate) sort: SortSpec,
    pub(crate) pagination: Pagination,
}

impl QueryPlan {
    pub fn predicates(&self) -> &PredicateTree {
        &self.predicates
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn explain(&self) -> ExplainPlan {
        ExplainPlan::from_plan(self)
    }
}

/// Human-readable description of a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainPlan {
    pub predicates: Vec<String>,
    pub sort: Vec<String>,
    pub skip: u64,
    pub limit: Option<u64>,
    pub bounded: bool,
}

impl ExplainPlan {
    pub fn from_plan(plan: &QueryPlan) -> Self {
        Self {
            predicates: plan.predicates.iter().map(describe_predicate).collect(),
            sort: plan
                .sort
                .iter()
                .map(|s| format!("{} {}", s.field, s.direction.as_str()))
                .collect(),
            skip: plan.pagination.skip,
            limit: plan.pagination.limit,
            bounded: plan.pagination.is_bounded(),
        }
    }
}

fn describe_predicate(predicate: &Predicate) -> String {
    match predicate {
        Predicate::Field { field, constraint } => describe_constraint(field, constraint),
        Predicate::Or(branches) => format!("or({})", describe_branches(branches)),
        Predicate::And(branches) => format!("and({})", describe_branches(branches)),
    }
}

fn describe_branches(branches: &[PredicateTree]) -> String {
    branches
        .iter()
        .map(|tree| {
            tree.iter()
                .map(describe_predicate)
                .collect::<Vec<_>>()
                .join(" and ")
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn describe_constraint(field: &str, constraint: &Constraint) -> String {
    let op = constraint.op_name();
    match constraint {
        Constraint::Equals(v) | Constraint::NotEquals(v) | Constraint::ArrayContains(v) => {
            format!("{} {} {}", field, op, v)
        }
        Constraint::In(values) => format!("{} {} {}", field, op, Value::Array(values.clone())),
        Constraint::Range(bounds) => {
            let side = |b: &Option<Value>| b.as_ref().map_or("*".to_string(), Value::to_string);
            format!("{} {} [{}, {}]", field, op, side(&bounds.min), side(&bounds.max))
        }
        Constraint::Regex {
            pattern,
            case_sensitive,
        } => {
            let flags = if *case_sensitive { "" } else { "i" };
            format!("{} {} /{}/{}", field, op, pattern, flags)
        }
        Constraint::Exists(exists) => format!("{} {} {}", field, op, exists),
        Constraint::ArraySize(n) => format!("{} {} {}", field, op, n),
        Constraint::GeoNear(circle) => format!(
            "{} {} ({}, {}) within {} m",
            field, op, circle.latitude, circle.longitude, circle.radius_meters
        ),
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;
        if self.predicates.is_empty() {
            writeln!(f, "Predicates: (none)")?;
        } else {
            writeln!(f, "Predicates:")?;
            for pred in &self.predicates {
                writeln!(f, "  - {}", pred)?;
            }
        }
        if !self.sort.is_empty() {
            writeln!(f, "Sort: {}", self.sort.join(", "))?;
        }
        writeln!(f, "Skip: {}", self.skip)?;
        match self.limit {
            Some(limit) => writeln!(f, "Limit: {}", limit)?,
            None => writeln!(f, "Limit: (unbounded)")?,
        }
        Ok(())
    }
}
