//! Query compilation subsystem for hubquery
//!
//! Builds backend-agnostic query plans from sanitized filters.
//!
//! # Compilation Flow
//!
//! 1. Recipe (or caller) adds predicates, one per present filter field
//! 2. Sort keys merge, last write per field wins
//! 3. Pagination is set from the requested page
//! 4. `compile()` snapshots the state into a `QueryPlan`
//!
//! # Invariants
//!
//! - Top-level field names are unique; ranges merge, others replace
//! - Geo radii are stored in meters, converted once when added
//! - Compiling never mutates the compiler

mod compiler;
mod page;
mod params;
mod plan;
mod predicate;
mod recipes;
mod sort;

pub use compiler::QueryCompiler;
pub use page::{Page, PageRequest, Pagination};
pub use params::{DateRange, GeoQuery, TextSearch, METERS_PER_KM};
pub use plan::{ExplainPlan, QueryPlan};
pub use predicate::{Constraint, GeoCircle, Predicate, PredicateTree, RangeBounds};
pub use recipes::{chat_default_sort, created_default_sort, provider_default_sort};
pub use sort::{SortDirection, SortField, SortSpec};
