//! hubquery - query layer for a service marketplace backend
//!
//! Validates untrusted filter input, compiles it into backend-agnostic
//! query and aggregation plans, and runs those plans through the
//! `PlanExecutor` contract.

pub mod aggregation;
pub mod cli;
pub mod config;
pub mod executor;
pub mod filter;
pub mod observability;
pub mod query;
