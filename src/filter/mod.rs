//! # Filter Validation
//!
//! Turns untrusted caller input into sanitized, typed filters.
//!
//! Validators never fail: every problem becomes a `ValidationError` in the
//! returned `FilterValidationResult`, and every applicable validator runs.
//! Callers reject invalid results (`into_sanitized`) before building a
//! query; pagination alone degrades to defaults instead.

mod builder;
mod coerce;
mod composite;
mod errors;
pub mod input;
mod records;
mod result;

pub use builder::FilterBuilder;
pub use coerce::{as_datetime, format_datetime, parse_datetime};
pub use composite::{
    CHAT_SORT_FIELDS, PROVIDER_SORT_FIELDS, REQUEST_SORT_FIELDS, REQUEST_STATUSES,
    REVIEW_SORT_FIELDS, SERVICE_CATEGORIES, SORT_ORDERS, URGENCY_LEVELS, USER_ROLES,
    USER_SORT_FIELDS,
};
pub use errors::{FilterError, FilterResult, ValidationError};
pub use input::from_query_params;
pub use records::{
    ChatSearchFilters, CommonFilters, FromSanitized, ProviderSearchFilters, RequestSearchFilters,
    ReviewSearchFilters, UserSearchFilters,
};
pub use result::{FilterValidationResult, SanitizedFilters};
