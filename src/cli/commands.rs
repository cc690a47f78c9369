//! CLI command implementations
//!
//! Each command reads one filter object, validates it for the chosen
//! entity, and prints a single JSON response. Invalid filters are rejected
//! before anything is compiled.

use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::config::QueryConfig;
use crate::executor::{MemoryStore, PlanExecutor};
use crate::filter::{
    ChatSearchFilters, FilterBuilder, FilterValidationResult, FromSanitized,
    ProviderSearchFilters, RequestSearchFilters, ReviewSearchFilters, UserSearchFilters,
};
use crate::query::{QueryCompiler, QueryPlan};

use super::args::{Cli, Command, Entity};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_response};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}

/// Run a parsed command line
pub fn run_command(cli: Cli) -> CliResult<()> {
    let builder = FilterBuilder::with_config(load_config(cli.config.as_deref())?);

    match cli.command {
        Command::Validate { entity } => validate(&builder, entity),
        Command::Compile { entity } => compile(&builder, entity),
        Command::Explain { entity } => explain(&builder, entity),
        Command::Query { entity, data } => query(&builder, entity, &data),
    }
}

/// Load the config file, or defaults when no path is given
pub fn load_config(path: Option<&Path>) -> CliResult<QueryConfig> {
    match path {
        Some(path) => Ok(QueryConfig::load(path)?),
        None => {
            let config = QueryConfig::default();
            config.apply_log_level();
            Ok(config)
        }
    }
}

/// Print the validation result for stdin filters
pub fn validate(builder: &FilterBuilder, entity: Entity) -> CliResult<()> {
    let input = read_request()?;
    let result = validate_filters(builder, entity, &input);
    write_response(serde_json::to_value(&result)?)
}

/// Print the compiled plan for stdin filters
pub fn compile(builder: &FilterBuilder, entity: Entity) -> CliResult<()> {
    let input = read_request()?;
    let plan = compile_plan(builder, entity, &input)?;
    write_response(serde_json::to_value(&plan)?)
}

/// Print the explain output for stdin filters
pub fn explain(builder: &FilterBuilder, entity: Entity) -> CliResult<()> {
    let input = read_request()?;
    let explain = compile_plan(builder, entity, &input)?.explain();
    write_response(json!({
        "text": explain.to_string(),
        "explain": serde_json::to_value(&explain)?,
    }))
}

/// Run stdin filters against documents from `data_path`
pub fn query(builder: &FilterBuilder, entity: Entity, data_path: &Path) -> CliResult<()> {
    let input = read_request()?;
    let plan = compile_plan(builder, entity, &input)?;

    let content = fs::read_to_string(data_path).map_err(|e| {
        CliError::io_error(format!("Failed to read {}: {}", data_path.display(), e))
    })?;
    let store = MemoryStore::from_json(serde_json::from_str(&content)?)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))?;
    let page = rt.block_on(store.execute(entity.collection(), &plan))?;
    write_response(serde_json::to_value(&page)?)
}

/// Run the entity's composite validator
pub fn validate_filters(
    builder: &FilterBuilder,
    entity: Entity,
    input: &Map<String, Value>,
) -> FilterValidationResult {
    match entity {
        Entity::Provider => builder.validate_provider_search(input),
        Entity::Request => builder.validate_request_search(input),
        Entity::Review => builder.validate_review_search(input),
        Entity::User => builder.validate_user_search(input),
        Entity::Chat => builder.validate_chat_search(input),
    }
}

/// Validate, reject if invalid, then build the entity's recipe plan
pub fn compile_plan(
    builder: &FilterBuilder,
    entity: Entity,
    input: &Map<String, Value>,
) -> CliResult<QueryPlan> {
    let sanitized = validate_filters(builder, entity, input).into_sanitized()?;
    let mut compiler = QueryCompiler::new();

    match entity {
        Entity::Provider => {
            compiler.for_provider_search(&ProviderSearchFilters::from_sanitized(&sanitized)?)
        }
        Entity::Request => {
            compiler.for_request_search(&RequestSearchFilters::from_sanitized(&sanitized)?)
        }
        Entity::Review => {
            compiler.for_review_search(&ReviewSearchFilters::from_sanitized(&sanitized)?)
        }
        Entity::User => compiler.for_user_search(&UserSearchFilters::from_sanitized(&sanitized)?),
        Entity::Chat => compiler.for_chat_search(&ChatSearchFilters::from_sanitized(&sanitized)?),
    };

    Ok(compiler.compile())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use crate::query::{Constraint, RangeBounds};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {}", other),
        }
    }

    #[test]
    fn test_compile_plan_provider() {
        let input = object(json!({"minRating": 4}));
        let plan = compile_plan(&FilterBuilder::new(), Entity::Provider, &input).unwrap();

        assert_eq!(plan.predicates().len(), 1);
        assert_eq!(
            plan.predicates().get("rating"),
            Some(&Constraint::Range(RangeBounds::new(Some(json!(4.0)), None)))
        );
        assert_eq!(plan.pagination().skip, 0);
        assert_eq!(plan.pagination().limit, Some(10));
    }

    #[test]
    fn test_compile_plan_rejects_invalid() {
        let input = object(json!({"status": "lost"}));
        let err = compile_plan(&FilterBuilder::new(), Entity::Request, &input).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ValidationFailed);

        let input = object(json!({"page": "2", "limit": "200", "minRating": 4}));
        let err = compile_plan(&FilterBuilder::new(), Entity::Provider, &input).unwrap_err();
        assert!(err.message().contains("Limit must be an integer between 1 and 100"));
    }

    #[test]
    fn test_validate_filters_dispatch() {
        let input = object(json!({"role": "admin", "isActive": "true"}));
        let result = validate_filters(&FilterBuilder::new(), Entity::User, &input);
        assert!(result.is_valid);
        assert_eq!(result.sanitized.get("isActive"), Some(&json!(true)));
    }

    #[test]
    fn test_load_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"max_limit": 50, "default_limit": 5}}"#).unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.max_limit, 50);
        assert_eq!(load_config(None).unwrap(), QueryConfig::default());

        let mut bad = NamedTempFile::new().unwrap();
        writeln!(bad, r#"{{"max_limit": 0}}"#).unwrap();
        assert_eq!(
            load_config(Some(bad.path())).unwrap_err().code(),
            &CliErrorCode::ConfigError
        );
    }
}
