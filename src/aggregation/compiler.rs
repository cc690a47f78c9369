//! # Aggregation Compiler
//!
//! Accumulates pipeline stages in call order. The compiler never
//! reorders or merges stages; the statistics recipes append fixed
//! sequences.

use super::stage::{Accumulator, AggregationPlan, DateUnit, GroupKey, KeyPart, LookupSpec, Stage};
use crate::query::{Constraint, PredicateTree, RangeBounds, SortSpec};
use crate::observability::{log_event, Event};

/// Output name of the count accumulator in recipes
pub const COUNT: &str = "count";
/// Output name of the average accumulator in recipes
pub const AVERAGE: &str = "average";
/// Output name of the sum accumulator in recipes
pub const TOTAL: &str = "total";
/// Key name of the group field inside composite keys
pub const GROUP: &str = "group";

/// Requested statistics for one group stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsSpec {
    /// Adds a daily (year, month, day) bucket of this date field to the key
    pub date_field: Option<String>,
    pub group_by: Option<String>,
    /// Output name of a document count
    pub count_field: Option<String>,
    /// Averaged into `average`
    pub avg_field: Option<String>,
    /// Summed into `total`
    pub sum_field: Option<String>,
}

/// Date components for `date_grouping`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateParts {
    pub year: bool,
    pub month: bool,
    pub day: bool,
    pub hour: bool,
}

impl DateParts {
    /// Year, month and day
    pub fn daily() -> Self {
        Self {
            year: true,
            month: true,
            day: true,
            hour: false,
        }
    }

    fn units(&self) -> Vec<DateUnit> {
        let requested = [
            (self.year, DateUnit::Year),
            (self.month, DateUnit::Month),
            (self.day, DateUnit::Day),
            (self.hour, DateUnit::Hour),
        ];
        requested
            .into_iter()
            .filter(|(on, _)| *on)
            .map(|(_, unit)| unit)
            .collect()
    }
}

/// Pipeline builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationCompiler {
    stages: Vec<Stage>,
}

impl AggregationCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn match_tree(&mut self, predicates: PredicateTree) -> &mut Self {
        self.stages.push(Stage::Match(predicates));
        self
    }

    pub fn group(&mut self, key: GroupKey, accumulators: Vec<(String, Accumulator)>) -> &mut Self {
        self.stages.push(Stage::Group { key, accumulators });
        self
    }

    pub fn sort(&mut self, spec: SortSpec) -> &mut Self {
        self.stages.push(Stage::Sort(spec));
        self
    }

    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.stages.push(Stage::Limit(n));
        self
    }

    pub fn skip(&mut self, n: u64) -> &mut Self {
        self.stages.push(Stage::Skip(n));
        self
    }

    pub fn lookup(&mut self, spec: LookupSpec) -> &mut Self {
        self.stages.push(Stage::Lookup(spec));
        self
    }

    pub fn unwind(&mut self, path: impl Into<String>) -> &mut Self {
        self.stages.push(Stage::Unwind(path.into()));
        self
    }

    pub fn project<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let fields = fields.into_iter().map(|(f, include)| (f.into(), include)).collect();
        self.stages.push(Stage::Project(fields));
        self
    }

    /// One group stage with the requested accumulators
    pub fn statistics(&mut self, spec: &StatisticsSpec) -> &mut Self {
        let key = match (&spec.group_by, &spec.date_field) {
            (None, None) => GroupKey::None,
            (Some(group), None) => GroupKey::Field(group.clone()),
            (group, Some(date)) => {
                let mut parts = Vec::with_capacity(4);
                if let Some(group) = group {
                    parts.push((GROUP.to_string(), KeyPart::Field(group.clone())));
                }
                parts.extend(date_key_parts(date, &DateParts::daily().units()));
                GroupKey::Composite(parts)
            }
        };

        let mut accumulators = Vec::new();
        if let Some(name) = &spec.count_field {
            accumulators.push((name.clone(), Accumulator::Count));
        }
        if let Some(path) = &spec.avg_field {
            accumulators.push((AVERAGE.to_string(), Accumulator::Avg(path.clone())));
        }
        if let Some(path) = &spec.sum_field {
            accumulators.push((TOTAL.to_string(), Accumulator::Sum(path.clone())));
        }
        self.group(key, accumulators)
    }

    /// Count documents per date bucket; no parts requested means daily
    pub fn date_grouping(&mut self, field: &str, parts: DateParts) -> &mut Self {
        let mut units = parts.units();
        if units.is_empty() {
            units = DateParts::daily().units();
        }
        self.group(
            GroupKey::Composite(date_key_parts(field, &units)),
            vec![(COUNT.to_string(), Accumulator::Count)],
        )
    }

    /// Top review groups: providers by average rating
    pub fn top_n(&mut self, min_count: u64, min_average: f64, n: u64) -> &mut Self {
        self.top_n_by("providerId", "rating", min_count, min_average, n)
    }

    /// Group, then threshold the grouped aggregates, then rank and cut.
    /// Always appends exactly four stages.
    pub fn top_n_by(
        &mut self,
        group_by: &str,
        average_of: &str,
        min_count: u64,
        min_average: f64,
        n: u64,
    ) -> &mut Self {
        let thresholds = PredicateTree::new()
            .with(
                COUNT,
                Constraint::Range(RangeBounds::new(Some(min_count.into()), None)),
            )
            .with(
                AVERAGE,
                Constraint::Range(RangeBounds::new(Some(min_average.into()), None)),
            );

        self.group(
            GroupKey::Field(group_by.to_string()),
            vec![
                (COUNT.to_string(), Accumulator::Count),
                (AVERAGE.to_string(), Accumulator::Avg(average_of.to_string())),
            ],
        )
        .match_tree(thresholds)
        .sort(SortSpec::new().desc(AVERAGE).desc(COUNT))
        .limit(n)
    }

    /// Snapshot of the stages so far
    pub fn get_pipeline(&self) -> AggregationPlan {
        let plan = AggregationPlan::new(self.stages.clone());
        log_event(
            Event::AggregationCompiled,
            &[
                ("stages", &plan.len().to_string()),
                ("names", &plan.stage_names().join(",")),
            ],
        );
        plan
    }

    pub fn clear(&mut self) -> &mut Self {
        self.stages.clear();
        self
    }
}

fn date_key_parts(field: &str, units: &[DateUnit]) -> Vec<(String, KeyPart)> {
    units
        .iter()
        .map(|unit| {
            (
                unit.as_str().to_string(),
                KeyPart::DatePart {
                    field: field.to_string(),
                    unit: *unit,
                },
            )
        })
        .collect()
}
