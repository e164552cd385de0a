//! Built-in review rules

pub mod column;
pub mod statement;

use std::str::FromStr;

use crate::dialect::Engine;

use super::checker::{Checker, ColumnChecker};
use super::registry::Registry;

/// Closed set of rule types known to this build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleType {
    ColumnAutoIncrementMustUnsigned,
    ColumnAutoIncrementMustInteger,
    ColumnDisallowZerofill,
    StatementDisallowMixNonTransactional,
}

impl RuleType {
    pub const ALL: [RuleType; 4] = [
        RuleType::ColumnAutoIncrementMustUnsigned,
        RuleType::ColumnAutoIncrementMustInteger,
        RuleType::ColumnDisallowZerofill,
        RuleType::StatementDisallowMixNonTransactional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::ColumnAutoIncrementMustUnsigned => "column.auto-increment-must-unsigned",
            RuleType::ColumnAutoIncrementMustInteger => "column.auto-increment-must-integer",
            RuleType::ColumnDisallowZerofill => "column.disallow-zerofill",
            RuleType::StatementDisallowMixNonTransactional => {
                "statement.disallow-mix-non-transactional"
            }
        }
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleType::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| format!("unknown rule type '{}'", s))
    }
}

impl std::fmt::Display for RuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const MYSQL_FAMILY: [Engine; 3] = [Engine::MySql, Engine::TiDb, Engine::MariaDb];

fn auto_increment_must_unsigned() -> Box<dyn Checker> {
    Box::new(ColumnChecker::new(column::AutoIncrementMustUnsigned))
}

fn auto_increment_must_integer() -> Box<dyn Checker> {
    Box::new(ColumnChecker::new(column::AutoIncrementMustInteger))
}

fn disallow_zerofill() -> Box<dyn Checker> {
    Box::new(ColumnChecker::new(column::DisallowZerofill))
}

fn disallow_mix_non_transactional() -> Box<dyn Checker> {
    Box::new(statement::DisallowMixNonTransactional::default())
}

/// Register every built-in checker
pub fn register_builtin(registry: &mut Registry) {
    for engine in MYSQL_FAMILY {
        registry.register(
            engine,
            RuleType::ColumnAutoIncrementMustUnsigned,
            auto_increment_must_unsigned,
        );
        registry.register(
            engine,
            RuleType::ColumnAutoIncrementMustInteger,
            auto_increment_must_integer,
        );
    }
    // ZEROFILL deprecation is MySQL-specific
    registry.register(
        Engine::MySql,
        RuleType::ColumnDisallowZerofill,
        disallow_zerofill,
    );
    for engine in Engine::ALL {
        registry.register(
            engine,
            RuleType::StatementDisallowMixNonTransactional,
            disallow_mix_non_transactional,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_type_round_trips_through_str() {
        for rule in RuleType::ALL {
            assert_eq!(rule.as_str().parse::<RuleType>().unwrap(), rule);
        }
        assert!("column.require-default".parse::<RuleType>().is_err());
    }
}
