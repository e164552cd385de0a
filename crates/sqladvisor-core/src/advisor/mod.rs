//! Advisor runner
//!
//! Evaluates every configured rule against a parsed script and merges the
//! findings into one ordered report.

pub mod checker;
pub mod registry;
pub mod rules;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::advice::Advice;
use crate::ast::ParsedStatement;
use crate::config::RuleConfig;
use crate::dialect::Engine;
use crate::error::AdvisorError;
use crate::parser;
use crate::sink::AdviceSink;

use checker::CheckContext;
use registry::{Registration, Registry};
use rules::RuleType;

/// The engine a script targets, with the raw version it reports if known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    pub engine: Engine,
    pub version: Option<&'a str>,
}

impl<'a> Target<'a> {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            version: None,
        }
    }

    pub fn with_version(mut self, version: &'a str) -> Self {
        self.version = Some(version);
        self
    }
}

impl From<Engine> for Target<'_> {
    fn from(engine: Engine) -> Self {
        Self::new(engine)
    }
}

/// A configured rule that has no checker on the target engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedRule {
    pub engine: Engine,
    pub rule_type: String,
}

impl From<UnsupportedRule> for AdvisorError {
    fn from(rule: UnsupportedRule) -> Self {
        AdvisorError::UnsupportedRule {
            engine: rule.engine,
            rule_type: rule.rule_type,
        }
    }
}

/// Result of one advisor run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Findings sorted by line, then by rule registration order
    pub advice: Vec<Advice>,
    /// Rules that were skipped because the engine has no checker for them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unsupported: Vec<UnsupportedRule>,
}

impl Report {
    /// Fail on the first unsupported rule instead of skipping it
    pub fn into_strict(self) -> Result<Vec<Advice>, AdvisorError> {
        match self.unsupported.into_iter().next() {
            Some(rule) => Err(rule.into()),
            None => Ok(self.advice),
        }
    }

    /// Highest status among the findings
    pub fn worst_status(&self) -> Option<crate::advice::Status> {
        self.advice.iter().map(|a| a.status).max()
    }

    /// Hand the findings to a sink under `key`
    pub fn record_into(&self, key: &str, sink: &mut impl AdviceSink) {
        sink.record(key, &self.advice);
    }
}

enum RuleOutcome {
    Disabled,
    Unsupported(UnsupportedRule),
    Evaluated { order: usize, advice: Vec<Advice> },
}

/// Runs configured rules over parsed scripts
pub struct Advisor {
    registry: Registry,
}

impl Default for Advisor {
    fn default() -> Self {
        Self::new(Registry::builtin())
    }
}

impl Advisor {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run every configured rule against the statements of one script.
    ///
    /// Rules are evaluated in parallel. A rule that finds nothing contributes
    /// a single OK advice; a disabled rule contributes nothing.
    #[tracing::instrument(skip_all, fields(rules = rules.len()))]
    pub fn check<'t>(
        &self,
        target: impl Into<Target<'t>>,
        statements: &[ParsedStatement],
        rules: &[RuleConfig],
    ) -> Result<Report, AdvisorError> {
        let target = target.into();
        debug!(engine = %target.engine, statements = statements.len(), "checking script");
        let outcomes: Vec<Result<RuleOutcome, AdvisorError>> = rules
            .par_iter()
            .map(|rule| self.evaluate(target, statements, rule))
            .collect();

        let mut ranked = Vec::new();
        let mut unsupported = Vec::new();
        for outcome in outcomes {
            match outcome? {
                RuleOutcome::Disabled => {}
                RuleOutcome::Unsupported(rule) => unsupported.push(rule),
                RuleOutcome::Evaluated { order, advice } => {
                    ranked.extend(advice.into_iter().map(|a| (order, a)));
                }
            }
        }

        ranked.sort_by_key(|(order, advice)| (advice.line, *order));
        Ok(Report {
            advice: ranked.into_iter().map(|(_, a)| a).collect(),
            unsupported,
        })
    }

    /// Parse `sql` and check it. A script that cannot be tokenized is
    /// reported as a single syntax-error advice.
    pub fn check_sql<'t>(
        &self,
        target: impl Into<Target<'t>>,
        sql: &str,
        rules: &[RuleConfig],
    ) -> Result<Report, AdvisorError> {
        let target = target.into();
        for rule in rules {
            rule.level()?;
        }
        match parser::parse_script(target.engine, sql) {
            Ok(statements) => self.check(target, &statements, rules),
            Err(e) => {
                debug!(line = e.line, "script does not parse");
                Ok(Report {
                    advice: vec![Advice::syntax_error(&e)],
                    unsupported: Vec::new(),
                })
            }
        }
    }

    fn evaluate(
        &self,
        target: Target<'_>,
        statements: &[ParsedStatement],
        rule: &RuleConfig,
    ) -> Result<RuleOutcome, AdvisorError> {
        let Some(status) = rule.level()?.status() else {
            debug!(rule = %rule.rule_type, "rule disabled");
            return Ok(RuleOutcome::Disabled);
        };

        let Some(Registration { order, factory }) = rule
            .rule_type
            .parse::<RuleType>()
            .ok()
            .and_then(|rule_type| self.registry.lookup(target.engine, rule_type))
        else {
            warn!(rule = %rule.rule_type, engine = %target.engine, "rule not supported, skipping");
            return Ok(RuleOutcome::Unsupported(UnsupportedRule {
                engine: target.engine,
                rule_type: rule.rule_type.clone(),
            }));
        };

        let mut checker = factory();
        let mut ctx = CheckContext::new(target, rule, status);
        checker.begin(&mut ctx)?;
        for statement in statements {
            ctx.enter(statement);
            checker.visit(statement, &mut ctx)?;
        }
        checker.finish(&mut ctx)?;

        let mut advice = ctx.into_advice();
        if advice.is_empty() {
            advice.push(Advice::ok());
        }
        debug!(rule = %rule.rule_type, findings = advice.len(), "rule evaluated");
        Ok(RuleOutcome::Evaluated { order, advice })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{Code, Status};

    #[test]
    fn test_into_strict() {
        let report = Report {
            advice: vec![Advice::ok()],
            unsupported: vec![UnsupportedRule {
                engine: Engine::Postgres,
                rule_type: "column.disallow-zerofill".to_string(),
            }],
        };
        assert!(matches!(
            report.into_strict(),
            Err(AdvisorError::UnsupportedRule { engine: Engine::Postgres, .. })
        ));

        let clean = Report {
            advice: vec![Advice::ok()],
            unsupported: Vec::new(),
        };
        assert_eq!(clean.into_strict().unwrap(), vec![Advice::ok()]);
    }

    #[test]
    fn test_check_sql_surfaces_syntax_error() {
        let advisor = Advisor::default();
        let rules = [RuleConfig::new("column.auto-increment-must-unsigned", "ERROR")];
        let report = advisor
            .check_sql(Engine::MySql, "SELECT 1;\nSELECT 'unterminated", &rules)
            .unwrap();

        assert_eq!(report.advice.len(), 1);
        assert_eq!(report.advice[0].code, Code::StatementSyntaxError);
        assert_eq!(report.advice[0].status, Status::Error);
        assert_eq!(report.advice[0].line, 2);
    }

    #[test]
    fn test_worst_status() {
        let advisor = Advisor::default();
        let rules = [
            RuleConfig::new("column.auto-increment-must-unsigned", "WARNING"),
            RuleConfig::new("column.auto-increment-must-integer", "ERROR"),
        ];
        let report = advisor
            .check_sql(Engine::MySql, "CREATE TABLE t (id INT AUTO_INCREMENT)", &rules)
            .unwrap();
        assert_eq!(report.worst_status(), Some(Status::Warning));
    }
}
