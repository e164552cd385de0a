//! Checker protocol and the column-definition walker
//!
//! A checker is created fresh for every rule evaluation. The runner drives it
//! through `begin`, one `visit` per statement in script order, and `finish`.
//! Findings go into the [`CheckContext`], the accumulator owned by that one
//! evaluation, which the runner consumes afterwards.

use tracing::trace;

use crate::advice::{Advice, Code, Status};
use crate::ast::mysql::{AlterAction, FieldDefinition, Statement, TableElement};
use crate::ast::ParsedStatement;
use crate::config::RuleConfig;
use crate::dialect::Engine;
use crate::error::AdvisorError;
use crate::version::EngineVersion;

use super::Target;

/// Per-rule, per-engine tree visitor
pub trait Checker: Send {
    /// Called once before the first statement
    fn begin(&mut self, _ctx: &mut CheckContext<'_>) -> Result<(), AdvisorError> {
        Ok(())
    }

    /// Visit one statement; the context's base line is already set
    fn visit(
        &mut self,
        statement: &ParsedStatement,
        ctx: &mut CheckContext<'_>,
    ) -> Result<(), AdvisorError>;

    /// Called once after the last statement
    fn finish(&mut self, _ctx: &mut CheckContext<'_>) -> Result<(), AdvisorError> {
        Ok(())
    }
}

/// Accumulator for one rule evaluation
pub struct CheckContext<'a> {
    target: Target<'a>,
    rule: &'a RuleConfig,
    status: Status,
    base_line: usize,
    advice: Vec<Advice>,
}

impl<'a> CheckContext<'a> {
    pub fn new(target: Target<'a>, rule: &'a RuleConfig, status: Status) -> Self {
        Self {
            target,
            rule,
            status,
            base_line: 0,
            advice: Vec::new(),
        }
    }

    pub fn engine(&self) -> Engine {
        self.target.engine
    }

    /// Raw engine version, when the caller supplied one
    pub fn engine_version(&self) -> Option<&'a str> {
        self.target.version
    }

    /// Engine version normalized for comparisons; `None` when unknown
    pub fn parsed_engine_version(&self) -> Result<Option<EngineVersion>, AdvisorError> {
        match self.target.version {
            Some(raw) => Ok(Some(EngineVersion::parse(raw)?)),
            None => Ok(None),
        }
    }

    pub fn rule(&self) -> &'a RuleConfig {
        self.rule
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn base_line(&self) -> usize {
        self.base_line
    }

    pub(super) fn enter(&mut self, statement: &ParsedStatement) {
        self.base_line = statement.base_line;
    }

    /// Record a finding at a line of the current statement (1-indexed)
    pub fn report(&mut self, code: Code, content: impl Into<String>, line_in_statement: usize) {
        let line = self.base_line + line_in_statement;
        self.report_at(code, content, line);
    }

    /// Record a finding at an absolute script line
    pub fn report_at(&mut self, code: Code, content: impl Into<String>, line: usize) {
        self.advice.push(Advice {
            status: self.status,
            code,
            title: self.rule.title().to_string(),
            content: content.into(),
            line,
        });
    }

    /// Build a structural contract violation for the current statement
    pub fn malformed(&self, line_in_statement: usize, message: impl Into<String>) -> AdvisorError {
        AdvisorError::MalformedTree {
            rule_type: self.rule.rule_type.clone(),
            line: self.base_line + line_in_statement,
            message: message.into(),
        }
    }

    pub fn invalid_configuration(&self, message: impl Into<String>) -> AdvisorError {
        AdvisorError::InvalidConfiguration {
            rule_type: self.rule.rule_type.clone(),
            message: message.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.advice.is_empty()
    }

    pub fn into_advice(self) -> Vec<Advice> {
        self.advice
    }
}

/// A column definition found in a CREATE TABLE or ALTER TABLE statement
#[derive(Debug, Clone, Copy)]
pub struct ColumnSite<'t> {
    pub table: &'t str,
    pub column: &'t str,
    pub field: &'t FieldDefinition,
}

/// Rule logic applied to every column definition of a MySQL-family script
pub trait ColumnRule: Send {
    /// Decide once per evaluation whether the rule applies at all
    fn begin(&mut self, _ctx: &mut CheckContext<'_>) -> Result<bool, AdvisorError> {
        Ok(true)
    }

    fn check_column(&mut self, site: &ColumnSite<'_>, ctx: &mut CheckContext<'_>);
}

/// Adapts a [`ColumnRule`] into a [`Checker`] over the MySQL tree
pub struct ColumnChecker<R> {
    rule: R,
    active: bool,
}

impl<R: ColumnRule> ColumnChecker<R> {
    pub fn new(rule: R) -> Self {
        Self { rule, active: true }
    }
}

impl<R: ColumnRule> Checker for ColumnChecker<R> {
    fn begin(&mut self, ctx: &mut CheckContext<'_>) -> Result<(), AdvisorError> {
        self.active = self.rule.begin(ctx)?;
        Ok(())
    }

    fn visit(
        &mut self,
        statement: &ParsedStatement,
        ctx: &mut CheckContext<'_>,
    ) -> Result<(), AdvisorError> {
        if !self.active {
            return Ok(());
        }
        let Some(tree) = statement.tree.as_mysql() else {
            return Err(ctx.malformed(
                1,
                format!("expected a mysql tree, got {}", statement.tree.kind()),
            ));
        };

        let mut sites = Vec::new();
        walk_column_definitions(tree, |site| sites.push(site))
            .map_err(|m| ctx.malformed(m.line, m.message))?;
        for site in &sites {
            self.rule.check_column(site, ctx);
        }
        Ok(())
    }
}

/// A field definition that violates the parser's line contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedNode {
    pub line: usize,
    pub message: &'static str,
}

/// Visit every complete column definition of a statement in textual order.
///
/// Incomplete pieces (no table name, no element list, an action without a
/// field definition or data type) are skipped.
pub fn walk_column_definitions<'t>(
    statement: &'t Statement,
    mut visit: impl FnMut(ColumnSite<'t>),
) -> Result<(), MalformedNode> {
    match statement {
        Statement::CreateTable(create) => {
            let (Some(table), Some(elements)) = (&create.name, &create.elements) else {
                trace!(line = create.line, "create table without name or element list");
                return Ok(());
            };
            walk_elements(&table.name, elements, &mut visit)
        }
        Statement::AlterTable(alter) => {
            let (Some(table), Some(actions)) = (&alter.table, &alter.actions) else {
                trace!(line = alter.line, "alter table without name or actions");
                return Ok(());
            };
            for action in actions {
                match action {
                    AlterAction::AddColumn {
                        column: Some(column),
                        field: Some(field),
                        ..
                    }
                    | AlterAction::ModifyColumn {
                        column: Some(column),
                        field: Some(field),
                        ..
                    } => visit_field(&table.name, &column.value, field, &mut visit)?,
                    AlterAction::ChangeColumn {
                        column: Some(_),
                        new_name: Some(new_name),
                        field: Some(field),
                        ..
                    } => visit_field(&table.name, &new_name.value, field, &mut visit)?,
                    AlterAction::AddColumns {
                        elements: Some(elements),
                        ..
                    } => walk_elements(&table.name, elements, &mut visit)?,
                    AlterAction::AddColumn { line, .. }
                    | AlterAction::AddColumns { line, .. }
                    | AlterAction::ChangeColumn { line, .. }
                    | AlterAction::ModifyColumn { line, .. } => {
                        trace!(line, "skipping incomplete alter action");
                    }
                    AlterAction::Other { .. } => {}
                }
            }
            Ok(())
        }
        Statement::Other { .. } => Ok(()),
    }
}

fn walk_elements<'t>(
    table: &'t str,
    elements: &'t [TableElement],
    visit: &mut impl FnMut(ColumnSite<'t>),
) -> Result<(), MalformedNode> {
    for element in elements {
        let Some(column) = element.column_definition() else {
            continue;
        };
        let (Some(name), Some(field)) = (&column.name, &column.field) else {
            trace!("skipping incomplete column definition");
            continue;
        };
        visit_field(table, &name.value, field, visit)?;
    }
    Ok(())
}

fn visit_field<'t>(
    table: &'t str,
    column: &'t str,
    field: &'t FieldDefinition,
    visit: &mut impl FnMut(ColumnSite<'t>),
) -> Result<(), MalformedNode> {
    if field.line == 0 {
        return Err(MalformedNode {
            line: 0,
            message: "field definition without a source line",
        });
    }
    if field.data_type.is_none() {
        trace!(table, column, "skipping field definition without data type");
        return Ok(());
    }
    visit(ColumnSite {
        table,
        column,
        field,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::mysql::{
        AlterTable, ColumnDefinition, CreateTable, DataType, FieldOptions, Identifier, TableName,
    };

    fn field(name: &str, line: usize) -> FieldDefinition {
        FieldDefinition {
            data_type: Some(DataType {
                name: name.to_string(),
                args: Vec::new(),
                options: FieldOptions::default(),
                line,
            }),
            attributes: Vec::new(),
            line,
        }
    }

    fn column(name: &str, line: usize) -> TableElement {
        TableElement::Column(ColumnDefinition {
            name: Some(Identifier::new(name, line)),
            field: Some(field("INT", line)),
        })
    }

    fn collect(statement: &Statement) -> Result<Vec<(String, usize)>, MalformedNode> {
        let mut seen = Vec::new();
        walk_column_definitions(statement, |site| {
            seen.push((format!("{}.{}", site.table, site.column), site.field.line))
        })?;
        Ok(seen)
    }

    #[test]
    fn test_walks_alter_actions_in_order() {
        let stmt = Statement::AlterTable(AlterTable {
            table: Some(TableName::new("t")),
            actions: Some(vec![
                AlterAction::AddColumn {
                    column: Some(Identifier::new("a", 1)),
                    field: Some(field("INT", 1)),
                    line: 1,
                },
                AlterAction::ChangeColumn {
                    column: Some(Identifier::new("b", 2)),
                    new_name: None,
                    field: None,
                    line: 2,
                },
                AlterAction::AddColumns {
                    elements: Some(vec![column("c", 3), column("d", 4)]),
                    line: 3,
                },
                AlterAction::ChangeColumn {
                    column: Some(Identifier::new("e", 5)),
                    new_name: Some(Identifier::new("f", 5)),
                    field: Some(field("BIGINT", 5)),
                    line: 5,
                },
                AlterAction::Other { line: 6 },
            ]),
            line: 1,
        });

        assert_eq!(
            collect(&stmt).unwrap(),
            vec![
                ("t.a".to_string(), 1),
                ("t.c".to_string(), 3),
                ("t.d".to_string(), 4),
                ("t.f".to_string(), 5),
            ]
        );
    }

    #[test]
    fn test_skips_missing_structure() {
        let no_elements = Statement::CreateTable(CreateTable {
            name: Some(TableName::new("t")),
            elements: None,
            line: 1,
        });
        let no_name = Statement::CreateTable(CreateTable {
            name: None,
            elements: Some(vec![column("a", 1)]),
            line: 1,
        });
        let untyped = Statement::CreateTable(CreateTable {
            name: Some(TableName::new("t")),
            elements: Some(vec![
                TableElement::Column(ColumnDefinition {
                    name: Some(Identifier::new("a", 1)),
                    field: Some(FieldDefinition {
                        data_type: None,
                        attributes: Vec::new(),
                        line: 1,
                    }),
                }),
                TableElement::Constraint { line: 2 },
                column("b", 3),
            ]),
            line: 1,
        });

        assert!(collect(&no_elements).unwrap().is_empty());
        assert!(collect(&no_name).unwrap().is_empty());
        assert_eq!(collect(&untyped).unwrap(), vec![("t.b".to_string(), 3)]);
    }

    #[test]
    fn test_parsed_engine_version() {
        let rule = RuleConfig::new("column.disallow-zerofill", "WARNING");

        let ctx = CheckContext::new(Target::new(Engine::MySql), &rule, Status::Warning);
        assert_eq!(ctx.parsed_engine_version().unwrap(), None);

        let target = Target::new(Engine::MySql).with_version("8.0.27-log");
        let ctx = CheckContext::new(target, &rule, Status::Warning);
        assert_eq!(
            ctx.parsed_engine_version().unwrap().map(|v| v.canonical()),
            Some("8.0.27".to_string())
        );

        let target = Target::new(Engine::MySql).with_version("nightly");
        let ctx = CheckContext::new(target, &rule, Status::Warning);
        assert!(matches!(
            ctx.parsed_engine_version(),
            Err(AdvisorError::UnrecognizedVersionFormat(e)) if e.raw == "nightly"
        ));
    }

    #[test]
    fn test_zero_line_is_malformed() {
        let stmt = Statement::CreateTable(CreateTable {
            name: Some(TableName::new("t")),
            elements: Some(vec![column("a", 0)]),
            line: 1,
        });
        assert!(collect(&stmt).is_err());
    }
}
