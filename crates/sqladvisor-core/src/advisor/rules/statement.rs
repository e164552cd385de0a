//! Script-level statement rules

use crate::advice::Code;
use crate::advisor::checker::{CheckContext, Checker};
use crate::ast::ParsedStatement;
use crate::error::AdvisorError;
use crate::transaction;

/// Non-transactional statements must not share a script with transactional ones
#[derive(Debug, Default)]
pub struct DisallowMixNonTransactional {
    /// (script line, shape name) of each non-transactional statement
    non_transactional: Vec<(usize, &'static str)>,
    has_transactional: bool,
}

impl Checker for DisallowMixNonTransactional {
    fn visit(
        &mut self,
        statement: &ParsedStatement,
        ctx: &mut CheckContext<'_>,
    ) -> Result<(), AdvisorError> {
        match transaction::classify(ctx.engine(), &statement.text) {
            Some(shape) => self
                .non_transactional
                .push((statement.first_line(), shape.name)),
            None => self.has_transactional = true,
        }
        Ok(())
    }

    fn finish(&mut self, ctx: &mut CheckContext<'_>) -> Result<(), AdvisorError> {
        if !self.has_transactional {
            return Ok(());
        }
        for (line, shape) in &self.non_transactional {
            ctx.report_at(
                Code::StatementNonTransactionalMixed,
                format!(
                    "{} cannot run inside a transaction; move it to a separate script",
                    shape
                ),
                *line,
            );
        }
        Ok(())
    }
}
