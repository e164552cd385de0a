//! Parser boundary: script text to an ordered list of parsed statements
//!
//! The script is tokenized once with the engine's sqlparser dialect and split
//! on top-level semicolons. Each statement remembers its base line, the
//! zero-based line offset of its first token, so checkers can report lines
//! relative to the whole script.

mod mysql;

use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Token, Tokenizer};
use tracing::debug;

use crate::ast::{ParsedStatement, Tree};
use crate::dialect::Engine;
use crate::error::ParseError;

/// Parse a script into statements in script order
pub fn parse_script(engine: Engine, sql: &str) -> Result<Vec<ParsedStatement>, ParseError> {
    let dialect = engine.parser_dialect();
    let tokens = Tokenizer::new(dialect.as_ref(), sql)
        .tokenize_with_location()
        .map_err(|e| ParseError::from_tokenizer(&e))?;

    let mut statements = Vec::new();
    for chunk in tokens.split(|t| t.token == Token::SemiColon) {
        let Some(first) = chunk.iter().position(|t| is_significant(&t.token)) else {
            continue;
        };
        let last = chunk
            .iter()
            .rposition(|t| is_significant(&t.token))
            .unwrap_or(first);
        let body = &chunk[first..=last];

        let base_line = (body[0].span.start.line as usize).saturating_sub(1);
        let text: String = body.iter().map(|t| t.token.to_string()).collect();

        let tree = if engine.is_mysql_family() {
            let toks: Vec<mysql::Tok> = body
                .iter()
                .filter(|t| is_significant(&t.token))
                .map(|t| mysql::Tok {
                    token: t.token.clone(),
                    line: (t.span.start.line as usize).saturating_sub(base_line),
                })
                .collect();
            Tree::MySql(mysql::build_statement(&toks))
        } else {
            parse_generic(engine, &text, base_line)
        };

        statements.push(ParsedStatement::new(text, base_line, tree));
    }

    debug!(%engine, statements = statements.len(), "parsed script");
    Ok(statements)
}

/// Parse one statement with sqlparser's full statement grammar.
///
/// Statements outside the grammar are kept with an unparsed tree so that
/// text-based checkers still see them.
fn parse_generic(engine: Engine, text: &str, base_line: usize) -> Tree {
    let dialect = engine.parser_dialect();
    match Parser::parse_sql(dialect.as_ref(), text) {
        Ok(mut parsed) if parsed.len() == 1 => Tree::Generic(Box::new(parsed.remove(0))),
        Ok(parsed) => unparsed(
            format!("expected one statement, found {}", parsed.len()),
            base_line,
        ),
        Err(e) => unparsed(e.to_string(), base_line),
    }
}

fn unparsed(reason: String, base_line: usize) -> Tree {
    debug!(line = base_line + 1, %reason, "statement kept without a tree");
    Tree::Unparsed { reason }
}

fn is_significant(token: &Token) -> bool {
    !matches!(token, Token::Whitespace(_) | Token::EOF)
}
