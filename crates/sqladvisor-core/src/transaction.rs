//! Transaction-safety classification
//!
//! Some statements cannot run inside a transaction block: the engine either
//! rejects them there or commits implicitly. They are recognized by their
//! leading keywords, independent of whatever clauses follow. A statement that
//! matches no entry is reported as transactional, which only means there is
//! no evidence that it is unsafe.

use sqlparser::tokenizer::{Token, Tokenizer};
use tracing::debug;

use crate::dialect::Engine;

/// One position in a leading-keyword pattern
#[derive(Debug, Clone, Copy)]
enum Part {
    Word(&'static str),
    /// Zero or one of the listed words
    Optional(&'static [&'static str]),
}

/// A recognized non-transactional statement shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    /// Display name such as `CREATE INDEX`
    pub name: &'static str,
}

struct Entry {
    engines: &'static [Engine],
    name: &'static str,
    pattern: &'static [Part],
}

const MYSQL_LIKE: &[Engine] = &[Engine::MySql, Engine::MariaDb];
const TIDB: &[Engine] = &[Engine::TiDb];
const POSTGRES: &[Engine] = &[Engine::Postgres];

const REINDEX_TARGETS: &[&str] = &["INDEX", "TABLE", "SCHEMA", "DATABASE", "SYSTEM"];

const SHAPES: &[Entry] = &[
    Entry {
        engines: MYSQL_LIKE,
        name: "CREATE INDEX",
        pattern: &[
            Part::Word("CREATE"),
            Part::Optional(&["UNIQUE", "FULLTEXT", "SPATIAL"]),
            Part::Word("INDEX"),
        ],
    },
    Entry {
        engines: TIDB,
        name: "CREATE INDEX",
        pattern: &[
            Part::Word("CREATE"),
            Part::Optional(&["UNIQUE"]),
            Part::Word("INDEX"),
        ],
    },
    Entry {
        engines: POSTGRES,
        name: "CREATE INDEX CONCURRENTLY",
        pattern: &[
            Part::Word("CREATE"),
            Part::Optional(&["UNIQUE"]),
            Part::Word("INDEX"),
            Part::Word("CONCURRENTLY"),
        ],
    },
    Entry {
        engines: POSTGRES,
        name: "DROP INDEX CONCURRENTLY",
        pattern: &[
            Part::Word("DROP"),
            Part::Word("INDEX"),
            Part::Word("CONCURRENTLY"),
        ],
    },
    Entry {
        engines: POSTGRES,
        name: "REINDEX CONCURRENTLY",
        pattern: &[
            Part::Word("REINDEX"),
            Part::Optional(REINDEX_TARGETS),
            Part::Word("CONCURRENTLY"),
        ],
    },
    Entry {
        engines: POSTGRES,
        name: "CREATE DATABASE",
        pattern: &[Part::Word("CREATE"), Part::Word("DATABASE")],
    },
    Entry {
        engines: POSTGRES,
        name: "DROP DATABASE",
        pattern: &[Part::Word("DROP"), Part::Word("DATABASE")],
    },
    Entry {
        engines: POSTGRES,
        name: "CREATE TABLESPACE",
        pattern: &[Part::Word("CREATE"), Part::Word("TABLESPACE")],
    },
    Entry {
        engines: POSTGRES,
        name: "DROP TABLESPACE",
        pattern: &[Part::Word("DROP"), Part::Word("TABLESPACE")],
    },
    Entry {
        engines: POSTGRES,
        name: "ALTER SYSTEM",
        pattern: &[Part::Word("ALTER"), Part::Word("SYSTEM")],
    },
    Entry {
        engines: POSTGRES,
        name: "VACUUM",
        pattern: &[Part::Word("VACUUM")],
    },
];

/// Longest pattern length, bounds how many leading words are looked at
const MAX_PATTERN: usize = 4;

/// Classify a statement, returning the matched shape when it is
/// non-transactional on `engine`
pub fn classify(engine: Engine, statement: &str) -> Option<Shape> {
    let words = leading_words(engine, statement);
    SHAPES
        .iter()
        .filter(|entry| entry.engines.contains(&engine))
        .find(|entry| matches_pattern(entry.pattern, &words))
        .map(|entry| Shape { name: entry.name })
}

/// Whether `statement` cannot run inside a transaction on `engine`
pub fn is_non_transaction_statement(engine: Engine, statement: &str) -> bool {
    classify(engine, statement).is_some()
}

/// Statements of a script split by how they must be executed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Statements that may share one transaction, in script order
    pub transactional: Vec<String>,
    /// Statements that must run on their own, in script order
    pub non_transactional: Vec<String>,
}

impl ExecutionPlan {
    pub fn is_mixed(&self) -> bool {
        !self.transactional.is_empty() && !self.non_transactional.is_empty()
    }
}

/// Partition statements into a transactional batch and the statements that
/// have to run outside of it
pub fn plan_execution<'a, I>(engine: Engine, statements: I) -> ExecutionPlan
where
    I: IntoIterator<Item = &'a str>,
{
    let mut plan = ExecutionPlan::default();
    for stmt in statements {
        if is_non_transaction_statement(engine, stmt) {
            plan.non_transactional.push(stmt.to_string());
        } else {
            plan.transactional.push(stmt.to_string());
        }
    }
    plan
}

fn matches_pattern(pattern: &[Part], words: &[String]) -> bool {
    let mut i = 0;
    for part in pattern {
        match part {
            Part::Word(expected) => {
                if words.get(i).map(String::as_str) != Some(*expected) {
                    return false;
                }
                i += 1;
            }
            Part::Optional(choices) => {
                if words.get(i).is_some_and(|w| choices.contains(&w.as_str())) {
                    i += 1;
                }
            }
        }
    }
    true
}

/// Upper-cased unquoted words at the start of the statement
fn leading_words(engine: Engine, statement: &str) -> Vec<String> {
    let dialect = engine.parser_dialect();
    match Tokenizer::new(dialect.as_ref(), statement).tokenize() {
        Ok(tokens) => tokens
            .into_iter()
            .filter(|t| !matches!(t, Token::Whitespace(_)))
            .map_while(|t| match t {
                Token::Word(w) if w.quote_style.is_none() => Some(w.value.to_uppercase()),
                _ => None,
            })
            .take(MAX_PATTERN)
            .collect(),
        Err(e) => {
            debug!(error = %e, "tokenizer failed, falling back to plain word split");
            statement
                .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .filter(|w| !w.is_empty())
                .take(MAX_PATTERN)
                .map(str::to_uppercase)
                .collect()
        }
    }
}
