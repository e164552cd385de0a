//! Parsed statement trees handed to rule checkers

pub mod mysql;

/// Dialect-specific tree of one statement
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    /// MySQL family (MySQL, TiDB, MariaDB)
    MySql(mysql::Statement),
    /// Engines parsed with sqlparser's own statement AST
    Generic(Box<sqlparser::ast::Statement>),
    /// Statement the grammar does not cover yet; only its text is usable
    Unparsed { reason: String },
}

impl Tree {
    pub fn as_mysql(&self) -> Option<&mysql::Statement> {
        match self {
            Tree::MySql(stmt) => Some(stmt),
            Tree::Generic(_) | Tree::Unparsed { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Tree::MySql(_) => "mysql",
            Tree::Generic(_) => "generic",
            Tree::Unparsed { .. } => "unparsed",
        }
    }
}

/// One statement of a script together with its position in the script
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    /// Statement text without the terminating semicolon
    pub text: String,
    /// Zero-based line offset of the statement within the script
    pub base_line: usize,
    pub tree: Tree,
}

impl ParsedStatement {
    pub fn new(text: impl Into<String>, base_line: usize, tree: Tree) -> Self {
        Self {
            text: text.into(),
            base_line,
            tree,
        }
    }

    /// Script line of the statement's first token (1-indexed)
    pub fn first_line(&self) -> usize {
        self.base_line + 1
    }
}
