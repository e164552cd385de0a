//! Error types

use miette::Diagnostic;
use thiserror::Error;

use crate::dialect::Engine;

/// Errors that abort or qualify an advisor run
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum AdvisorError {
    /// No checker is registered for the rule type on this engine
    #[error("rule '{rule_type}' is not supported for engine {engine}")]
    #[diagnostic(
        code(sqladvisor::unsupported_rule),
        help("run `sqladvisor rules` to list the rules registered for each engine")
    )]
    UnsupportedRule { engine: Engine, rule_type: String },

    /// The rule configuration cannot be interpreted
    #[error("invalid configuration for rule '{rule_type}': {message}")]
    #[diagnostic(code(sqladvisor::invalid_configuration))]
    InvalidConfiguration { rule_type: String, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    UnrecognizedVersionFormat(#[from] UnrecognizedVersionFormat),

    /// The tree handed to a checker violates the parser's structural contract
    #[error("malformed syntax tree for rule '{rule_type}' at line {line}: {message}")]
    #[diagnostic(
        code(sqladvisor::malformed_tree),
        help("the parser and the checker disagree on the tree shape; this is a bug")
    )]
    MalformedTree {
        rule_type: String,
        line: usize,
        message: String,
    },
}

/// A version string without a leading `major.minor.patch` triple
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("unrecognized version format: '{raw}'")]
#[diagnostic(
    code(sqladvisor::unrecognized_version),
    help("engine versions must start with a numeric triple such as 8.0.27")
)]
pub struct UnrecognizedVersionFormat {
    pub raw: String,
}

/// Syntax error reported by the parser boundary
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("syntax error at line {line}: {message}")]
#[diagnostic(code(sqladvisor::syntax_error))]
pub struct ParseError {
    pub message: String,
    /// Line number in the script (1-indexed)
    pub line: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }

    /// Create a parse error from a sqlparser tokenizer failure
    pub fn from_tokenizer(err: &sqlparser::tokenizer::TokenizerError) -> Self {
        Self::new(err.message.clone(), err.location.line as usize)
    }
}
