//! Advice: the diagnostics produced by rule checkers

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Outcome status of one advice entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Success => write!(f, "SUCCESS"),
            Status::Warning => write!(f, "WARN"),
            Status::Error => write!(f, "ERROR"),
        }
    }
}

/// Stable diagnostic codes.
///
/// Numbers are part of the wire format: new codes may be added, existing
/// ones are never renumbered or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Code {
    /// 0: Rule evaluated, nothing found
    Ok,
    /// 2: Engine version could not be normalized for a version-gated rule
    UnrecognizedEngineVersion,
    /// 201: Statement could not be parsed
    StatementSyntaxError,
    /// 225: Non-transactional statement mixed with transactional ones
    StatementNonTransactionalMixed,
    /// 410: Auto-increment column is not an integer type
    AutoIncrementColumnNotInteger,
    /// 411: Auto-increment column is signed
    AutoIncrementColumnSigned,
    /// 412: ZEROFILL attribute on a version where it is deprecated
    ColumnZerofillDeprecated,
}

impl Code {
    pub const ALL: [Code; 7] = [
        Code::Ok,
        Code::UnrecognizedEngineVersion,
        Code::StatementSyntaxError,
        Code::StatementNonTransactionalMixed,
        Code::AutoIncrementColumnNotInteger,
        Code::AutoIncrementColumnSigned,
        Code::ColumnZerofillDeprecated,
    ];

    pub fn value(&self) -> u32 {
        match self {
            Code::Ok => 0,
            Code::UnrecognizedEngineVersion => 2,
            Code::StatementSyntaxError => 201,
            Code::StatementNonTransactionalMixed => 225,
            Code::AutoIncrementColumnNotInteger => 410,
            Code::AutoIncrementColumnSigned => 411,
            Code::ColumnZerofillDeprecated => 412,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Code::Ok => "ok",
            Code::UnrecognizedEngineVersion => "unrecognized-engine-version",
            Code::StatementSyntaxError => "statement-syntax-error",
            Code::StatementNonTransactionalMixed => "statement-non-transactional-mixed",
            Code::AutoIncrementColumnNotInteger => "auto-increment-column-not-integer",
            Code::AutoIncrementColumnSigned => "auto-increment-column-signed",
            Code::ColumnZerofillDeprecated => "column-zerofill-deprecated",
        }
    }
}

impl From<Code> for u32 {
    fn from(code: Code) -> Self {
        code.value()
    }
}

impl TryFrom<u32> for Code {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Code::ALL
            .into_iter()
            .find(|code| code.value() == value)
            .ok_or_else(|| format!("unknown advice code {}", value))
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// One finding produced by a rule against a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub status: Status,
    pub code: Code,
    pub title: String,
    pub content: String,
    /// Line number in the whole script (1-indexed, 0 for script-wide advice)
    pub line: usize,
}

impl Advice {
    /// The advice a rule yields when it evaluated the script and found nothing
    pub fn ok() -> Self {
        Self {
            status: Status::Success,
            code: Code::Ok,
            title: "OK".to_string(),
            content: String::new(),
            line: 0,
        }
    }

    /// Surface a parser failure in the same shape as rule findings
    pub fn syntax_error(err: &ParseError) -> Self {
        Self {
            status: Status::Error,
            code: Code::StatementSyntaxError,
            title: "Syntax error".to_string(),
            content: err.message.clone(),
            line: err.line,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == Code::Ok
    }
}
