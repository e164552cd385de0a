//! sqladvisor-core: SQL review engine
//!
//! This library screens migration scripts against configured review rules
//! and reports findings with stable codes and script line numbers, without
//! requiring a database connection.

pub mod advice;
pub mod advisor;
pub mod ast;
pub mod config;
pub mod dialect;
pub mod error;
pub mod parser;
pub mod sink;
pub mod transaction;
pub mod version;

pub use advice::{Advice, Code, Status};
pub use advisor::registry::Registry;
pub use advisor::rules::RuleType;
pub use advisor::{Advisor, Report, Target, UnsupportedRule};
pub use ast::{ParsedStatement, Tree};
pub use config::{Level, RuleConfig};
pub use dialect::Engine;
pub use error::{AdvisorError, ParseError, UnrecognizedVersionFormat};
pub use parser::parse_script;
pub use sink::{AdviceSink, MemorySink};
pub use transaction::{is_non_transaction_statement, plan_execution, ExecutionPlan};
pub use version::{parse_version, EngineVersion};
