//! Database engine support

use serde::{Deserialize, Serialize};
use sqlparser::dialect::{Dialect, MySqlDialect, PostgreSqlDialect};
use std::str::FromStr;

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    MySql,
    TiDb,
    MariaDb,
    Postgres,
}

impl Engine {
    /// All engines, in display order
    pub const ALL: [Engine; 4] = [
        Engine::MySql,
        Engine::TiDb,
        Engine::MariaDb,
        Engine::Postgres,
    ];

    /// Get the sqlparser dialect used for tokenizing and parsing
    pub fn parser_dialect(&self) -> Box<dyn Dialect> {
        match self {
            Engine::MySql | Engine::TiDb | Engine::MariaDb => Box::new(MySqlDialect {}),
            Engine::Postgres => Box::new(PostgreSqlDialect {}),
        }
    }

    /// Whether statements for this engine are built into the MySQL tree
    pub fn is_mysql_family(&self) -> bool {
        matches!(self, Engine::MySql | Engine::TiDb | Engine::MariaDb)
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mysql8" => Ok(Engine::MySql),
            "tidb" => Ok(Engine::TiDb),
            "mariadb" => Ok(Engine::MariaDb),
            "postgresql" | "postgres" | "pg" => Ok(Engine::Postgres),
            _ => Err(format!(
                "Unknown engine: '{}'. Supported engines: mysql, tidb, mariadb, postgres.",
                s
            )),
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Engine::MySql => write!(f, "mysql"),
            Engine::TiDb => write!(f, "tidb"),
            Engine::MariaDb => write!(f, "mariadb"),
            Engine::Postgres => write!(f, "postgres"),
        }
    }
}
