//! Tree for MySQL-family DDL
//!
//! The tree mirrors the shape of the MySQL grammar closely enough for
//! column-level review: table element lists, alter action lists and field
//! definitions. Every optional clause is an `Option` so that partial or
//! unsupported syntax still yields a tree. All `line` fields are 1-indexed
//! lines within the statement text.

/// A (possibly quoted) identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub value: String,
    pub line: usize,
}

impl Identifier {
    pub fn new(value: impl Into<String>, line: usize) -> Self {
        Self {
            value: value.into(),
            line,
        }
    }
}

/// Table name, optionally qualified by a database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    pub database: Option<String>,
    pub name: String,
}

impl TableName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            database: None,
            name: name.into(),
        }
    }

    pub fn with_database(database: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.database {
            Some(db) => write!(f, "{}.{}", db, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Top-level statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTable),
    AlterTable(AlterTable),
    /// Any statement the review rules do not look into
    Other { line: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: Option<TableName>,
    /// `None` for `CREATE TABLE ... LIKE` and other forms without a list
    pub elements: Option<Vec<TableElement>>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableElement {
    Column(ColumnDefinition),
    /// Index, key or constraint definition
    Constraint { line: usize },
}

impl TableElement {
    pub fn column_definition(&self) -> Option<&ColumnDefinition> {
        match self {
            TableElement::Column(column) => Some(column),
            TableElement::Constraint { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: Option<Identifier>,
    pub field: Option<FieldDefinition>,
}

/// Data type plus column attributes
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub data_type: Option<DataType>,
    pub attributes: Vec<ColumnAttribute>,
    /// Line where the definition starts
    pub line: usize,
}

impl FieldDefinition {
    pub fn is_auto_increment(&self) -> bool {
        self.attributes.contains(&ColumnAttribute::AutoIncrement)
    }

    /// UNSIGNED, either explicit or implied by ZEROFILL
    pub fn is_unsigned(&self) -> bool {
        self.data_type
            .as_ref()
            .is_some_and(|dt| dt.options.unsigned || dt.options.zerofill)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataType {
    /// Upper-cased type name, e.g. `INT` or `DOUBLE PRECISION`
    pub name: String,
    /// Raw arguments, e.g. `["10", "2"]` for `DECIMAL(10, 2)`
    pub args: Vec<String>,
    pub options: FieldOptions,
    pub line: usize,
}

const INTEGER_TYPES: &[&str] = &[
    "TINYINT",
    "SMALLINT",
    "MEDIUMINT",
    "MIDDLEINT",
    "INT",
    "INTEGER",
    "BIGINT",
    "INT1",
    "INT2",
    "INT3",
    "INT4",
    "INT8",
];

impl DataType {
    pub fn is_integer(&self) -> bool {
        INTEGER_TYPES.contains(&self.name.as_str())
    }
}

/// Numeric field options following the type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldOptions {
    pub signed: bool,
    pub unsigned: bool,
    pub zerofill: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAttribute {
    AutoIncrement,
    NotNull,
    Null,
    Default,
    PrimaryKey,
    Unique,
    Comment,
    OnUpdate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub table: Option<TableName>,
    /// `None` when the statement carries no actions at all
    pub actions: Option<Vec<AlterAction>>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    /// `ADD [COLUMN] name field`
    AddColumn {
        column: Option<Identifier>,
        field: Option<FieldDefinition>,
        line: usize,
    },
    /// `ADD [COLUMN] (element, ...)`
    AddColumns {
        elements: Option<Vec<TableElement>>,
        line: usize,
    },
    /// `CHANGE [COLUMN] old new field`
    ChangeColumn {
        column: Option<Identifier>,
        new_name: Option<Identifier>,
        field: Option<FieldDefinition>,
        line: usize,
    },
    /// `MODIFY [COLUMN] name field`
    ModifyColumn {
        column: Option<Identifier>,
        field: Option<FieldDefinition>,
        line: usize,
    },
    Other { line: usize },
}
