//! Tolerant builder for the MySQL-family statement tree
//!
//! Works on the significant tokens of one statement. The builder never fails:
//! clauses it cannot make sense of become `None` or an `Other` node so that
//! checkers can skip them and keep going.

use sqlparser::tokenizer::Token;

use crate::ast::mysql::{
    AlterAction, AlterTable, ColumnAttribute, ColumnDefinition, CreateTable, DataType,
    FieldDefinition, FieldOptions, Identifier, Statement, TableElement, TableName,
};

/// A significant token and its line within the statement (1-indexed)
#[derive(Debug, Clone)]
pub(super) struct Tok {
    pub(super) token: Token,
    pub(super) line: usize,
}

/// Words that open a table element which is not a column definition
const CONSTRAINT_LEADERS: &[&str] = &[
    "CONSTRAINT",
    "PRIMARY",
    "UNIQUE",
    "KEY",
    "INDEX",
    "FULLTEXT",
    "SPATIAL",
    "FOREIGN",
    "CHECK",
];

/// Words that follow `ADD` for actions other than adding columns
const ADD_NON_COLUMN: &[&str] = &[
    "CONSTRAINT",
    "PRIMARY",
    "UNIQUE",
    "KEY",
    "INDEX",
    "FULLTEXT",
    "SPATIAL",
    "FOREIGN",
    "CHECK",
    "PARTITION",
];

/// Two-word type names
const TYPE_CONTINUATIONS: &[(&str, &str)] = &[
    ("DOUBLE", "PRECISION"),
    ("LONG", "VARCHAR"),
    ("LONG", "VARBINARY"),
    ("CHARACTER", "VARYING"),
    ("NATIONAL", "CHAR"),
    ("NATIONAL", "VARCHAR"),
];

/// Build the tree for one statement
pub(super) fn build_statement(toks: &[Tok]) -> Statement {
    let line = toks.first().map_or(1, |t| t.line);

    if is_keyword(toks, 0, "CREATE") {
        let mut i = 1;
        while is_keyword(toks, i, "TEMPORARY") {
            i += 1;
        }
        if is_keyword(toks, i, "TABLE") {
            return Statement::CreateTable(create_table(&toks[i + 1..], line));
        }
    }

    if is_keyword(toks, 0, "ALTER") {
        let mut i = 1;
        while is_any_keyword(toks, i, &["ONLINE", "OFFLINE", "IGNORE"]) {
            i += 1;
        }
        if is_keyword(toks, i, "TABLE") {
            return Statement::AlterTable(alter_table(&toks[i + 1..], line));
        }
    }

    Statement::Other { line }
}

fn create_table(toks: &[Tok], line: usize) -> CreateTable {
    let mut i = 0;
    if is_keyword(toks, i, "IF") && is_keyword(toks, i + 1, "NOT") && is_keyword(toks, i + 2, "EXISTS")
    {
        i += 3;
    }

    let (name, next) = table_name(toks, i);
    let elements = match toks.get(next) {
        Some(Tok {
            token: Token::LParen,
            ..
        }) => {
            let close = matching_paren(toks, next).unwrap_or(toks.len());
            Some(table_elements(&toks[next + 1..close]))
        }
        _ => None,
    };

    CreateTable {
        name,
        elements,
        line,
    }
}

fn alter_table(toks: &[Tok], line: usize) -> AlterTable {
    let (table, next) = table_name(toks, 0);
    let rest = toks.get(next..).unwrap_or_default();

    let actions = if rest.is_empty() {
        None
    } else {
        Some(
            split_top_level(rest)
                .into_iter()
                .filter(|part| !part.is_empty())
                .map(alter_action)
                .collect(),
        )
    };

    AlterTable {
        table,
        actions,
        line,
    }
}

fn alter_action(part: &[Tok]) -> AlterAction {
    let line = part[0].line;

    if is_keyword(part, 0, "ADD") {
        let mut i = 1;
        let column_keyword = is_keyword(part, i, "COLUMN");
        if column_keyword {
            i += 1;
        }
        i = skip_if_not_exists(part, i);

        if let Some(Tok {
            token: Token::LParen,
            ..
        }) = part.get(i)
        {
            let close = matching_paren(part, i).unwrap_or(part.len());
            return AlterAction::AddColumns {
                elements: Some(table_elements(&part[i + 1..close])),
                line,
            };
        }
        if !column_keyword && is_any_keyword(part, i, ADD_NON_COLUMN) {
            return AlterAction::Other { line };
        }
        return AlterAction::AddColumn {
            column: identifier(part, i),
            field: field_definition(part.get(i + 1..).unwrap_or_default()),
            line,
        };
    }

    if is_keyword(part, 0, "CHANGE") {
        let mut i = 1;
        if is_keyword(part, i, "COLUMN") {
            i += 1;
        }
        i = skip_if_exists(part, i);
        return AlterAction::ChangeColumn {
            column: identifier(part, i),
            new_name: identifier(part, i + 1),
            field: field_definition(part.get(i + 2..).unwrap_or_default()),
            line,
        };
    }

    if is_keyword(part, 0, "MODIFY") {
        let mut i = 1;
        if is_keyword(part, i, "COLUMN") {
            i += 1;
        }
        i = skip_if_exists(part, i);
        return AlterAction::ModifyColumn {
            column: identifier(part, i),
            field: field_definition(part.get(i + 1..).unwrap_or_default()),
            line,
        };
    }

    AlterAction::Other { line }
}

fn table_elements(toks: &[Tok]) -> Vec<TableElement> {
    split_top_level(toks)
        .into_iter()
        .filter(|part| !part.is_empty())
        .map(table_element)
        .collect()
}

fn table_element(part: &[Tok]) -> TableElement {
    if is_any_keyword(part, 0, CONSTRAINT_LEADERS) {
        return TableElement::Constraint { line: part[0].line };
    }
    let name = identifier(part, 0);
    let rest = if name.is_some() { &part[1..] } else { part };
    TableElement::Column(ColumnDefinition {
        name,
        field: field_definition(rest),
    })
}

fn field_definition(toks: &[Tok]) -> Option<FieldDefinition> {
    let first = toks.first()?;
    let (data_type, consumed) = data_type(toks);
    Some(FieldDefinition {
        data_type,
        attributes: column_attributes(&toks[consumed..]),
        line: first.line,
    })
}

fn data_type(toks: &[Tok]) -> (Option<DataType>, usize) {
    let Some(first) = unquoted_word(toks, 0) else {
        return (None, 0);
    };
    let line = toks[0].line;
    let mut name = first.to_uppercase();
    let mut i = 1;

    if let Some(second) = unquoted_word(toks, i) {
        let second = second.to_uppercase();
        if TYPE_CONTINUATIONS
            .iter()
            .any(|(a, b)| *a == name && *b == second)
        {
            name = format!("{} {}", name, second);
            i += 1;
        }
    }

    let mut args = Vec::new();
    if let Some(Tok {
        token: Token::LParen,
        ..
    }) = toks.get(i)
    {
        let close = matching_paren(toks, i).unwrap_or(toks.len());
        args = split_top_level(&toks[i + 1..close])
            .into_iter()
            .map(render)
            .collect();
        i = close + 1;
    }

    let mut options = FieldOptions::default();
    loop {
        if is_keyword(toks, i, "UNSIGNED") {
            options.unsigned = true;
        } else if is_keyword(toks, i, "SIGNED") {
            options.signed = true;
        } else if is_keyword(toks, i, "ZEROFILL") {
            options.zerofill = true;
        } else {
            break;
        }
        i += 1;
    }

    (
        Some(DataType {
            name,
            args,
            options,
            line,
        }),
        i.min(toks.len()),
    )
}

fn column_attributes(toks: &[Tok]) -> Vec<ColumnAttribute> {
    let mut attributes = Vec::new();
    let mut depth = 0usize;
    let mut i = 0;

    while i < toks.len() {
        match &toks[i].token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            _ => {
                let Some(word) = unquoted_word(toks, i) else {
                    i += 1;
                    continue;
                };
                match word.to_uppercase().as_str() {
                    "AUTO_INCREMENT" => attributes.push(ColumnAttribute::AutoIncrement),
                    "NOT" if is_keyword(toks, i + 1, "NULL") => {
                        attributes.push(ColumnAttribute::NotNull);
                        i += 1;
                    }
                    "NULL" => attributes.push(ColumnAttribute::Null),
                    "DEFAULT" => {
                        attributes.push(ColumnAttribute::Default);
                        if !matches!(toks.get(i + 1).map(|t| &t.token), Some(Token::LParen)) {
                            i += 1;
                        }
                    }
                    "PRIMARY" | "KEY" => {
                        attributes.push(ColumnAttribute::PrimaryKey);
                        if is_keyword(toks, i + 1, "KEY") {
                            i += 1;
                        }
                    }
                    "UNIQUE" => {
                        attributes.push(ColumnAttribute::Unique);
                        if is_keyword(toks, i + 1, "KEY") {
                            i += 1;
                        }
                    }
                    "COMMENT" => {
                        attributes.push(ColumnAttribute::Comment);
                        i += 1;
                    }
                    "ON" if is_keyword(toks, i + 1, "UPDATE") => {
                        attributes.push(ColumnAttribute::OnUpdate);
                        i += 2;
                    }
                    _ => {}
                }
            }
        }
        i += 1;
    }

    attributes
}

/// `name` or `db.name`, returning the index after the name
fn table_name(toks: &[Tok], i: usize) -> (Option<TableName>, usize) {
    let Some(first) = word(toks, i) else {
        return (None, i);
    };
    if matches!(toks.get(i + 1).map(|t| &t.token), Some(Token::Period)) {
        if let Some(second) = word(toks, i + 2) {
            return (Some(TableName::with_database(first, second)), i + 3);
        }
    }
    (Some(TableName::new(first)), i + 1)
}

fn identifier(toks: &[Tok], i: usize) -> Option<Identifier> {
    let value = word(toks, i)?;
    Some(Identifier::new(value, toks[i].line))
}

fn skip_if_not_exists(toks: &[Tok], i: usize) -> usize {
    if is_keyword(toks, i, "IF") && is_keyword(toks, i + 1, "NOT") && is_keyword(toks, i + 2, "EXISTS")
    {
        i + 3
    } else {
        i
    }
}

fn skip_if_exists(toks: &[Tok], i: usize) -> usize {
    if is_keyword(toks, i, "IF") && is_keyword(toks, i + 1, "EXISTS") {
        i + 2
    } else {
        i
    }
}

/// Split on commas outside parentheses
fn split_top_level(toks: &[Tok]) -> Vec<&[Tok]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, tok) in toks.iter().enumerate() {
        match tok.token {
            Token::LParen => depth += 1,
            Token::RParen => depth = depth.saturating_sub(1),
            Token::Comma if depth == 0 => {
                parts.push(&toks[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&toks[start..]);
    parts
}

/// Index of the parenthesis closing the one at `open`
fn matching_paren(toks: &[Tok], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in toks.iter().enumerate().skip(open) {
        match tok.token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn render(toks: &[Tok]) -> String {
    toks.iter()
        .map(|t| t.token.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Any word, quoted or not
fn word(toks: &[Tok], i: usize) -> Option<&str> {
    match toks.get(i).map(|t| &t.token) {
        Some(Token::Word(w)) => Some(w.value.as_str()),
        _ => None,
    }
}

fn unquoted_word(toks: &[Tok], i: usize) -> Option<&str> {
    match toks.get(i).map(|t| &t.token) {
        Some(Token::Word(w)) if w.quote_style.is_none() => Some(w.value.as_str()),
        _ => None,
    }
}

fn is_keyword(toks: &[Tok], i: usize, keyword: &str) -> bool {
    unquoted_word(toks, i).is_some_and(|w| w.eq_ignore_ascii_case(keyword))
}

fn is_any_keyword(toks: &[Tok], i: usize, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| is_keyword(toks, i, kw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlparser::dialect::MySqlDialect;
    use sqlparser::tokenizer::Tokenizer;

    fn build(sql: &str) -> Statement {
        let toks: Vec<Tok> = Tokenizer::new(&MySqlDialect {}, sql)
            .tokenize_with_location()
            .unwrap()
            .into_iter()
            .filter(|t| !matches!(t.token, Token::Whitespace(_)))
            .map(|t| Tok {
                line: t.span.start.line as usize,
                token: t.token,
            })
            .collect();
        build_statement(&toks)
    }

    fn field<'a>(element: &'a TableElement) -> &'a FieldDefinition {
        element
            .column_definition()
            .and_then(|c| c.field.as_ref())
            .unwrap()
    }

    #[test]
    fn test_create_table_columns_and_constraints() {
        let stmt = build(
            "CREATE TABLE IF NOT EXISTS `shop`.`orders` (\n\
             `id` BIGINT(20) UNSIGNED NOT NULL AUTO_INCREMENT,\n\
             amount DECIMAL(10, 2) DEFAULT NULL COMMENT 'total',\n\
             PRIMARY KEY (`id`)\n\
             )",
        );
        let Statement::CreateTable(create) = stmt else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(
            create.name,
            Some(TableName::with_database("shop", "orders"))
        );

        let elements = create.elements.unwrap();
        assert_eq!(elements.len(), 3);
        assert!(matches!(elements[2], TableElement::Constraint { line: 4 }));

        let id = field(&elements[0]);
        let id_type = id.data_type.as_ref().unwrap();
        assert_eq!(id_type.name, "BIGINT");
        assert_eq!(id_type.args, vec!["20".to_string()]);
        assert!(id_type.options.unsigned);
        assert!(id.is_auto_increment());
        assert!(id.attributes.contains(&ColumnAttribute::NotNull));
        assert_eq!(id.line, 2);

        let amount = field(&elements[1]);
        assert_eq!(amount.data_type.as_ref().unwrap().args.len(), 2);
        assert!(amount.attributes.contains(&ColumnAttribute::Default));
        assert!(amount.attributes.contains(&ColumnAttribute::Comment));
        assert!(!amount.attributes.contains(&ColumnAttribute::Null));
    }

    #[test]
    fn test_zerofill_and_multiword_types() {
        let stmt = build("CREATE TABLE t (a INT(4) ZEROFILL, b DOUBLE PRECISION UNSIGNED)");
        let Statement::CreateTable(create) = stmt else {
            panic!("expected CREATE TABLE");
        };
        let elements = create.elements.unwrap();

        let a = field(&elements[0]);
        assert!(a.data_type.as_ref().unwrap().options.zerofill);
        assert!(a.is_unsigned());

        let b = field(&elements[1]);
        assert_eq!(b.data_type.as_ref().unwrap().name, "DOUBLE PRECISION");
        assert!(b.is_unsigned());
    }

    #[test]
    fn test_create_table_like_has_no_elements() {
        let Statement::CreateTable(create) = build("CREATE TABLE t2 LIKE t1") else {
            panic!("expected CREATE TABLE");
        };
        assert_eq!(create.name, Some(TableName::new("t2")));
        assert!(create.elements.is_none());
    }

    #[test]
    fn test_alter_table_actions() {
        let stmt = build(
            "ALTER TABLE t ADD COLUMN a INT, ADD (b INT, c INT), \
             CHANGE COLUMN d e BIGINT, MODIFY f SMALLINT, ADD INDEX idx (a), ALGORITHM=INPLACE",
        );
        let Statement::AlterTable(alter) = stmt else {
            panic!("expected ALTER TABLE");
        };
        let actions = alter.actions.unwrap();
        assert_eq!(actions.len(), 6);

        assert!(matches!(
            &actions[0],
            AlterAction::AddColumn { column: Some(c), field: Some(_), .. } if c.value == "a"
        ));
        assert!(matches!(
            &actions[1],
            AlterAction::AddColumns { elements: Some(e), .. } if e.len() == 2
        ));
        assert!(matches!(
            &actions[2],
            AlterAction::ChangeColumn { column: Some(old), new_name: Some(new), field: Some(_), .. }
                if old.value == "d" && new.value == "e"
        ));
        assert!(matches!(
            &actions[3],
            AlterAction::ModifyColumn { column: Some(c), field: Some(_), .. } if c.value == "f"
        ));
        assert!(matches!(actions[4], AlterAction::Other { .. }));
        assert!(matches!(actions[5], AlterAction::Other { .. }));
    }

    #[test]
    fn test_partial_change_keeps_missing_parts_empty() {
        let Statement::AlterTable(alter) = build("ALTER TABLE t CHANGE a") else {
            panic!("expected ALTER TABLE");
        };
        let actions = alter.actions.unwrap();
        assert!(matches!(
            &actions[0],
            AlterAction::ChangeColumn { column: Some(_), new_name: None, field: None, .. }
        ));
    }

    #[test]
    fn test_alter_without_actions() {
        let Statement::AlterTable(alter) = build("ALTER TABLE t") else {
            panic!("expected ALTER TABLE");
        };
        assert_eq!(alter.table, Some(TableName::new("t")));
        assert!(alter.actions.is_none());
    }

    #[test]
    fn test_other_statements() {
        assert!(matches!(
            build("INSERT INTO t VALUES (1)"),
            Statement::Other { line: 1 }
        ));
        assert!(matches!(
            build("CREATE INDEX idx ON t (a)"),
            Statement::Other { .. }
        ));
    }
}
