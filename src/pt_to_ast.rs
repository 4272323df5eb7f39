//! `pt_to_ast` converts parse trees of statements into `Statement`s, validating the values.
//! A Pest parse tree has one enum for all possible terminals and non-terminals.
//! A `Statement` holds a checked `Row`, so nothing past this point sees an oversized field or a
//! negative id.

use itertools::Itertools;
use pest::iterators::Pair;

use crate::ast::Statement;
use crate::parser::{Rule, SQLParser};
use crate::pest::Parser;
use crate::record::{self, Row};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Syntax error. Could not parse statement.")]
    SyntaxError,
    #[error("ID must be positive.")]
    NegativeId,
    #[error("ID is out of range.")]
    IdOutOfRange,
    #[error("String is too long.")]
    StringTooLong,
    #[error("Unrecognized keyword at start of '{0}'")]
    Unrecognized(String),
}

impl From<record::Error> for PrepareError {
    fn from(e: record::Error) -> Self {
        match e {
            record::Error::StringTooLong { .. } => PrepareError::StringTooLong,
        }
    }
}

fn parse_id(s: &str) -> Result<u32, PrepareError> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PrepareError::SyntaxError);
    }
    if negative && digits.bytes().any(|b| b != b'0') {
        return Err(PrepareError::NegativeId);
    }
    digits.parse::<u32>().map_err(|_| PrepareError::IdOutOfRange)
}

fn pt_insert_statement_to_ast(insert_stmt: Pair<Rule>) -> Result<Statement, PrepareError> {
    // Arguments past the email are ignored.
    let (id, username, email) = insert_stmt
        .into_inner()
        .filter(|p| p.as_rule() == Rule::arg)
        .map(|p| p.as_str())
        .take(3)
        .collect_tuple()
        .ok_or(PrepareError::SyntaxError)?;
    let id = parse_id(id)?;
    Ok(Statement::Insert(Row::new(id, username, email)?))
}

/// Turns one input line into a statement ready to execute.
pub fn prepare_statement(line: &str) -> Result<Statement, PrepareError> {
    let statement = SQLParser::parse(Rule::statement, line)
        .map_err(|_| PrepareError::Unrecognized(line.to_string()))?
        .next()
        .and_then(|s| s.into_inner().next())
        .ok_or_else(|| PrepareError::Unrecognized(line.to_string()))?;
    match statement.as_rule() {
        Rule::insert_stmt => pt_insert_statement_to_ast(statement),
        Rule::select_stmt => Ok(Statement::Select),
        _ => Err(PrepareError::Unrecognized(line.to_string())),
    }
}

#[test]
fn test_prepare_insert() {
    let actual = prepare_statement("insert 1 user1 person1@example.com");
    let expected = Row::new(1, "user1", "person1@example.com").unwrap();
    assert_eq!(actual, Ok(Statement::Insert(expected)));
}

#[test]
fn test_prepare_select() {
    assert_eq!(prepare_statement("select"), Ok(Statement::Select));
}

#[test]
fn test_prepare_ignores_extra_args() {
    let actual = prepare_statement("insert 2 a b c d");
    assert_eq!(actual, Ok(Statement::Insert(Row::new(2, "a", "b").unwrap())));
}

#[test]
fn test_prepare_syntax_errors() {
    let cases = vec![
        "insert",
        "insert 1",
        "insert 1 user1",
        "insert abc user1 email",
        "insert 1x user1 email",
        "insert - user1 email",
    ];
    for case in cases {
        assert_eq!(
            prepare_statement(case),
            Err(PrepareError::SyntaxError),
            "case [{}]",
            case
        );
    }
}

#[test]
fn test_prepare_ids() {
    assert_eq!(
        prepare_statement("insert -1 cstack foo@bar.com"),
        Err(PrepareError::NegativeId)
    );
    assert_eq!(
        prepare_statement("insert 4294967296 a b"),
        Err(PrepareError::IdOutOfRange)
    );
    assert_eq!(
        prepare_statement("insert 4294967295 a b")
            .unwrap()
            .into_insert()
            .unwrap()
            .id(),
        u32::MAX
    );
    assert_eq!(
        prepare_statement("insert -0 a b")
            .unwrap()
            .into_insert()
            .unwrap()
            .id(),
        0
    );
}

#[test]
fn test_prepare_string_lengths() {
    let username = "a".repeat(32);
    let email = "a".repeat(255);
    assert!(prepare_statement(&format!("insert 1 {} {}", username, email)).is_ok());
    assert_eq!(
        prepare_statement(&format!("insert 1 {}a {}", username, email)),
        Err(PrepareError::StringTooLong)
    );
    assert_eq!(
        prepare_statement(&format!("insert 1 {} {}a", username, email)),
        Err(PrepareError::StringTooLong)
    );
}

#[test]
fn test_prepare_unrecognized() {
    assert_eq!(
        prepare_statement("update 1 a b"),
        Err(PrepareError::Unrecognized("update 1 a b".to_string()))
    );
    assert_eq!(
        PrepareError::Unrecognized("foo".to_string()).to_string(),
        "Unrecognized keyword at start of 'foo'"
    );
}
