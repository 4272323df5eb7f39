//! This module defines the statement and meta-command types the command loop works with.

use enum_as_inner::EnumAsInner;

use crate::record::Row;

#[derive(Debug, Clone, PartialEq, Eq, EnumAsInner)]
pub enum Statement {
    Insert(Row),
    Select,
}

/// Lines starting with `.` control the command loop rather than the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Exit,
    Constants,
    Btree,
    Unrecognized(String),
}

impl From<&str> for MetaCommand {
    fn from(s: &str) -> Self {
        match s {
            ".exit" => MetaCommand::Exit,
            ".constants" => MetaCommand::Constants,
            ".btree" => MetaCommand::Btree,
            other => MetaCommand::Unrecognized(other.to_string()),
        }
    }
}

#[test]
fn test_meta_command_from_str() {
    assert_eq!(MetaCommand::from(".exit"), MetaCommand::Exit);
    assert_eq!(MetaCommand::from(".constants"), MetaCommand::Constants);
    assert_eq!(MetaCommand::from(".btree"), MetaCommand::Btree);
    assert_eq!(
        MetaCommand::from(".tables"),
        MetaCommand::Unrecognized(".tables".to_string())
    );
    assert_eq!(
        MetaCommand::from(".exit now"),
        MetaCommand::Unrecognized(".exit now".to_string())
    );
}

#[test]
fn test_statement_accessors() {
    let row = Row::new(1, "a", "b").unwrap();
    let s = Statement::Insert(row);
    assert_eq!(s.as_insert(), Some(&row));
    assert!(!Statement::Select.is_insert());
    assert!(Statement::Select.is_select());
}
