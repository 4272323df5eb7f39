//! `parser` contains generated parsing routines for statements and tests on them.

#[allow(unused_imports)]
use pest::Parser; // This needs to be in scope for the next statements to work.
#[derive(Parser)]
#[grammar = "sql.pest"]
pub struct SQLParser;

#[test]
fn test_parse_insert_statements() {
    let cases = vec![
        "insert 1 user1 person1@example.com",
        "insert -1 a b",
        "insert",
        "insert 1 a b extra args",
        "insert 1 a b   ",
        "insert\t1\ta\tb",
    ];
    for case in cases {
        println!("Case: {}", case);
        match SQLParser::parse(Rule::statement, case) {
            Ok(_) => continue,
            Err(e) => panic!("Error parsing [{}] : {}", case, e),
        }
    }
}

#[test]
fn test_parse_select_statements() {
    assert!(SQLParser::parse(Rule::statement, "select").is_ok());
}

#[test]
fn test_not_parse_invalid_statements() {
    let cases = vec![
        "",
        "insertfoo 1 a b",
        "INSERT 1 a b",
        "select *",
        "select ",
        "  select",
        "   insert 1 a b",
        "select foo",
        "SELECT",
        "selectx",
        "update 1 a b",
        "delete 1",
    ];
    for case in cases {
        assert!(
            SQLParser::parse(Rule::statement, case).is_err(),
            "Should not have parsed [{}]",
            case
        );
    }
}

#[test]
fn test_insert_args() {
    let stmt = SQLParser::parse(Rule::statement, "insert 7 bob bob@example.com")
        .expect("Should have parsed.")
        .next()
        .expect("Should have a statement.");
    let insert = stmt
        .into_inner()
        .next()
        .expect("Should have an insert statement.");
    assert_eq!(insert.as_rule(), Rule::insert_stmt);
    let args: Vec<&str> = insert
        .into_inner()
        .filter(|p| p.as_rule() == Rule::arg)
        .map(|p| p.as_str())
        .collect();
    assert_eq!(args, vec!["7", "bob", "bob@example.com"]);
}
