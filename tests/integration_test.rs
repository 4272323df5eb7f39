use std::path::Path;
use std::process::{Command, Stdio};

fn run_script(path: &Path, commands: &[String]) -> Vec<String> {
    let table = leafdb::open(path).expect("Should have opened database.");
    let input: String = commands.iter().map(|c| format!("{}\n", c)).collect();
    let mut out = vec![];
    leafdb::repl::run(table, input.as_bytes(), &mut out).expect("Should have run script.");
    String::from_utf8(out)
        .expect("Output should be utf8.")
        .split('\n')
        .map(|s| s.to_string())
        .collect()
}

fn script(commands: &[&str]) -> Vec<String> {
    commands.iter().map(|s| s.to_string()).collect()
}

fn insert(id: u32) -> String {
    format!("insert {} user{} person{}@example.com", id, id, id)
}

#[test]
fn test_inserts_and_retrieves_a_row() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_script(
        &dir.path().join("test.db"),
        &script(&["insert 1 user1 person1@example.com", "select", ".exit"]),
    );
    assert_eq!(
        result,
        vec![
            "db > Executed.",
            "db > [1, user1, person1@example.com]",
            "Executed.",
            "db > ",
        ]
    );
}

#[test]
fn test_keeps_data_after_closing_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let result = run_script(
        &path,
        &script(&["insert 1 user1 person1@example.com", ".exit"]),
    );
    assert_eq!(result, vec!["db > Executed.", "db > "]);
    let result = run_script(&path, &script(&["select", ".exit"]));
    assert_eq!(
        result,
        vec!["db > [1, user1, person1@example.com]", "Executed.", "db > "]
    );
}

#[test]
fn test_prints_error_message_when_table_is_full() {
    let dir = tempfile::tempdir().unwrap();
    let mut commands: Vec<String> = (1..=14).map(insert).collect();
    commands.push(".exit".to_string());
    let result = run_script(&dir.path().join("test.db"), &commands);
    assert_eq!(result[12], "db > Executed.");
    assert_eq!(result[13], "db > Error: Table full.");
    assert_eq!(result[14], "db > ");
}

#[test]
fn test_allows_maximum_length_strings() {
    let dir = tempfile::tempdir().unwrap();
    let username = "a".repeat(32);
    let email = "a".repeat(255);
    let commands = vec![
        format!("insert 1 {} {}", username, email),
        "select".to_string(),
        ".exit".to_string(),
    ];
    let result = run_script(&dir.path().join("test.db"), &commands);
    assert_eq!(
        result,
        vec![
            "db > Executed.".to_string(),
            format!("db > [1, {}, {}]", username, email),
            "Executed.".to_string(),
            "db > ".to_string(),
        ]
    );
}

#[test]
fn test_prints_error_message_if_strings_are_too_long() {
    let dir = tempfile::tempdir().unwrap();
    let username = "a".repeat(33);
    let email = "a".repeat(256);
    let commands = vec![
        format!("insert 1 {} {}", username, email),
        "select".to_string(),
        ".exit".to_string(),
    ];
    let result = run_script(&dir.path().join("test.db"), &commands);
    assert_eq!(
        result,
        vec!["db > String is too long.", "db > Executed.", "db > "]
    );
}

#[test]
fn test_prints_error_message_if_id_is_negative() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_script(
        &dir.path().join("test.db"),
        &script(&["insert -1 cstack foo@bar.com", "select", ".exit"]),
    );
    assert_eq!(
        result,
        vec!["db > ID must be positive.", "db > Executed.", "db > "]
    );
}

#[test]
fn test_prints_error_message_for_duplicate_id() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_script(
        &dir.path().join("test.db"),
        &script(&[
            "insert 1 user1 person1@example.com",
            "insert 1 user1 person1@example.com",
            "select",
            ".exit",
        ]),
    );
    assert_eq!(
        result,
        vec![
            "db > Executed.",
            "db > Error: Duplicate key.",
            "db > [1, user1, person1@example.com]",
            "Executed.",
            "db > ",
        ]
    );
}

#[test]
fn test_prints_constants() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_script(&dir.path().join("test.db"), &script(&[".constants", ".exit"]));
    assert_eq!(
        result,
        vec![
            "db > Constants:",
            "ROW_SIZE: 293",
            "COMMON_NODE_HEADER_SIZE: 6",
            "LEAF_NODE_HEADER_SIZE: 10",
            "LEAF_NODE_CELL_SIZE: 297",
            "LEAF_NODE_SPACE_FOR_CELLS: 4086",
            "LEAF_NODE_MAX_CELLS: 13",
            "db > ",
        ]
    );
}

#[test]
fn test_prints_structure_of_one_node_btree() {
    let dir = tempfile::tempdir().unwrap();
    let mut commands: Vec<String> = [3, 1, 2].iter().map(|&i| insert(i)).collect();
    commands.push(".btree".to_string());
    commands.push(".exit".to_string());
    let result = run_script(&dir.path().join("test.db"), &commands);
    assert_eq!(
        result,
        vec![
            "db > Executed.",
            "db > Executed.",
            "db > Executed.",
            "db > Tree:",
            "leaf (size 3)",
            "  - 0 : 1",
            "  - 1 : 2",
            "  - 2 : 3",
            "db > ",
        ]
    );
}

#[test]
fn test_select_returns_rows_sorted_by_id() {
    let dir = tempfile::tempdir().unwrap();
    let mut commands: Vec<String> = [5, 2, 9].iter().map(|&i| insert(i)).collect();
    commands.push("select".to_string());
    let result = run_script(&dir.path().join("test.db"), &commands);
    assert_eq!(
        &result[3..],
        &[
            "db > [2, user2, person2@example.com]",
            "[5, user5, person5@example.com]",
            "[9, user9, person9@example.com]",
            "Executed.",
            "db > ",
            "",
        ]
    );
}

#[test]
fn test_prints_unrecognized_commands_and_keywords() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_script(
        &dir.path().join("test.db"),
        &script(&[".tables", "delete 1", "insert 1", ".exit"]),
    );
    assert_eq!(
        result,
        vec![
            "db > Unrecognized command '.tables'.",
            "db > Unrecognized keyword at start of 'delete 1'",
            "db > Syntax error. Could not parse statement.",
            "db > ",
        ]
    );
}

#[test]
fn test_binary_requires_filename() {
    let output = Command::new(env!("CARGO_BIN_EXE_leafdb"))
        .stdin(Stdio::null())
        .output()
        .expect("Should have run leafdb.");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Must supply a database filename."));
}

#[test]
fn test_binary_runs_script_from_stdin() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_leafdb"))
        .arg(dir.path().join("bin.db"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Should have started leafdb.");
    child
        .stdin
        .take()
        .expect("Should have stdin.")
        .write_all(b"insert 1 a b\nselect\n.exit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "db > Executed.\ndb > [1, a, b]\nExecuted.\ndb > "
    );
}
