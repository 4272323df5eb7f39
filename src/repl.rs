//! The command loop: reads one line at a time, runs it, and prints the outcome.
//!
//! Problems with a single line (bad syntax, a duplicate key, a full table...) are printed and the
//! loop carries on.  Errors from the storage layer end the loop and are returned to the caller
//! without writing anything back to the file.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::{debug, info};

use crate::ast::{MetaCommand, Statement};
use crate::execute::{execute_insert, execute_select, ExecuteResult};
use crate::formatting;
use crate::pt_to_ast::{prepare_statement, PrepareError};
use crate::table::Table;

pub const PROMPT: &str = "db > ";

const LINE_END: &[char] = &['\n', '\r'];

/// Whether the loop should read another line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub fn handle_meta_command<W: Write>(
    command: &MetaCommand,
    table: &mut Table,
    out: &mut W,
) -> Result<Flow> {
    match command {
        MetaCommand::Exit => return Ok(Flow::Exit),
        MetaCommand::Constants => {
            writeln!(out, "Constants:")?;
            formatting::print_constants(out)?;
        }
        MetaCommand::Btree => {
            writeln!(out, "Tree:")?;
            let root = table.root_leaf()?;
            formatting::print_leaf_node(out, &root)?;
        }
        MetaCommand::Unrecognized(s) => handle_unrecognized_meta_command(s, out)?,
    }
    Ok(Flow::Continue)
}

fn handle_unrecognized_meta_command<W: Write>(line: &str, out: &mut W) -> Result<()> {
    writeln!(out, "Unrecognized command '{}'.", line)?;
    Ok(())
}

pub fn execute_statement<W: Write>(
    statement: &Statement,
    table: &mut Table,
    out: &mut W,
) -> Result<()> {
    match statement {
        Statement::Insert(row) => {
            let result = execute_insert(table, row)?;
            writeln!(out, "{}", result)?;
        }
        Statement::Select => {
            for row in execute_select(table)? {
                formatting::print_row(out, &row)?;
            }
            writeln!(out, "{}", ExecuteResult::Success)?;
        }
    }
    Ok(())
}

/// Runs one input line, minus its line terminator.
pub fn execute_line<W: Write>(line: &str, table: &mut Table, out: &mut W) -> Result<Flow> {
    if line.starts_with('.') {
        return handle_meta_command(&MetaCommand::from(line), table, out);
    }
    match prepare_statement(line) {
        Ok(statement) => execute_statement(&statement, table, out)?,
        Err(e) => {
            debug!(line, error = ?e, "rejected statement");
            writeln!(out, "{}", e)?;
        }
    }
    Ok(Flow::Continue)
}

/// A line that is not UTF-8 can match no command or keyword.
fn reject_undecodable_line<W: Write>(bytes: &[u8], out: &mut W) -> Result<()> {
    let lossy = String::from_utf8_lossy(bytes);
    let line = lossy.trim_end_matches(LINE_END);
    if line.starts_with('.') {
        handle_unrecognized_meta_command(line, out)
    } else {
        writeln!(out, "{}", PrepareError::Unrecognized(line.to_string()))?;
        Ok(())
    }
}

/// Reads commands from `input` until `.exit` or the end of input, then closes `table`.
pub fn run<R: BufRead, W: Write>(mut table: Table, mut input: R, out: &mut W) -> Result<()> {
    let mut buffer = Vec::new();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;
        buffer.clear();
        if input.read_until(b'\n', &mut buffer)? == 0 {
            // Keep whatever comes next off the prompt line.
            writeln!(out)?;
            info!("end of input");
            break;
        }
        let line = match std::str::from_utf8(&buffer) {
            Ok(line) => line.trim_end_matches(LINE_END),
            Err(e) => {
                debug!(error = %e, "line is not valid utf-8");
                reject_undecodable_line(&buffer, out)?;
                continue;
            }
        };
        if execute_line(line, &mut table, out)? == Flow::Exit {
            break;
        }
    }
    table.close()?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
fn run_script(path: &std::path::Path, commands: &[&str]) -> String {
    let table = Table::open(path).expect("Should have opened table.");
    let input = commands.iter().map(|c| format!("{}\n", c)).collect::<String>();
    let mut out = vec![];
    run(table, input.as_bytes(), &mut out).expect("Should have run script.");
    String::from_utf8(out).expect("Output should be utf8.")
}

#[test]
fn test_insert_and_select() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(
        &dir.path().join("repl.db"),
        &["insert 1 user1 person1@example.com", "select", ".exit"],
    );
    assert_eq!(
        out,
        "db > Executed.\ndb > [1, user1, person1@example.com]\nExecuted.\ndb > "
    );
}

#[test]
fn test_meta_commands() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_script(
        &dir.path().join("repl.db"),
        &[
            "insert 3 user3 person3@example.com",
            "insert 1 user1 person1@example.com",
            ".btree",
            ".foo",
            ".exit",
        ],
    );
    assert_eq!(
        out,
        "db > Executed.\n\
         db > Executed.\n\
         db > Tree:\n\
         leaf (size 2)\n  - 0 : 1\n  - 1 : 3\n\
         db > Unrecognized command '.foo'.\n\
         db > "
    );
}

#[test]
fn test_end_of_input_closes_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repl.db");
    let out = run_script(&path, &["insert 5 a b"]);
    assert_eq!(out, "db > Executed.\ndb > \n");
    let out = run_script(&path, &["select", ".exit"]);
    assert_eq!(out, "db > [5, a, b]\nExecuted.\ndb > ");
}

#[test]
fn test_invalid_utf8_line_is_rejected_and_session_continues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repl.db");
    let table = Table::open(&path).unwrap();
    let input: &[u8] = b"insert 1 user1 person1@example.com\ninsert 2 u\xff e\n.b\xfe\n.exit\n";
    let mut out = vec![];
    run(table, input, &mut out).expect("Should have run script.");
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "db > Executed.\n\
         db > Unrecognized keyword at start of 'insert 2 u\u{FFFD} e'\n\
         db > Unrecognized command '.b\u{FFFD}'.\n\
         db > "
    );
    let out = run_script(&path, &["select", ".exit"]);
    assert_eq!(out, "db > [1, user1, person1@example.com]\nExecuted.\ndb > ");
}

#[test]
fn test_execute_line_flow() {
    let dir = tempfile::tempdir().unwrap();
    let mut table = Table::open(dir.path().join("repl.db")).unwrap();
    let mut out = vec![];
    assert_eq!(execute_line("select", &mut table, &mut out).unwrap(), Flow::Continue);
    assert_eq!(execute_line("", &mut table, &mut out).unwrap(), Flow::Continue);
    assert_eq!(execute_line(".exit", &mut table, &mut out).unwrap(), Flow::Exit);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Executed.\nUnrecognized keyword at start of ''\n"
    );
}
