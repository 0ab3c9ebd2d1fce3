//! Shell transcripts: feed lines to a session and compare its output.

use std::path::Path;

use stratadb::common::config::{SplitPolicy, TableOptions};
use stratadb::repl::{self, Control, Session};
use stratadb::{Error, Table};
use tempfile::tempdir;

/// Run `lines` until `.exit`, then close. Returns everything printed.
fn run_script(path: &Path, options: TableOptions, lines: &[String]) -> String {
    let table = Table::open_with_options(path, options).unwrap();
    let mut session = Session::new(table);
    let mut out = Vec::new();
    for line in lines {
        if session.run_line(line, &mut out).unwrap() == Control::Exit {
            break;
        }
    }
    session.close().unwrap();
    String::from_utf8(out).unwrap()
}

fn script(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_insert_select_and_bad_keyword() {
    let dir = tempdir().unwrap();
    let out = run_script(
        &dir.path().join("test.db"),
        TableOptions::default(),
        &script(&[
            "insert 1 yan gmail",
            "insert 2 fei qq",
            "foo bar",
            "select",
            ".exit",
        ]),
    );

    assert_eq!(
        out,
        "Executed.\n\
         Executed.\n\
         Unrecognized keyword at start of 'foo bar'.\n\
         1 yan gmail\n\
         2 fei qq\n\
         Executed.\n"
    );
}

#[test]
fn test_max_length_strings() {
    let dir = tempdir().unwrap();
    let name = "a".repeat(32);
    let email = "e".repeat(255);
    let out = run_script(
        &dir.path().join("test.db"),
        TableOptions::default(),
        &[
            format!("insert 1 {} {}", name, email),
            "select".to_string(),
            ".exit".to_string(),
        ],
    );

    assert_eq!(out, format!("Executed.\n1 {} {}\nExecuted.\n", name, email));
}

#[test]
fn test_too_long_strings() {
    let dir = tempdir().unwrap();
    let out = run_script(
        &dir.path().join("test.db"),
        TableOptions::default(),
        &[
            format!("insert 1 {} {}", "a".repeat(33), "e".repeat(256)),
            "select".to_string(),
        ],
    );

    assert_eq!(out, "String is too long\nExecuted.\n");
}

#[test]
fn test_negative_id_and_syntax_error() {
    let dir = tempdir().unwrap();
    let out = run_script(
        &dir.path().join("test.db"),
        TableOptions::default(),
        &script(&["insert -1 cstack foo@bar.com", "insert 1 onlyname", "select"]),
    );

    assert_eq!(
        out,
        "ID must be positive.\n\
         Syntax error. Could not parse statement.\n\
         Executed.\n"
    );
}

#[test]
fn test_duplicate_key() {
    let dir = tempdir().unwrap();
    let out = run_script(
        &dir.path().join("test.db"),
        TableOptions::default(),
        &script(&[
            "insert 1 user1 person1@example.com",
            "insert 1 user1 person1@example.com",
            "select",
            ".exit",
        ]),
    );

    assert_eq!(
        out,
        "Executed.\n\
         Error: Duplicate key.\n\
         1 user1 person1@example.com\n\
         Executed.\n"
    );
}

#[test]
fn test_persistence_between_sessions() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    run_script(
        &path,
        TableOptions::default(),
        &script(&[
            "insert 1 yan yyy",
            "insert 2 liu lll",
            "insert 3 tao ttt",
            "insert 4 fei fff",
            ".exit",
        ]),
    );

    let out = run_script(&path, TableOptions::default(), &script(&["select", ".exit"]));
    assert_eq!(
        out,
        "1 yan yyy\n2 liu lll\n3 tao ttt\n4 fei fff\nExecuted.\n"
    );
}

#[test]
fn test_print_constants() {
    let dir = tempdir().unwrap();
    let out = run_script(
        &dir.path().join("test.db"),
        TableOptions::default(),
        &script(&[".constants", ".exit"]),
    );

    assert_eq!(
        out,
        "Constants: \n\
         ROW_SIZE: 293\n\
         COMMON_NODE_HEADER_SIZE: 6\n\
         LEAF_NODE_HEADER_SIZE: 10\n\
         LEAF_NODE_CELL_SIZE: 297\n\
         LEAF_NODE_SPACE_FOR_CELLS: 4086\n\
         LEAF_NODE_MAX_CELLS: 13\n"
    );
}

#[test]
fn test_btree_of_one_leaf() {
    let dir = tempdir().unwrap();
    let out = run_script(
        &dir.path().join("test.db"),
        TableOptions::default(),
        &script(&[
            "insert 3 user3 person3@example.com",
            "insert 1 user1 person1@example.com",
            "insert 2 user2 person2@example.com",
            ".btree",
            ".exit",
        ]),
    );

    assert_eq!(
        out,
        "Executed.\nExecuted.\nExecuted.\nTree:\n- leaf (size 3)\n  - 1\n  - 2\n  - 3\n"
    );
}

#[test]
fn test_btree_after_root_split() {
    let dir = tempdir().unwrap();
    let mut lines: Vec<String> = (1..=14)
        .rev()
        .map(|i| format!("insert {} user#{} person#{}@example.com", i, i, i))
        .collect();
    lines.push(".btree".to_string());
    lines.push("insert 15 user15 person15@example.com".to_string());
    lines.push(".exit".to_string());

    let out = run_script(&dir.path().join("test.db"), TableOptions::default(), &lines);

    let mut expected = "Executed.\n".repeat(14);
    expected.push_str("Tree:\n- internal (size 1)\n  - leaf (size 7)\n");
    for key in 1..=7 {
        expected.push_str(&format!("    - {}\n", key));
    }
    expected.push_str("  - key 7\n  - leaf (size 7)\n");
    for key in 8..=14 {
        expected.push_str(&format!("    - {}\n", key));
    }
    expected.push_str("Executed.\n");
    assert_eq!(out, expected);
}

#[test]
fn test_table_full_without_splitting() {
    let dir = tempdir().unwrap();
    let options = TableOptions::default().with_split_policy(SplitPolicy::Disabled);
    let lines: Vec<String> = (0..14)
        .map(|i| format!("insert {} user{} user#{}@email.com", i, i, i))
        .collect();

    let out = run_script(&dir.path().join("test.db"), options, &lines);
    assert!(out.ends_with("Executed.\nError: Table full.\n"));
    assert_eq!(out.matches("Executed.").count(), 13);
}

#[test]
fn test_structural_error_propagates() {
    let dir = tempdir().unwrap();
    let table = Table::open(dir.path().join("test.db")).unwrap();
    let mut session = Session::new(table);
    let mut out = Vec::new();

    let mut failure = None;
    for i in 1..=40 {
        let line = format!("insert {} u{} e{}", i, i, i);
        if let Err(e) = session.run_line(&line, &mut out) {
            failure = Some(e);
            break;
        }
    }

    let err = failure.expect("second-level split should fail");
    assert!(err.is_structural());
}

/// A failing statement ends the loop, but rows inserted before it are
/// still written to the file.
#[test]
fn test_fatal_error_still_persists_earlier_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let input_text: String = (1..=21)
        .map(|i| format!("insert {} u{} e{}\n", i, i, i))
        .collect();

    let session = Session::new(Table::open(&path).unwrap());
    let mut input = std::io::Cursor::new(input_text);
    let mut out = Vec::new();
    let err = repl::run(session, &mut input, &mut out).unwrap_err();
    assert!(matches!(err, Error::UnsupportedSplit(_)));

    let mut table = Table::open(&path).unwrap();
    let ids: Vec<u32> = table.select_all().unwrap().iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
}
