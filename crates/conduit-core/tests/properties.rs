//! Properties-file parsing tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::io::Write;

use conduit_core::settings::{parse_properties, read_properties};

#[test]
fn parses_pairs_comments_and_separators() {
    let p = parse_properties(
        r#"
# demo settings
! also a comment
client.concurrency=3
server.processing.time : 4
  spaced.key   =   12
"#,
    );
    assert_eq!(p.len(), 3);
    assert_eq!(p.get("client.concurrency"), Some("3"));
    assert_eq!(p.get_int("server.processing.time").unwrap().unwrap(), 4);
    assert_eq!(p.get_int("spaced.key").unwrap().unwrap(), 12);
}

#[test]
fn later_duplicates_win() {
    let p = parse_properties("client.concurrency=3\nclient.concurrency=7\n");
    assert_eq!(p.get_int("client.concurrency").unwrap().unwrap(), 7);
}

#[test]
fn absent_and_unparsable_are_distinct() {
    let p = parse_properties("client.concurrency=lots\n");
    assert!(p.get_int("missing").is_none());
    let err = p.get_int("client.concurrency").unwrap().expect_err("must fail");
    assert_eq!(err.code(), "PARSE");
}

#[test]
fn value_may_contain_separator() {
    let p = parse_properties("url=http://localhost:8080\n");
    assert_eq!(p.get("url"), Some("http://localhost:8080"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_properties(dir.path().join("nope.properties")).expect_err("must fail");
    assert_eq!(err.code(), "IO");
}

#[test]
fn reads_file_from_disk() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "client.concurrency=5").unwrap();
    let p = read_properties(f.path()).unwrap();
    assert_eq!(p.get_int("client.concurrency").unwrap().unwrap(), 5);
}

#[test]
fn whitespace_separates_key_and_value() {
    let p = parse_properties("client.concurrency 5\nserver.processing.time   = 2\ndemo.knob\t:\t9\n");
    assert_eq!(p.get_int("client.concurrency").unwrap().unwrap(), 5);
    assert_eq!(p.get_int("server.processing.time").unwrap().unwrap(), 2);
    assert_eq!(p.get_int("demo.knob").unwrap().unwrap(), 9);
}
