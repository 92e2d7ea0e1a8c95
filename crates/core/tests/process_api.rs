//! End-to-end tests for `process` against a stand-in `zq` executable.
//!
//! Each test writes a small shell script named `zq` into a temp directory
//! and points [`EngineConfig`] at it, so the full spawn / stdin / stdout /
//! stderr path runs without the real engine installed.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;
use zquery_core::{
    process, EngineConfig, Item, NodeParameters, Payload, QueryError, QueryNode, ZqEngine,
};

/// Helper: write an executable fake engine that appends to `calls` on every
/// invocation before running `body`.
fn fake_zq(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("zq");
    let script = format!("#!/bin/sh\necho run >> \"$(dirname \"$0\")/calls\"\n{body}");
    std::fs::write(&path, script).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

fn engine(binary: PathBuf) -> ZqEngine {
    ZqEngine::new(EngineConfig {
        binary,
        timeout: Some(Duration::from_secs(10)),
    })
}

fn call_count(dir: &Path) -> usize {
    std::fs::read_to_string(dir.join("calls"))
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Test: newline-delimited output becomes one record per line
// ---------------------------------------------------------------------------

#[tokio::test]
async fn newline_delimited_output_is_split_into_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let zq = fake_zq(
        dir.path(),
        "cat > /dev/null\nprintf '{\"id\":1}\\n{\"id\":2}\\n{\"id\":3}\\n'\n",
    );

    let records = process(&engine(zq), Payload::from("[1,2,3]"), "yield {id:this}")
        .await
        .expect("process");

    assert_eq!(records, vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
    assert_eq!(call_count(dir.path()), 1);
}

// ---------------------------------------------------------------------------
// Test: a single array on stdout is returned element by element
// ---------------------------------------------------------------------------

#[tokio::test]
async fn array_output_is_returned_as_is() {
    let dir = tempfile::tempdir().expect("tempdir");
    let zq = fake_zq(dir.path(), "cat > /dev/null\necho '[{\"a\":1},{\"a\":2}]'\n");

    let records = process(&engine(zq), Payload::from("{}"), "pass")
        .await
        .expect("process");

    assert_eq!(records, vec![json!({"a": 1}), json!({"a": 2})]);
}

// ---------------------------------------------------------------------------
// Test: the payload reaches the engine on stdin in compact form
// ---------------------------------------------------------------------------

#[tokio::test]
async fn payload_is_piped_to_stdin() {
    let dir = tempfile::tempdir().expect("tempdir");
    let zq = fake_zq(dir.path(), "cat\n");

    let records = process(
        &engine(zq),
        Payload::Json(json!({"name": "Jane", "tags": ["x"]})),
        "pass",
    )
    .await
    .expect("process");

    assert_eq!(records, vec![json!({"name": "Jane", "tags": ["x"]})]);
}

// ---------------------------------------------------------------------------
// Test: blank query fails before any process is spawned
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blank_query_spawns_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let zq = fake_zq(dir.path(), "cat\n");

    let err = process(&engine(zq), Payload::from("{}"), "")
        .await
        .expect_err("should fail");

    assert!(matches!(err.kind(), QueryError::InvalidInput(_)));
    assert_eq!(call_count(dir.path()), 0);
}

// ---------------------------------------------------------------------------
// Test: non-zero exit carries the code and stderr unmodified
// ---------------------------------------------------------------------------

#[tokio::test]
async fn nonzero_exit_surfaces_code_and_diagnostics() {
    let dir = tempfile::tempdir().expect("tempdir");
    let zq = fake_zq(dir.path(), "printf 'bad query' >&2\nexit 2\n");

    let err = process(&engine(zq), Payload::from("{}"), "bogus |")
        .await
        .expect_err("should fail");

    match err.kind() {
        QueryError::ExecutionFailed { exit_code, stderr } => {
            assert_eq!(*exit_code, 2);
            assert_eq!(stderr, "bad query");
        }
        other => panic!("expected ExecutionFailed, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: stderr on a zero exit is only a warning
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stderr_with_zero_exit_still_returns_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let zq = fake_zq(
        dir.path(),
        "cat > /dev/null\necho 'note: deprecated flag' >&2\necho '{\"ok\":true}'\n",
    );

    let records = process(&engine(zq), Payload::from("{}"), "pass")
        .await
        .expect("process");

    assert_eq!(records, vec![json!({"ok": true})]);
}

// ---------------------------------------------------------------------------
// Test: malformed single-payload output is a parse failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn garbage_output_is_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let zq = fake_zq(
        dir.path(),
        "cat > /dev/null\necho 'garbage text with no JSON shape'\n",
    );

    let err = process(&engine(zq), Payload::from("{}"), "pass")
        .await
        .expect_err("should fail");

    assert!(matches!(
        err.kind(),
        QueryError::OutputParse { length: 31, .. }
    ));
}

// ---------------------------------------------------------------------------
// Test: missing engine binary reports the remediation hint
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_engine_reports_hint() {
    let err = process(
        &engine(PathBuf::from("/nonexistent/zq")),
        Payload::from("{}"),
        "pass",
    )
    .await
    .expect_err("should fail");

    assert!(matches!(err.kind(), QueryError::Spawn { .. }));
    assert!(err.to_string().contains("installed and on the search path"));
}

// ---------------------------------------------------------------------------
// Test: a hung engine is killed at the timeout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hung_engine_times_out() {
    let dir = tempfile::tempdir().expect("tempdir");
    let zq = fake_zq(dir.path(), "exec sleep 60\n");
    let engine = ZqEngine::new(EngineConfig {
        binary: zq,
        timeout: Some(Duration::from_millis(300)),
    });

    let err = process(&engine, Payload::from("{}"), "pass")
        .await
        .expect_err("should fail");

    assert!(matches!(err.kind(), QueryError::Timeout { .. }));
}

// ---------------------------------------------------------------------------
// Test: node execution emits one item per record
// ---------------------------------------------------------------------------

#[tokio::test]
async fn node_emits_items_for_upstream_batch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let zq = fake_zq(dir.path(), "cat > /dev/null\necho '{\"id\":1}'\necho '{\"id\":2}'\n");
    let node = QueryNode::new(engine(zq));

    let params = NodeParameters {
        json_data: Payload::from(r#"[{"id":1},{"id":2}]"#),
        zquery: "cut id".to_string(),
    };
    let upstream = vec![Item::from(json!({"trigger": true}))];

    let items = node.execute(&upstream, params).await.expect("execute");

    assert_eq!(
        items,
        vec![Item::from(json!({"id": 1})), Item::from(json!({"id": 2}))]
    );
}
