use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tracing_subscriber::fmt::MakeWriter;

use super::*;
use crate::traverse::traverse;

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log buffer")).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn root_path_is_empty() {
    let mut port = 0u16;
    assign_path(&mut port, "", "8080").expect("root node");
    assert_eq!(port, 8080);
}

#[test]
fn sequence_elements_by_index() {
    let mut hosts = vec!["a".to_string(), "b".to_string()];
    assign_path(&mut hosts, "[1]", "c").expect("second element");
    assert_eq!(hosts, vec!["a", "c"]);

    let err = assign_path(&mut hosts, "[2]", "d").expect_err("past the end");
    assert!(matches!(err, ReflectError::UnknownPath(p) if p == "[2]"));
}

#[test]
fn map_values_by_key() {
    let mut limits = BTreeMap::from([("burst".to_string(), Duration::ZERO)]);
    assign_path(&mut limits, "[burst]", "250ms").expect("existing key");
    assert_eq!(limits["burst"], Duration::from_millis(250));

    assign_path(&mut limits, "[rate]", "1s").expect_err("keys are not created");
}

#[test]
fn pointees_are_reached_through_set_pointers() {
    let mut retries: Option<Vec<u8>> = Some(vec![0]);
    assign_path(&mut retries, "*()[0]", "3").expect("element behind pointer");
    assert_eq!(retries, Some(vec![3]));

    let mut unset: Option<Vec<u8>> = None;
    assign_path(&mut unset, "*()[0]", "3").expect_err("nil pointer is a leaf");
    assert_eq!(unset, None);
}

#[test]
fn parse_errors_pass_through() {
    let mut ports = vec![0u16];
    let err = assign_path(&mut ports, "[0]", "65536").expect_err("out of range");
    assert!(matches!(err, ReflectError::Parse { .. }));
    assert_eq!(ports, vec![0]);
}

#[test]
fn several_paths_apply_in_order() {
    let mut weights = vec![0i32; 3];
    assign_paths(&mut weights, [("[0]", "1"), ("[2]", "3"), ("[0]", "5")]).expect("all paths exist");
    assert_eq!(weights, vec![5, 0, 3]);

    let err = assign_paths(
        &mut weights,
        vec![("[1]".to_string(), "7".to_string()), ("[9]".to_string(), "9".to_string()), ("[2]".to_string(), "0".to_string())],
    )
    .expect_err("second path is unknown");
    assert!(matches!(err, ReflectError::UnknownPath(_)));
    assert_eq!(weights, vec![5, 7, 3]);
}

#[test]
fn only_the_first_matching_node_is_bound() {
    let mut by_file = BTreeMap::from([(PathBuf::from("/a"), 0u8), (PathBuf::from("/b"), 0)]);
    assign_path(&mut by_file, "[]", "5").expect("keys render as []");
    assert_eq!(by_file[&PathBuf::from("/a")], 5);
    assert_eq!(by_file[&PathBuf::from("/b")], 0);
}

#[test]
fn successful_binds_do_not_look_like_stopped_walks() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(logs.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut weights = vec![0i32; 2];
        assign_paths(&mut weights, [("[0]", "1"), ("[1]", "2")]).expect("all paths exist");
        assign_path(&mut weights, "[1]", "x").expect_err("not a number");
        assign_path(&mut weights, "[5]", "1").expect_err("past the end");
        assert_eq!(weights, vec![1, 2]);
    });
    let text = logs.text();
    assert!(text.contains("assigning path"), "{text}");
    assert!(!text.contains("traversal stopped by callback"), "{text}");

    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(logs.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        traverse(&vec![1u8], |_, _, _| Err("stop")).expect_err("callback fails");
    });
    assert!(logs.text().contains("traversal stopped by callback"));
}
