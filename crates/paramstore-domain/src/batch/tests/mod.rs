//! Tests for the batch executor.


use std::time::Duration;

use paramstore_storage::{ParameterType, StorageError, StoredParameter};

use self::mocks::{Call, ScriptedStore};
use super::*;
use crate::error::{ErrorKind, ParameterError};
use crate::model::Parameter;

// ============================================================
// Test Helpers
// ============================================================

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn size(n: usize) -> BatchSize {
    BatchSize::new(n).unwrap()
}

/// The three parameters used across most tests.
fn seeded_store() -> ScriptedStore {
    ScriptedStore::new()
        .with_parameter("/hello", "this is (possibly) hidden", ParameterType::SecureString)
        .with_parameter("/world", "this is plain text", ParameterType::String)
        .with_parameter("/test", "this,is,a,comma,list", ParameterType::StringList)
}

fn fetch_windows(store: &ScriptedStore) -> Vec<Vec<String>> {
    store
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Fetch { names, .. } => Some(names),
            _ => None,
        })
        .collect()
}

// ============================================================
// Fetch
// ============================================================

#[tokio::test]
async fn test_fetch_empty_input_makes_no_calls() {
    let store = seeded_store();
    let ctx = CallContext::new();
    let executor = BatchExecutor::new(&store, size(10), &ctx);

    let outcome = executor.fetch(&[], true).await;

    assert!(outcome.items.is_empty());
    assert!(outcome.error().is_none());
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_fetch_across_windows_preserves_window_order() {
    let store = seeded_store();
    let ctx = CallContext::new();
    let executor = BatchExecutor::new(&store, size(2), &ctx);

    let outcome = executor
        .fetch(&names(&["/hello", "/world", "/test"]), true)
        .await;

    assert!(outcome.is_success());
    let got: Vec<&str> = outcome.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(got, ["/hello", "/world", "/test"]);
    assert_eq!(
        fetch_windows(&store),
        vec![names(&["/hello", "/world"]), names(&["/test"])]
    );
    assert_eq!(outcome.items[2].parameter_type, ParameterType::StringList);
}

#[tokio::test]
async fn test_fetch_forwards_decryption_flag() {
    let store = seeded_store();
    let ctx = CallContext::new();
    let executor = BatchExecutor::new(&store, size(10), &ctx);

    executor.fetch(&names(&["/hello"]), false).await;

    assert_eq!(
        store.calls(),
        vec![Call::Fetch {
            names: names(&["/hello"]),
            with_decryption: false,
        }]
    );
}

#[tokio::test]
async fn test_fetch_reports_invalid_names() {
    let store = seeded_store();
    let ctx = CallContext::new();
    let executor = BatchExecutor::new(&store, size(10), &ctx);

    let outcome = executor.fetch(&names(&["/hello", "/missing"]), true).await;

    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.items[0].name, "/hello");
    let errors = outcome.error().expect("aggregate error");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0], ParameterError::invalid("/missing"));
}

#[tokio::test]
async fn test_fetch_failed_window_does_not_stop_later_windows() {
    let store = seeded_store().failing_call(0);
    let ctx = CallContext::new();
    let executor = BatchExecutor::new(&store, size(1), &ctx);

    let outcome = executor
        .fetch(&names(&["/hello", "/world", "/test"]), true)
        .await;

    assert_eq!(fetch_windows(&store).len(), 3);
    let got: Vec<&str> = outcome.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(got, ["/world", "/test"]);

    let errors = outcome.error().expect("aggregate error");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].kind(), ErrorKind::Transport);
    assert_eq!(errors.errors()[0].names(), names(&["/hello"]).as_slice());
}

#[tokio::test]
async fn test_fetch_errors_follow_window_order() {
    // window 0 reports an invalid name, window 1 fails outright
    let store = seeded_store().failing_call(1);
    let ctx = CallContext::new();
    let executor = BatchExecutor::new(&store, size(2), &ctx);

    let outcome = executor
        .fetch(&names(&["/hello", "/nope", "/world"]), true)
        .await;

    let kinds: Vec<ErrorKind> = outcome.errors.iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, [ErrorKind::InvalidItem, ErrorKind::Transport]);
    assert_eq!(outcome.items.len(), 1);
}

#[tokio::test]
async fn test_fetch_normalizes_absent_value() {
    let store = ScriptedStore::new().with_stored(StoredParameter {
        name: "/empty".to_string(),
        value: None,
        parameter_type: ParameterType::String,
    });
    let ctx = CallContext::new();
    let executor = BatchExecutor::new(&store, size(10), &ctx);

    let outcome = executor.fetch(&names(&["/empty"]), false).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.items, vec![Parameter::new("/empty", "")]);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_stops_after_interrupted_window() {
    let store = seeded_store().hanging_call(1);
    let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
    let executor = BatchExecutor::new(&store, size(1), &ctx);

    let outcome = executor
        .fetch(&names(&["/hello", "/world", "/test"]), true)
        .await;

    // first window kept, second interrupted, third never attempted
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(fetch_windows(&store).len(), 2);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors.is_interrupted());
    assert!(matches!(
        &outcome.errors.errors()[0],
        ParameterError::Transport {
            source: StorageError::DeadlineExceeded,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_call_keeps_finished_windows() {
    let store = seeded_store().hanging_call(1);
    let ctx = CallContext::new();
    let token = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    });
    let executor = BatchExecutor::new(&store, size(1), &ctx);

    let outcome = executor
        .fetch(&names(&["/hello", "/world", "/test"]), true)
        .await;

    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.items[0].name, "/hello");
    assert_eq!(fetch_windows(&store).len(), 2);
    assert_eq!(outcome.errors.len(), 1);
    assert!(matches!(
        &outcome.errors.errors()[0],
        ParameterError::Transport {
            source: StorageError::Cancelled,
            ..
        }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_window_does_not_stop_fetch() {
    let store = seeded_store().hanging_call(1);
    let ctx = CallContext::new().with_call_timeout(Duration::from_secs(1));
    let executor = BatchExecutor::new(&store, size(1), &ctx);

    let outcome = executor
        .fetch(&names(&["/hello", "/world", "/test"]), true)
        .await;

    assert_eq!(outcome.items.len(), 2);
    assert_eq!(fetch_windows(&store).len(), 3);
    assert_eq!(outcome.errors.len(), 1);
    assert!(!outcome.errors.is_interrupted());
    assert!(matches!(
        &outcome.errors.errors()[0],
        ParameterError::Transport {
            source: StorageError::Timeout { timeout_ms: 1000 },
            names,
        } if names == &["/world"]
    ));
}

#[tokio::test]
async fn test_fetch_with_cancelled_context_records_single_error() {
    let store = seeded_store();
    let ctx = CallContext::new();
    ctx.cancel();
    let executor = BatchExecutor::new(&store, size(1), &ctx);

    let outcome = executor.fetch(&names(&["/hello", "/world"]), true).await;

    assert!(store.calls().is_empty());
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors.is_interrupted());
}

// ============================================================
// Write
// ============================================================

#[tokio::test]
async fn test_write_attempts_every_parameter() {
    let store = ScriptedStore::new().failing_call(1);
    let ctx = CallContext::new();
    let executor = BatchExecutor::new(&store, size(10), &ctx);

    let parameters = vec![
        Parameter::new("/a", "1"),
        Parameter::new("/b", "2"),
        Parameter::new("/c", "3"),
    ];
    let outcome = executor.write(&parameters, None).await;

    assert_eq!(store.calls().len(), 3);
    assert_eq!(outcome.items, names(&["/a", "/c"]));
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors.errors()[0].names(), names(&["/b"]).as_slice());
}

#[tokio::test]
async fn test_write_is_not_chunked_and_forwards_key_id() {
    let store = ScriptedStore::new();
    let ctx = CallContext::new();
    // batch size is irrelevant for writes
    let executor = BatchExecutor::new(&store, size(2), &ctx);

    let parameters: Vec<Parameter> = (0..5)
        .map(|i| {
            Parameter::new(format!("/p{i}"), "v")
                .with_type(ParameterType::SecureString)
                .with_overwrite(true)
        })
        .collect();
    let outcome = executor.write(&parameters, Some("alias/app")).await;

    assert!(outcome.is_success());
    let calls = store.calls();
    assert_eq!(calls.len(), 5);
    for call in calls {
        let request = match call {
            Call::Write(request) => request,
            other => panic!("unexpected call: {other:?}"),
        };
        assert_eq!(request.key_id.as_deref(), Some("alias/app"));
        assert_eq!(request.parameter_type, ParameterType::SecureString);
        assert!(request.overwrite);
    }
}

// ============================================================
// Delete
// ============================================================

#[tokio::test]
async fn test_delete_eleven_names_uses_two_calls() {
    let store = ScriptedStore::new();
    let ctx = CallContext::new();
    let executor = BatchExecutor::new(&store, size(10), &ctx);

    let requested: Vec<String> = (0..11).map(|i| format!("/p{i}")).collect();
    executor.delete(&requested).await;

    let windows: Vec<usize> = store
        .calls()
        .into_iter()
        .map(|c| match c {
            Call::Delete { names } => names.len(),
            other => panic!("unexpected call: {other:?}"),
        })
        .collect();
    assert_eq!(windows, [10, 1]);
}

#[tokio::test]
async fn test_delete_aggregates_invalid_and_failed_windows() {
    let store = seeded_store().failing_call(1);
    let ctx = CallContext::new();
    let executor = BatchExecutor::new(&store, size(2), &ctx);

    let outcome = executor
        .delete(&names(&["/hello", "/gone", "/world", "/test"]))
        .await;

    assert_eq!(outcome.items, names(&["/hello"]));
    assert_eq!(outcome.errors.count_of(ErrorKind::InvalidItem), 1);
    assert_eq!(outcome.errors.count_of(ErrorKind::Transport), 1);
    assert_eq!(outcome.errors.invalid_names().collect::<Vec<_>>(), ["/gone"]);
}
