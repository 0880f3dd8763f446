use routetree_rs::dispatcher::ArtifactStore;
use routetree_rs::{
    Dispatcher, DispatcherOptions, FileArtifactStore, HttpMethod, MatchResult, MemoryArtifactStore,
    MethodSet, Route,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn routes() -> Vec<Route> {
    vec![
        Route::new(HttpMethod::Get.into(), "/users", "users.index").unwrap(),
        Route::new(HttpMethod::Get.into(), "/users/{id:\\d+}", "users.show").unwrap(),
        Route::new(HttpMethod::Post.into(), "/users", "users.create").unwrap(),
        Route::new(HttpMethod::Get.into(), "/files/{name}.{ext}", "files.show").unwrap(),
    ]
}

fn scratch_dir(tag: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    std::env::temp_dir().join(format!("routetree-it-{tag}-{}-{nanos}", std::process::id()))
}

fn assert_serves_routes(dispatcher: &Dispatcher) {
    let show = dispatcher.dispatch(HttpMethod::Get, "/users/42").unwrap();
    assert_eq!(show.route().map(|r| r.as_ref()), Some("users.show"));
    assert_eq!(show.param("id"), Some("42"));

    let file = dispatcher.dispatch(HttpMethod::Get, "/files/a.tar").unwrap();
    assert_eq!(file.param("name"), Some("a"));
    assert_eq!(file.param("ext"), Some("tar"));

    match dispatcher.dispatch(HttpMethod::Delete, "/users").unwrap() {
        MatchResult::MethodNotAllowed { allowed } => {
            assert_eq!(allowed, MethodSet::GET | MethodSet::POST)
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn store_when_empty_then_builds_and_persists_program() {
    let store = Arc::new(MemoryArtifactStore::new());
    let dispatcher =
        Dispatcher::with_store(routes(), DispatcherOptions::default(), store.clone()).unwrap();

    dispatcher.warm().unwrap();

    assert_eq!(dispatcher.build_count(), 1);
    assert_eq!(dispatcher.cache_stats().snapshot(), (0, 1));
    assert!(store.load(dispatcher.fingerprint()).unwrap().is_some());
    assert_serves_routes(&dispatcher);
}

#[test]
fn store_when_program_present_then_skips_compilation() {
    let store = Arc::new(MemoryArtifactStore::new());
    let first =
        Dispatcher::with_store(routes(), DispatcherOptions::default(), store.clone()).unwrap();
    first.warm().unwrap();

    let second =
        Dispatcher::with_store(routes(), DispatcherOptions::default(), store.clone()).unwrap();
    assert_eq!(first.fingerprint(), second.fingerprint());
    second.warm().unwrap();

    assert_eq!(second.build_count(), 0);
    assert_eq!(second.cache_stats().snapshot(), (1, 0));
    assert_serves_routes(&second);
}

#[test]
fn store_when_routes_change_then_fingerprint_misses() {
    let store = Arc::new(MemoryArtifactStore::new());
    let first =
        Dispatcher::with_store(routes(), DispatcherOptions::default(), store.clone()).unwrap();
    first.warm().unwrap();

    let mut changed = routes();
    changed.push(Route::new(HttpMethod::Delete.into(), "/users/{id}", "users.destroy").unwrap());
    let second = Dispatcher::with_store(changed, DispatcherOptions::default(), store.clone()).unwrap();

    assert_ne!(first.fingerprint(), second.fingerprint());
    second.warm().unwrap();
    assert_eq!(second.build_count(), 1);
    assert_eq!(store.len(), 2);
}

#[test]
fn store_when_entry_corrupt_then_rebuilds_and_overwrites() {
    let store = Arc::new(MemoryArtifactStore::new());
    let dispatcher =
        Dispatcher::with_store(routes(), DispatcherOptions::default(), store.clone()).unwrap();
    store
        .store(dispatcher.fingerprint(), "{\"version\":1,\"nodes\":")
        .unwrap();

    dispatcher.warm().unwrap();

    assert_eq!(dispatcher.build_count(), 1);
    assert_eq!(dispatcher.cache_stats().rejected(), 1);
    assert_eq!(dispatcher.cache_stats().snapshot(), (0, 1));
    let rewritten = store.load(dispatcher.fingerprint()).unwrap().unwrap();
    assert!(rewritten.starts_with('{'));
    assert!(rewritten.contains("\"version\":1"));
    assert_serves_routes(&dispatcher);
}

#[test]
fn store_when_entry_has_other_version_then_rebuilds() {
    let store = Arc::new(MemoryArtifactStore::new());
    let seed =
        Dispatcher::with_store(routes(), DispatcherOptions::default(), store.clone()).unwrap();
    seed.warm().unwrap();
    let stored = store.load(seed.fingerprint()).unwrap().unwrap();
    store
        .store(seed.fingerprint(), &stored.replacen("\"version\":1", "\"version\":99", 1))
        .unwrap();

    let dispatcher =
        Dispatcher::with_store(routes(), DispatcherOptions::default(), store.clone()).unwrap();
    dispatcher.warm().unwrap();

    assert_eq!(dispatcher.build_count(), 1);
    assert_eq!(dispatcher.cache_stats().rejected(), 1);
}

#[test]
fn file_store_when_reopened_then_serves_without_building() {
    let dir = scratch_dir("reopen");
    let key;
    {
        let store = Arc::new(FileArtifactStore::new(&dir).unwrap());
        let dispatcher =
            Dispatcher::with_store(routes(), DispatcherOptions::default(), store.clone()).unwrap();
        dispatcher.warm().unwrap();
        key = dispatcher.fingerprint().to_string();
        assert!(store.path_for(&key).exists());
    }

    let store = Arc::new(FileArtifactStore::new(&dir).unwrap());
    let dispatcher = Dispatcher::with_store(routes(), DispatcherOptions::default(), store).unwrap();
    assert_eq!(dispatcher.fingerprint(), key);
    assert_serves_routes(&dispatcher);
    assert_eq!(dispatcher.build_count(), 0);
    assert_eq!(dispatcher.cache_stats().snapshot(), (1, 0));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn invalidate_artifact_when_stored_then_next_dispatcher_rebuilds() {
    let store = Arc::new(MemoryArtifactStore::new());
    let first =
        Dispatcher::with_store(routes(), DispatcherOptions::default(), store.clone()).unwrap();
    first.warm().unwrap();

    assert!(first.invalidate_artifact().unwrap());
    assert!(!first.invalidate_artifact().unwrap());
    assert!(store.is_empty());

    let second =
        Dispatcher::with_store(routes(), DispatcherOptions::default(), store.clone()).unwrap();
    second.warm().unwrap();
    assert_eq!(second.build_count(), 1);
}

#[test]
fn invalidate_artifact_when_no_store_then_reports_nothing_removed() {
    let dispatcher = Dispatcher::new(routes(), DispatcherOptions::default()).unwrap();
    assert!(!dispatcher.invalidate_artifact().unwrap());
}
