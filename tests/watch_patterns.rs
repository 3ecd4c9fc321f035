// tests/watch_patterns.rs

mod common;
use crate::common::{init_tracing, real_context, with_timeout};

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tokio::sync::mpsc;

use pageflow::engine::RuntimeEvent;
use pageflow::orchestrator::dev_bindings;
use pageflow::watch::event_handler::{matching_bindings, process_event};
use pageflow::watch::spawn_watcher;
use pageflow_test_utils::builders::write_file;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn dev_registers_expected_bindings() -> TestResult {
    let ctx = real_context(Path::new("/site"));
    let bindings = dev_bindings(&ctx)?;

    let names: Vec<&str> = bindings.iter().map(|b| b.name()).collect();
    assert_eq!(names, vec!["styles", "scripts", "pages", "assets", "public"]);

    let reload_only: Vec<bool> = bindings.iter().map(|b| b.is_reload_only()).collect();
    assert_eq!(reload_only, vec![false, false, false, true, true]);

    assert_eq!(bindings[0].base_dir(), Path::new("/site/src"));
    assert_eq!(bindings[4].base_dir(), Path::new("/site/public"));
    Ok(())
}

#[test]
fn binding_patterns_respect_path_separators() -> TestResult {
    let ctx = real_context(Path::new("/site"));
    let bindings = dev_bindings(&ctx)?;
    let (styles, pages, assets, public) = (&bindings[0], &bindings[2], &bindings[3], &bindings[4]);

    assert!(styles.matches("assets/styles/main.scss"));
    assert!(!styles.matches("assets/styles/nested/main.scss"));
    assert!(!styles.matches("assets/styles/main.css"));

    assert!(pages.matches("index.html"));
    assert!(!pages.matches("partials/header.html"));

    assert!(assets.matches("assets/images/icons/logo.svg"));
    assert!(assets.matches("assets/fonts/site.woff2"));
    assert!(!assets.matches("assets/scripts/main.js"));

    assert!(public.matches("favicon.ico"));
    assert!(public.matches("deep/nested/file.txt"));
    assert!(!public.matches(""));
    Ok(())
}

#[test]
fn changed_path_maps_to_every_matching_binding() -> TestResult {
    let ctx = real_context(Path::new("/site"));
    let bindings = dev_bindings(&ctx)?;

    let hits = matching_bindings(&bindings, Path::new("/site/src/assets/styles/main.scss"));
    assert_eq!(hits, vec![(0, "assets/styles/main.scss".to_string())]);

    let hits = matching_bindings(&bindings, Path::new("/site/public/robots.txt"));
    assert_eq!(hits, vec![(4, "robots.txt".to_string())]);

    let hits = matching_bindings(&bindings, Path::new("/elsewhere/index.html"));
    assert!(hits.is_empty());
    Ok(())
}

#[tokio::test]
async fn notify_events_become_change_notifications() -> TestResult {
    init_tracing();
    let ctx = real_context(Path::new("/site"));
    let bindings = dev_bindings(&ctx)?;
    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(16);

    let event = Event::new(EventKind::Modify(ModifyKind::Any))
        .add_path("/site/src/assets/scripts/main.js".into())
        .add_path("/site/src/about.html".into());
    assert!(process_event(&bindings, &event, &tx).await);

    let removed = Event::new(EventKind::Remove(RemoveKind::File))
        .add_path("/site/src/assets/images/old.png".into());
    assert!(process_event(&bindings, &removed, &tx).await);

    drop(tx);
    let mut received = Vec::new();
    while let Some(ev) = rx.recv().await {
        match ev {
            RuntimeEvent::Changed { binding, path } => received.push((binding, path)),
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert_eq!(
        received,
        vec![
            (1, "assets/scripts/main.js".to_string()),
            (2, "about.html".to_string()),
            (3, "assets/images/old.png".to_string()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn access_events_are_ignored() -> TestResult {
    init_tracing();
    let ctx = real_context(Path::new("/site"));
    let bindings = dev_bindings(&ctx)?;
    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(16);

    let event = Event::new(EventKind::Access(AccessKind::Any)).add_path("/site/src/index.html".into());
    assert!(process_event(&bindings, &event, &tx).await);

    drop(tx);
    assert!(rx.recv().await.is_none());
    Ok(())
}

#[tokio::test]
async fn closed_runtime_channel_stops_processing() -> TestResult {
    let ctx = real_context(Path::new("/site"));
    let bindings = dev_bindings(&ctx)?;
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    drop(rx);

    let event = Event::new(EventKind::Create(CreateKind::File)).add_path("/site/src/index.html".into());
    assert!(!process_event(&bindings, &event, &tx).await);
    Ok(())
}

#[tokio::test]
async fn watcher_skips_missing_directories_and_reports_changes() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("src"))?;
    let ctx = real_context(dir.path());
    let bindings = Arc::new(dev_bindings(&ctx)?);
    let (tx, mut rx) = mpsc::channel::<RuntimeEvent>(64);

    let handle = spawn_watcher(Arc::clone(&bindings), tx)?;
    assert_eq!(handle.watched_dirs(), &[dir.path().join("src")]);

    write_file(dir.path(), "src/index.html", "<h1>hi</h1>");

    let event = with_timeout(async {
        loop {
            match rx.recv().await {
                Some(RuntimeEvent::Changed { binding, path }) if binding == 2 => break path,
                Some(_) => continue,
                None => panic!("watcher channel closed"),
            }
        }
    })
    .await;

    assert_eq!(event, "index.html");
    Ok(())
}
