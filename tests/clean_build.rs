// tests/clean_build.rs

mod common;
use crate::common::{init_tracing, real_context, with_timeout};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pageflow::errors::PageflowError;
use pageflow::fs::mock::MockFileSystem;
use pageflow::orchestrator::{self, BuildContext};
use pageflow_test_utils::builders::{write_file, write_site_fixture, ConfigFileBuilder};

fn site_data() -> toml::Value {
    let mut site = toml::map::Map::new();
    site.insert("title".to_string(), toml::Value::String("Demo".to_string()));
    toml::Value::Table(site)
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("reading {:?}: {e}", path.as_ref()))
}

/// Every file under `dir` with its contents, keyed by relative path.
fn snapshot(dir: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                let rel = path.strip_prefix(base).unwrap().to_path_buf();
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(dir, dir, &mut out);
    out
}

#[tokio::test]
async fn clean_on_fresh_project_succeeds() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let ctx = real_context(dir.path());

    let report = with_timeout(orchestrator::clean(&ctx)).await.expect("clean");

    assert!(report.is_empty());
    assert!(!dir.path().join("dist").exists());
}

#[tokio::test]
async fn clean_removes_output_and_staging() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "dist/index.html", "old");
    write_file(dir.path(), "temp/assets/styles/main.css", "old");
    write_file(dir.path(), "src/index.html", "keep");
    let ctx = real_context(dir.path());

    with_timeout(orchestrator::clean(&ctx)).await.expect("clean");

    assert!(!dir.path().join("dist").exists());
    assert!(!dir.path().join("temp").exists());
    assert!(dir.path().join("src/index.html").exists());
}

#[tokio::test]
async fn clean_reports_undeletable_output_directory() {
    init_tracing();
    let mock = MockFileSystem::new();
    mock.add_file("/site/dist/index.html", "old");
    mock.set_read_only("/site/dist");

    let cfg = ConfigFileBuilder::new("/site").build();
    let ctx = BuildContext::new(cfg, Arc::new(mock.clone()));

    let failure = with_timeout(orchestrator::clean(&ctx))
        .await
        .expect_err("clean should fail");

    assert_eq!(failure.step, "clean");
    match failure.cause.downcast_ref::<PageflowError>() {
        Some(PageflowError::Filesystem { path, source }) => {
            assert_eq!(path, Path::new("/site/dist"));
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        }
        other => panic!("expected Filesystem error, got {other:?}"),
    }
    assert!(mock.file_paths().contains(&PathBuf::from("/site/dist/index.html")));
}

#[tokio::test]
async fn build_produces_processed_site() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_site_fixture(dir.path());
    write_file(dir.path(), "dist/stale.html", "from a previous build");
    let cfg = ConfigFileBuilder::new(dir.path())
        .with_data("site", site_data())
        .build();
    let ctx = BuildContext::real(cfg);

    let report = with_timeout(orchestrator::build(&ctx)).await.expect("build");

    let dist = dir.path().join("dist");
    assert!(!dist.join("stale.html").exists(), "clean runs first");

    let html = read(dist.join("index.html"));
    assert!(html.contains("<h1>Demo</h1>"), "{html}");
    assert!(html.contains(r#"<link rel="stylesheet" href="assets/styles/bundle.css">"#));
    assert!(html.contains(r#"<script src="assets/scripts/bundle.js"></script>"#));
    assert!(!html.contains("build:css"));

    let css = read(dist.join("assets/styles/bundle.css"));
    assert!(css.contains("#336699"), "{css}");
    assert!(!css.contains("$brand"));

    let js = read(dist.join("assets/scripts/bundle.js"));
    assert!(js.contains("console.log('hello');"));
    assert!(!js.contains("// entry"));

    assert!(!dist.join("assets/styles/_vars.css").exists(), "partials are not emitted");
    assert_eq!(fs::read(dist.join("assets/images/logo.png")).unwrap(), [0x89, b'P', b'N', b'G']);
    assert!(dist.join("assets/fonts/site.woff2").exists());
    assert!(dist.join("favicon.ico").exists());

    assert!(dir.path().join("temp/index.html").exists(), "staging persists by default");
    assert!(report.written.contains(&dist.join("index.html")));
}

#[tokio::test]
async fn build_purges_staging_when_configured() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_site_fixture(dir.path());
    let cfg = ConfigFileBuilder::new(dir.path())
        .with_purge_staging(true)
        .build();
    let ctx = BuildContext::real(cfg);

    assert_eq!(
        orchestrator::build_graph(&ctx).step_names().last().map(String::as_str),
        Some("purge-staging")
    );

    with_timeout(orchestrator::build(&ctx)).await.expect("build");

    assert!(dir.path().join("dist/index.html").exists());
    assert!(!dir.path().join("temp").exists());
}

#[tokio::test]
async fn build_is_deterministic() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_site_fixture(dir.path());
    let ctx = real_context(dir.path());

    with_timeout(orchestrator::build(&ctx)).await.expect("first build");
    let first = snapshot(&dir.path().join("dist"));
    with_timeout(orchestrator::build(&ctx)).await.expect("second build");
    let second = snapshot(&dir.path().join("dist"));

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn style_error_fails_build_but_siblings_finish() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_site_fixture(dir.path());
    write_file(dir.path(), "src/assets/styles/broken.scss", "body {\n  color: red;\n");
    let ctx = real_context(dir.path());

    let failure = with_timeout(orchestrator::build(&ctx))
        .await
        .expect_err("build should fail");

    assert_eq!(failure.step, "styles");
    let message = format!("{:#}", failure.cause);
    assert!(message.contains("broken.scss"), "{message}");

    let dist = dir.path().join("dist");
    assert!(dist.join("assets/fonts/site.woff2").exists());
    assert!(dist.join("assets/images/logo.png").exists());
    assert!(!dist.join("index.html").exists(), "post-process must not run");
}

#[tokio::test]
async fn template_error_fails_pages_step() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/about.html", "{% if site.title %}<h1>unclosed</h1>\n");
    let ctx = real_context(dir.path());

    let failure = with_timeout(orchestrator::build(&ctx))
        .await
        .expect_err("build should fail");

    assert_eq!(failure.step, "pages");
    let message = format!("{:#}", failure.cause);
    assert!(message.contains("about.html"), "{message}");
    assert!(!dir.path().join("dist/about.html").exists());
}

#[tokio::test]
async fn unresolved_bundle_reference_fails_post_process() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "src/index.html",
        "<!-- build:js js/app.js --><script src=\"missing.js\"></script><!-- endbuild -->",
    );
    let ctx = real_context(dir.path());

    let failure = with_timeout(orchestrator::build(&ctx))
        .await
        .expect_err("build should fail");

    assert_eq!(failure.step, "post-process");
    assert!(format!("{:#}", failure.cause).contains("missing.js"));
}

#[tokio::test]
async fn build_through_in_memory_filesystem() {
    init_tracing();
    let mock = MockFileSystem::new();
    mock.add_file("/site/src/about.html", "<p>{{ owner }}</p>\n");
    mock.add_file("/site/src/assets/scripts/app.js", "let a = 1;\n");
    mock.add_file("/site/public/robots.txt", "User-agent: *\n");

    let cfg = ConfigFileBuilder::new("/site").with_data("owner", "Ada").build();
    let ctx = BuildContext::new(cfg, Arc::new(mock.clone()));

    with_timeout(orchestrator::build(&ctx)).await.expect("build");

    let files = mock.file_paths();
    for expected in [
        "/site/dist/about.html",
        "/site/dist/assets/scripts/app.js",
        "/site/dist/robots.txt",
        "/site/temp/about.html",
    ] {
        assert!(files.contains(&PathBuf::from(expected)), "missing {expected}: {files:?}");
    }
    let about = {
        use pageflow::fs::FileSystem;
        mock.read(Path::new("/site/dist/about.html")).unwrap()
    };
    assert_eq!(String::from_utf8(about).unwrap(), "<p>Ada</p>");
}
