// tests/config_errors.rs

use std::path::Path;

use clap::Parser;
use pageflow::cli::{CliArgs, Command};
use pageflow::config::{default_config_path, load_and_validate, ConfigFile, RawConfigFile};
use pageflow::errors::PageflowError;
use pageflow_test_utils::builders::write_file;

fn parse(toml_src: &str) -> RawConfigFile {
    toml::from_str(toml_src).expect("valid TOML")
}

fn expect_config_error(toml_src: &str, needle: &str) {
    let raw = parse(toml_src);
    match ConfigFile::from_raw(raw, "/site") {
        Err(PageflowError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "expected '{needle}' in '{msg}'");
        }
        other => panic!("expected ConfigError containing '{needle}', got {other:?}"),
    }
}

#[test]
fn empty_file_uses_defaults() {
    let cfg = ConfigFile::from_raw(parse(""), "/site").unwrap();

    assert_eq!(cfg.src_dir(), Path::new("/site/src"));
    assert_eq!(cfg.dist_dir(), Path::new("/site/dist"));
    assert_eq!(cfg.temp_dir(), Path::new("/site/temp"));
    assert_eq!(cfg.public_dir(), Path::new("/site/public"));
    assert!(!cfg.purge_staging());
    assert_eq!(cfg.paths().styles, "assets/styles/*.scss");
    assert_eq!(cfg.paths().html, "*.html");
    assert_eq!(cfg.server().port, 3000);
    assert_eq!(
        cfg.server().routes.get("/node_modules").map(String::as_str),
        Some("node_modules")
    );
}

#[test]
fn full_file_round_trips_into_config() {
    let cfg = ConfigFile::from_raw(
        parse(
            r#"
            [build]
            src = "site"
            dist = "out"
            temp = ".staging"
            purge_staging = true

            [build.paths]
            styles = "css/*.scss"

            [data]
            title = "Hello"

            [data.site]
            year = 2024

            [server]
            port = 8080
            "#,
        ),
        "/p",
    )
    .unwrap();

    assert_eq!(cfg.src_dir(), Path::new("/p/site"));
    assert_eq!(cfg.dist_dir(), Path::new("/p/out"));
    assert!(cfg.purge_staging());
    assert_eq!(cfg.paths().styles, "css/*.scss");
    assert_eq!(cfg.paths().scripts, "assets/scripts/*.js");
    assert_eq!(cfg.data()["title"].as_str(), Some("Hello"));
    assert_eq!(cfg.server().port, 8080);
}

#[test]
fn output_equal_to_staging_is_rejected() {
    expect_config_error("[build]\ndist = \"out\"\ntemp = \"./out/\"\n", "must differ");
}

#[test]
fn output_inside_source_is_rejected() {
    expect_config_error("[build]\ndist = \"src/dist\"\n", "must not be inside [build].src");
}

#[test]
fn output_at_project_root_is_rejected() {
    expect_config_error("[build]\ndist = \".\"\n", "dist");
}

#[test]
fn empty_directory_name_is_rejected() {
    expect_config_error("[build]\nsrc = \"  \"\n", "[build].src must not be empty");
}

#[test]
fn invalid_glob_is_rejected() {
    expect_config_error("[build.paths]\nstyles = \"assets/[styles\"\n", "[build.paths].styles");
}

#[test]
fn zero_port_is_rejected() {
    expect_config_error("[server]\nport = 0\n", "[server].port");
}

#[test]
fn route_without_leading_slash_is_rejected() {
    expect_config_error("[server.routes]\n\"vendor\" = \"node_modules\"\n", "must start with '/'");
}

#[test]
fn unknown_toml_syntax_is_a_toml_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "pages.toml", "[build\nsrc = ");

    match load_and_validate(&path) {
        Err(PageflowError::Toml(_)) => {}
        other => panic!("expected Toml error, got {other:?}"),
    }
}

#[test]
fn missing_config_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pages.toml");

    match load_and_validate(&path) {
        Err(PageflowError::Filesystem { path: p, source }) => {
            assert_eq!(p, path);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected Filesystem error, got {other:?}"),
    }
}

#[test]
fn directories_resolve_against_config_location() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "site/pages.toml", "[build]\ndist = \"public_html\"\n");

    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(cfg.root(), dir.path().join("site"));
    assert_eq!(cfg.dist_dir(), dir.path().join("site/public_html"));
}

#[test]
fn cli_config_defaults_to_pages_toml() {
    let args = CliArgs::try_parse_from(["pageflow", "build"]).unwrap();
    assert_eq!(args.command, Command::Build);
    assert_eq!(args.config, default_config_path());
    assert_eq!(args.config, Path::new("pages.toml"));

    let args = CliArgs::try_parse_from(["pageflow", "dev", "--config", "site/pages.toml"]).unwrap();
    assert_eq!(args.config, Path::new("site/pages.toml"));
}
