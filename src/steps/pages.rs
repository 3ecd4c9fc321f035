// src/steps/pages.rs

//! Page templating into staging.
//!
//! Pages are Jinja-style templates rendered with `minijinja` against the
//! `[data]` table, so `{{ site.title }}`, `{% for %}`, `{% if %}` and the
//! builtin filters are available. Unknown keys, including attribute lookups
//! on them, render as empty strings.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use minijinja::{Environment, UndefinedBehavior};

use crate::artifact::{dest, ArtifactSet, RunReport};
use crate::orchestrator::BuildContext;

/// Render pages matching `paths.html` into `temp`.
pub fn render_pages(ctx: &BuildContext) -> Result<RunReport> {
    let cfg = ctx.config();
    let mut report = RunReport::default();

    for record in ArtifactSet::source(ctx.fs(), &cfg.src_dir(), &cfg.paths().html)? {
        let record = record?;
        let rel = record.relative_str();
        let html = render_template(record.text()?, cfg.data())
            .with_context(|| format!("rendering {rel}"))?;
        report.push(dest(ctx.fs(), &cfg.temp_dir(), &record.with_contents(html))?);
    }

    Ok(report)
}

/// Render one template against `data`.
///
/// Syntax and render errors are returned with the template line attached
/// as the error's source.
pub fn render_template(template: &str, data: &BTreeMap<String, toml::Value>) -> Result<String> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    env.set_keep_trailing_newline(true);

    env.add_template("page", template)
        .context("template parse error")?;
    let tmpl = env.get_template("page").context("template not found")?;

    let context: BTreeMap<&str, toml::Value> = data
        .iter()
        .map(|(key, value)| (key.as_str(), plain_value(value)))
        .collect();
    let rendered = tmpl
        .render(minijinja::Value::from_serialize(&context))
        .context("template render error")?;
    Ok(rendered)
}

/// TOML datetimes serialize as a private wrapper table; templates see them
/// as their string form.
fn plain_value(value: &toml::Value) -> toml::Value {
    match value {
        toml::Value::Datetime(d) => toml::Value::String(d.to_string()),
        toml::Value::Array(items) => toml::Value::Array(items.iter().map(plain_value).collect()),
        toml::Value::Table(table) => toml::Value::Table(
            table
                .iter()
                .map(|(key, value)| (key.clone(), plain_value(value)))
                .collect(),
        ),
        other => other.clone(),
    }
}
