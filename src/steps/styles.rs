// src/steps/styles.rs

//! Stylesheet compilation into staging.
//!
//! Supports the flat subset of SCSS a small site needs: `$name: value;`
//! variables (later declarations shadow earlier ones), `//` line comments,
//! and plain CSS. Nested rules and mixins are passed through untouched.
//! Unbalanced braces and undefined variables are compile errors.

use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::debug;

use crate::artifact::{dest, ArtifactSet, RunReport};
use crate::orchestrator::BuildContext;

static VAR_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\$([A-Za-z_][\w-]*)\s*:\s*([^;]+);\s*$").expect("valid regex")
});

static VAR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([A-Za-z_][\w-]*)").expect("valid regex"));

pub fn compile_styles(ctx: &BuildContext) -> Result<RunReport> {
    let cfg = ctx.config();
    let mut report = RunReport::default();

    for record in ArtifactSet::source(ctx.fs(), &cfg.src_dir(), &cfg.paths().styles)? {
        let record = record?;
        if record.is_partial() {
            debug!(file = %record.relative_str(), "skipping partial");
            continue;
        }
        let rel = record.relative_str();
        let css = compile_scss(record.text()?).with_context(|| format!("compiling {rel}"))?;
        let out = record.with_contents(css).with_extension("css");
        report.push(dest(ctx.fs(), &cfg.temp_dir(), &out)?);
    }

    Ok(report)
}

/// Compile the supported SCSS subset to CSS.
pub fn compile_scss(source: &str) -> Result<String> {
    let mut vars: HashMap<String, String> = HashMap::new();
    let mut out = String::with_capacity(source.len());
    let mut depth: i64 = 0;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_line_comment(raw_line);

        if let Some(caps) = VAR_DECL.captures(line) {
            let value = substitute(caps[2].trim(), &vars, line_no)?;
            vars.insert(caps[1].to_string(), value);
            continue;
        }

        brace_delta(line, &mut depth, line_no)?;

        let line = substitute(line, &vars, line_no)?;
        if line.trim().is_empty() {
            continue;
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    if depth != 0 {
        bail!("unclosed block: expected {depth} more '}}'");
    }

    Ok(out)
}

fn substitute(text: &str, vars: &HashMap<String, String>, line_no: usize) -> Result<String> {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for caps in VAR_REF.captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always matches");
        let name = &caps[1];
        let value = vars
            .get(name)
            .with_context(|| format!("line {line_no}: undefined variable ${name}"))?;
        result.push_str(&text[last..whole.start()]);
        result.push_str(value);
        last = whole.end();
    }
    result.push_str(&text[last..]);
    Ok(result)
}

/// Drop a trailing `// comment`.
///
/// A comment only starts outside quoted strings, parentheses and
/// `/* ... */` blocks, so `url(//cdn/x.png)`, `url(http://x)` and
/// `"a // b"` are kept.
fn strip_line_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut parens = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' => parens += 1,
                b')' => parens = parens.saturating_sub(1),
                b'/' if bytes.get(i + 1) == Some(&b'*') => match line[i + 2..].find("*/") {
                    Some(end) => i += end + 3,
                    None => return line,
                },
                b'/' if parens == 0 && bytes.get(i + 1) == Some(&b'/') => return &line[..i],
                _ => {}
            },
        }
        i += 1;
    }
    line
}

/// Net brace depth change of a line, ignoring braces inside quoted strings.
fn brace_delta(line: &str, depth: &mut i64, line_no: usize) -> Result<()> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for ch in line.chars() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if ch == '\\' => escaped = true,
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '{' => *depth += 1,
                '}' => {
                    *depth -= 1;
                    if *depth < 0 {
                        bail!("line {line_no}: unexpected '}}'");
                    }
                }
                _ => {}
            },
        }
    }
    Ok(())
}
