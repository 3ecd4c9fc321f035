// src/steps/minify.rs

//! Conservative minifiers used by post-processing.
//!
//! These only remove comments and redundant whitespace; they never rename or
//! restructure code. String literals, template literals and the bodies of
//! `<script>`, `<style>`, `<pre>` and `<textarea>` are left byte-for-byte.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::ContentKind;

static CSS_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)/\*.*?\*/|"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'"#).expect("valid regex")
});
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static CSS_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([{};,>])\s*").expect("valid regex"));
static HTML_RAW_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)<script\b[^>]*>.*?</script\s*>",
        r"|<style\b[^>]*>.*?</style\s*>",
        r"|<pre\b[^>]*>.*?</pre\s*>",
        r"|<textarea\b[^>]*>.*?</textarea\s*>",
    ))
    .expect("valid regex")
});
static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("valid regex"));
static BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("valid regex"));

/// Minify `text` according to `kind`; `Other` is returned unchanged.
pub fn minify(kind: ContentKind, text: &str) -> String {
    match kind {
        ContentKind::Css => minify_css(text),
        ContentKind::Js => minify_js(text),
        ContentKind::Html => minify_html(text),
        ContentKind::Other => text.to_string(),
    }
}

/// Spans lifted out of a document before whitespace collapsing and put back
/// afterwards. Markers contain no whitespace or punctuation the collapsing
/// passes touch.
struct Shelf {
    open: &'static str,
    close: &'static str,
    kept: Vec<String>,
}

impl Shelf {
    fn new(open: &'static str, close: &'static str) -> Self {
        Self { open, close, kept: Vec::new() }
    }

    fn marker(&self, index: usize) -> String {
        format!("{}\u{1}{index}\u{1}{}", self.open, self.close)
    }

    fn stash(&mut self, text: &str) -> String {
        self.kept.push(text.to_string());
        self.marker(self.kept.len() - 1)
    }

    fn restore(&self, mut text: String) -> String {
        for (index, kept) in self.kept.iter().enumerate() {
            text = text.replacen(&self.marker(index), kept, 1);
        }
        text
    }
}

pub fn minify_css(css: &str) -> String {
    let mut strings = Shelf::new("", "");
    let lifted = CSS_TOKEN.replace_all(css, |caps: &Captures<'_>| {
        let token = &caps[0];
        if token.starts_with("/*") {
            String::new()
        } else {
            strings.stash(token)
        }
    });
    let collapsed = WHITESPACE.replace_all(&lifted, " ");
    let tight = CSS_PUNCT.replace_all(&collapsed, "$1");
    strings.restore(tight.replace(";}", "}").trim().to_string())
}

/// Trim lines and drop blank lines and whole-line `//` comments.
///
/// Lines that start inside a template literal are kept as written, and a
/// line ending inside one keeps its trailing whitespace.
pub fn minify_js(js: &str) -> String {
    let mut in_template = false;
    let mut lines = Vec::new();

    for line in js.lines() {
        let started_inside = in_template;
        in_template = ends_inside_template(line, in_template);

        let line = if started_inside { line } else { line.trim_start() };
        let line = if in_template { line } else { line.trim_end() };
        if !started_inside && (line.is_empty() || line.starts_with("//")) {
            continue;
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// Scan one line of JS and report whether it ends inside a template literal.
fn ends_inside_template(line: &str, mut in_template: bool) -> bool {
    let mut quote: Option<char> = None;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_template {
            match ch {
                '\\' => {
                    chars.next();
                }
                '`' => in_template = false,
                _ => {}
            }
            continue;
        }
        match quote {
            Some(_) if ch == '\\' => {
                chars.next();
            }
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '`' => in_template = true,
                '/' if chars.peek() == Some(&'/') => break,
                _ => {}
            },
        }
    }

    in_template
}

/// Remove comments (keeping conditional comments) and collapse whitespace
/// between raw-text and preformatted blocks.
pub fn minify_html(html: &str) -> String {
    let mut blocks = Shelf::new("<", ">");
    let lifted = HTML_RAW_BLOCK.replace_all(html, |caps: &Captures<'_>| blocks.stash(&caps[0]));

    let without_comments = HTML_COMMENT.replace_all(&lifted, |caps: &Captures<'_>| {
        if caps[1].trim_start().starts_with("[if") {
            caps[0].to_string()
        } else {
            String::new()
        }
    });
    let collapsed = WHITESPACE.replace_all(&without_comments, " ");
    let tight = BETWEEN_TAGS.replace_all(&collapsed, "><").trim().to_string();
    blocks.restore(tight)
}
