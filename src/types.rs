// src/types.rs

use std::path::Path;

/// Coarse file classification shared by the minifiers and the preview server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Css,
    Js,
    Other,
}

impl ContentKind {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("html") | Some("htm") => ContentKind::Html,
            Some("css") => ContentKind::Css,
            Some("js") | Some("mjs") => ContentKind::Js,
            _ => ContentKind::Other,
        }
    }

    /// MIME type for HTTP responses.
    pub fn mime_for(path: &Path) -> &'static str {
        match Self::from_path(path) {
            ContentKind::Html => "text/html; charset=utf-8",
            ContentKind::Css => "text/css; charset=utf-8",
            ContentKind::Js => "application/javascript; charset=utf-8",
            ContentKind::Other => match path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_ascii_lowercase())
                .as_deref()
            {
                Some("png") => "image/png",
                Some("jpg") | Some("jpeg") => "image/jpeg",
                Some("gif") => "image/gif",
                Some("svg") => "image/svg+xml",
                Some("ico") => "image/x-icon",
                Some("webp") => "image/webp",
                Some("woff") => "font/woff",
                Some("woff2") => "font/woff2",
                Some("ttf") => "font/ttf",
                Some("eot") => "application/vnd.ms-fontobject",
                Some("json") => "application/json",
                Some("txt") => "text/plain; charset=utf-8",
                _ => "application/octet-stream",
            },
        }
    }
}
