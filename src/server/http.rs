// src/server/http.rs

//! Minimal static HTTP server with long-poll live reload.
//!
//! Requests are resolved against configured route prefixes first, then the
//! base directories in order (`[temp, src, public]` for `dev`). HTML
//! responses get a small script that long-polls [`RELOAD_ENDPOINT`] and
//! reloads the page whenever the reload counter moves past the value it saw
//! when the page loaded.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::errors::{PageflowError, Result};
use crate::server::PreviewServer;
use crate::types::ContentKind;

pub const RELOAD_ENDPOINT: &str = "/__pageflow/reload";

const MAX_REQUEST_HEAD: usize = 16 * 1024;
const LONG_POLL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Port to bind on 127.0.0.1; 0 picks a free port.
    pub port: u16,
    /// Directories searched in order for a request path.
    pub base_dirs: Vec<PathBuf>,
    /// URL prefix -> directory, checked before `base_dirs`.
    pub routes: Vec<(String, PathBuf)>,
}

impl ServerOptions {
    /// Options for `dev`: serve staging, sources, then public files.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let mut routes: Vec<(String, PathBuf)> = cfg
            .server()
            .routes
            .iter()
            .map(|(prefix, dir)| (prefix.trim_end_matches('/').to_string(), cfg.resolve(dir)))
            .collect();
        // Longest prefix wins.
        routes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            port: cfg.server().port,
            base_dirs: vec![cfg.temp_dir(), cfg.src_dir(), cfg.public_dir()],
            routes,
        }
    }

    /// Map a URL path onto a file, or `None` if it escapes or is missing.
    ///
    /// Directories resolve to their `index.html`.
    pub fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let decoded = percent_decode(url_path)?;
        if !is_safe(&decoded) {
            return None;
        }

        for (prefix, dir) in &self.routes {
            if let Some(rest) = strip_route_prefix(&decoded, prefix) {
                return find_file(dir, rest);
            }
        }

        self.base_dirs
            .iter()
            .find_map(|dir| find_file(dir, &decoded))
    }
}

/// `StaticPreviewServer` owns the reload counter; `init` binds the listener
/// and spawns the accept loop on the current Tokio runtime.
#[derive(Debug)]
pub struct StaticPreviewServer {
    options: ServerOptions,
    reload_tx: watch::Sender<u64>,
    local_addr: Option<SocketAddr>,
    task: Option<JoinHandle<()>>,
}

impl StaticPreviewServer {
    pub fn new(options: ServerOptions) -> Self {
        let (reload_tx, _) = watch::channel(0);
        Self {
            options,
            reload_tx,
            local_addr: None,
            task: None,
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(ServerOptions::from_config(cfg))
    }

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Bound address, once `init` succeeded.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Number of reloads requested so far.
    pub fn reload_count(&self) -> u64 {
        *self.reload_tx.borrow()
    }
}

impl PreviewServer for StaticPreviewServer {
    fn init(&mut self) -> Result<()> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.options.port));
        let std_listener = std::net::TcpListener::bind(addr)
            .map_err(|e| PageflowError::Server(format!("failed to bind {addr}: {e}")))?;
        std_listener
            .set_nonblocking(true)
            .map_err(|e| PageflowError::Server(format!("failed to configure listener: {e}")))?;
        let local_addr = std_listener
            .local_addr()
            .map_err(|e| PageflowError::Server(e.to_string()))?;
        let listener = TcpListener::from_std(std_listener)
            .map_err(|e| PageflowError::Server(format!("failed to register listener: {e}")))?;

        info!(url = %format!("http://{local_addr}/"), "preview server listening");

        let options = self.options.clone();
        let reload_rx = self.reload_tx.subscribe();
        self.task = Some(tokio::spawn(accept_loop(listener, options, reload_rx)));
        self.local_addr = Some(local_addr);
        Ok(())
    }

    fn reload(&self) {
        self.reload_tx.send_modify(|n| *n += 1);
        debug!(count = *self.reload_tx.borrow(), "preview reload requested");
    }
}

impl Drop for StaticPreviewServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn accept_loop(listener: TcpListener, options: ServerOptions, reload_rx: watch::Receiver<u64>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let options = options.clone();
                let reload_rx = reload_rx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, &options, reload_rx).await {
                        debug!(%peer, error = %e, "preview connection ended with error");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "preview server accept failed");
            }
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    options: &ServerOptions,
    reload_rx: watch::Receiver<u64>,
) -> std::io::Result<()> {
    let Some(head) = read_request_head(&mut stream).await? else {
        return Ok(());
    };

    let mut parts = head.lines().next().unwrap_or_default().split_whitespace();
    let method = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or("/");
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    let reload_count = *reload_rx.borrow();
    let response = match method {
        "GET" | "HEAD" if path == RELOAD_ENDPOINT => long_poll(query, reload_rx).await,
        "GET" | "HEAD" => serve_file(options, path, reload_count).await,
        _ => Response::text(405, "Method Not Allowed"),
    };

    debug!(method, path, status = response.status, "preview request");
    response.write_to(&mut stream, method == "HEAD").await
}

async fn read_request_head(stream: &mut TcpStream) -> std::io::Result<Option<String>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            return Ok(Some(String::from_utf8_lossy(&buf).into_owned()));
        }
        if buf.len() > MAX_REQUEST_HEAD {
            return Ok(None);
        }
    }
}

/// Answer as soon as the reload counter exceeds `since`, or with the
/// current value after [`LONG_POLL_TIMEOUT`].
async fn long_poll(query: &str, mut reload_rx: watch::Receiver<u64>) -> Response {
    let since = query
        .split('&')
        .find_map(|kv| kv.strip_prefix("since="))
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);

    let changed = matches!(
        tokio::time::timeout(LONG_POLL_TIMEOUT, reload_rx.wait_for(|n| *n > since)).await,
        Ok(Ok(_))
    );
    let current = *reload_rx.borrow();
    if !changed {
        debug!(since, current, "reload long-poll timed out");
    }
    Response::text(200, &current.to_string())
}

async fn serve_file(options: &ServerOptions, url_path: &str, reload_count: u64) -> Response {
    let Some(file) = options.resolve(url_path) else {
        return Response::text(404, "Not Found");
    };

    match tokio::fs::read(&file).await {
        Ok(body) => {
            let body = match ContentKind::from_path(&file) {
                ContentKind::Html => {
                    inject_reload_script(&String::from_utf8_lossy(&body), reload_count).into_bytes()
                }
                _ => body,
            };
            Response {
                status: 200,
                content_type: ContentKind::mime_for(&file),
                body,
            }
        }
        Err(e) => {
            warn!(path = ?file, error = %e, "failed to read file for preview");
            Response::text(500, "Internal Server Error")
        }
    }
}

/// Insert the live-reload client before `</body>`, or append it.
pub fn inject_reload_script(html: &str, reload_count: u64) -> String {
    let script = format!(
        "<script>(function(){{var v={reload_count};function p(){{\
fetch('{RELOAD_ENDPOINT}?since='+v).then(function(r){{return r.text();}})\
.then(function(t){{if(+t>v){{location.reload();}}else{{p();}}}})\
.catch(function(){{setTimeout(p,1000);}});}}p();}})();</script>"
    );

    match html.rfind("</body>") {
        Some(idx) => format!("{}{}{}", &html[..idx], script, &html[idx..]),
        None => format!("{html}{script}"),
    }
}

fn strip_route_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

fn find_file(dir: &Path, url_path: &str) -> Option<PathBuf> {
    let rel = url_path.trim_start_matches('/');
    let candidate = if rel.is_empty() {
        dir.to_path_buf()
    } else {
        dir.join(rel)
    };

    if candidate.is_dir() {
        let index = candidate.join("index.html");
        return index.is_file().then_some(index);
    }
    candidate.is_file().then_some(candidate)
}

fn is_safe(path: &str) -> bool {
    Path::new(path.trim_start_matches('/'))
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

struct Response {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Response {
    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.as_bytes().to_vec(),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    async fn write_to(&self, stream: &mut TcpStream, head_only: bool) -> std::io::Result<()> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nCache-Control: no-cache\r\nConnection: close\r\n\r\n",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len()
        );
        stream.write_all(head.as_bytes()).await?;
        if !head_only {
            stream.write_all(&self.body).await?;
        }
        stream.shutdown().await
    }
}
