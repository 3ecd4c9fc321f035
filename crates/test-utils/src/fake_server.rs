#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pageflow::errors::Result;
use pageflow::server::PreviewServer;

/// Preview server that only counts lifecycle calls.
#[derive(Clone, Default)]
pub struct RecordingServer {
    inits: Arc<AtomicUsize>,
    reloads: Arc<AtomicUsize>,
}

impl RecordingServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl PreviewServer for RecordingServer {
    fn init(&mut self) -> Result<()> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}
