#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use pageflow::artifact::RunReport;
use pageflow::graph::Step;

/// Shared log of step names in the order they ran.
pub type RunLog = Arc<Mutex<Vec<String>>>;

pub fn run_log() -> RunLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn logged(log: &RunLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// A step that records its name and reports writing `out/<name>`.
pub fn recording_step(name: &str, log: &RunLog) -> Step {
    let log = Arc::clone(log);
    let owned = name.to_string();
    Step::new(name, move || {
        log.lock().unwrap().push(owned.clone());
        let mut report = RunReport::default();
        report.push(PathBuf::from("out").join(&owned));
        Ok(report)
    })
}

/// A step that records its name after sleeping for `delay`.
pub fn slow_step(name: &str, delay: Duration, log: &RunLog) -> Step {
    let log = Arc::clone(log);
    let owned = name.to_string();
    Step::new(name, move || {
        std::thread::sleep(delay);
        log.lock().unwrap().push(owned.clone());
        Ok(RunReport::default())
    })
}

/// A step that records its name and then fails with `message`.
pub fn failing_step(name: &str, message: &str, log: &RunLog) -> Step {
    let log = Arc::clone(log);
    let owned = name.to_string();
    let message = message.to_string();
    Step::new(name, move || {
        log.lock().unwrap().push(owned.clone());
        Err(anyhow!("{message}"))
    })
}

/// A step that only counts its invocations.
pub fn counting_step(name: &str) -> (Step, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let step = Step::new(name, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(RunReport::default())
    });
    (step, count)
}

/// A step that blocks each run until the test releases a permit.
#[derive(Clone, Default)]
pub struct Gate {
    started: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
    permits: Arc<(Mutex<usize>, Condvar)>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self, name: &str) -> Step {
        let gate = self.clone();
        Step::new(name, move || {
            gate.started.fetch_add(1, Ordering::SeqCst);
            let (lock, cvar) = &*gate.permits;
            let mut permits = lock.lock().unwrap();
            while *permits == 0 {
                permits = cvar.wait(permits).unwrap();
            }
            *permits -= 1;
            drop(permits);
            gate.finished.fetch_add(1, Ordering::SeqCst);
            Ok(RunReport::default())
        })
    }

    /// Let `n` blocked or future runs complete.
    pub fn release(&self, n: usize) {
        let (lock, cvar) = &*self.permits;
        *lock.lock().unwrap() += n;
        cvar.notify_all();
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}
