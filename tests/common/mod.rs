//! Common test utilities

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use iroiro::liveness::Prober;
use iroiro::models::{CandidateEntry, Catalog, StatusMap, StatusRecord};

/// Prober answering from a fixed table; unknown URLs fail
#[derive(Default)]
pub struct FakeProber {
    answers: HashMap<String, bool>,
    calls: Mutex<Vec<String>>,
}

impl FakeProber {
    pub fn new(answers: &[(&str, bool)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(url, ok)| (url.to_string(), *ok))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// URLs probed so far, in order
    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, url: &str) -> bool {
        self.calls.lock().unwrap().push(url.to_string());
        self.answers.get(url).copied().unwrap_or(false)
    }
}

/// Catalog with keys `0..n` pointing at `https://site{i}.example`
pub fn create_catalog(n: usize) -> Catalog {
    (0..n)
        .map(|i| {
            (
                i.to_string(),
                CandidateEntry::new(format!("Site {i}"), site_url(i)),
            )
        })
        .collect()
}

pub fn site_url(i: usize) -> String {
    format!("https://site{i}.example")
}

/// Write a catalog as `iroiro.json` into `dir`
#[allow(dead_code)]
pub fn write_catalog(dir: &Path, catalog: &Catalog) {
    let json = serde_json::to_string_pretty(catalog).unwrap();
    std::fs::write(dir.join("iroiro.json"), json).unwrap();
}

/// Write a status map as `status.json` into `dir`
#[allow(dead_code)]
pub fn write_statuses(dir: &Path, statuses: &[(&str, StatusRecord)]) {
    let map: StatusMap = statuses
        .iter()
        .map(|(key, record)| (key.to_string(), *record))
        .collect();
    std::fs::write(
        dir.join("status.json"),
        serde_json::to_string_pretty(&map).unwrap(),
    )
    .unwrap();
}
