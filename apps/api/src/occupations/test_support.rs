use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;

use super::{OccupationProvider, OccupationResult};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn occupation(code: &str, title: &str) -> OccupationResult {
    OccupationResult {
        code: code.to_string(),
        title: title.to_string(),
    }
}

/// Provider returning a canned list and counting its calls.
pub struct FakeProvider {
    name: &'static str,
    results: Vec<OccupationResult>,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(name: &'static str, results: Vec<OccupationResult>) -> Self {
        Self {
            name,
            results,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty(name: &'static str) -> Self {
        Self::new(name, vec![])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OccupationProvider for FakeProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn search(&self, _keyword: &str, _n_results: u32) -> Vec<OccupationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results.clone()
    }
}
