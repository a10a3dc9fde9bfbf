//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use metaphor::config::{ServiceConfig, StaticEnv};
use metaphor::http::AppState;
use metaphor::lifecycle::{Shutdown, Terminator};
use metaphor::HttpServer;
use tokio::net::TcpListener;

/// Records exit codes instead of exiting.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingTerminator {
    codes: Mutex<Vec<i32>>,
}

#[allow(dead_code)]
impl RecordingTerminator {
    pub fn codes(&self) -> Vec<i32> {
        self.codes.lock().unwrap().clone()
    }
}

impl Terminator for RecordingTerminator {
    fn terminate(&self, code: i32) {
        self.codes.lock().unwrap().push(code);
    }
}

/// State over a fixed environment and a recording terminator.
#[allow(dead_code)]
pub fn test_state(config: ServiceConfig, env: StaticEnv) -> (AppState, Arc<RecordingTerminator>) {
    let terminator = Arc::new(RecordingTerminator::default());
    let state = AppState::new(config)
        .with_env(env)
        .with_terminator(terminator.clone());
    (state, terminator)
}

/// Bind an ephemeral port and serve `state` until the returned coordinator fires.
#[allow(dead_code)]
pub async fn start_server(state: AppState) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::with_state(state);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// A client that never pools or proxies, so every call is a fresh request.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
