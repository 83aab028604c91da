//! Shared test fixtures for the sheet-dashboard integration tests.
//!
//! Provides a local HTTP server that stands in for the spreadsheet export
//! endpoint, a scripted [`DatasetSource`] for driving the refresh controller
//! without a network, and a helper for waiting on published state.

#![allow(dead_code)]

use sheet_dashboard::{Dataset, DashboardError, DatasetSource, RefreshState, Record, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::watch;

// ---------------------------------------------------------------------------
// Local HTTP server
// ---------------------------------------------------------------------------

/// A server answering every request from a fixed script of responses; once
/// the script runs out the last response repeats.
pub struct TestServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Request targets (path + query) received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

pub async fn serve(script: Vec<(u16, &str)>) -> TestServer {
    let script: Vec<(u16, String)> = script
        .into_iter()
        .map(|(status, body)| (status, body.to_string()))
        .collect();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let seen = requests.clone();
    tokio::spawn(async move {
        let mut served = 0usize;
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let head = String::from_utf8_lossy(&buf);
            let target = head
                .lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .unwrap_or("")
                .to_string();
            seen.lock().unwrap().push(target);

            let (status, body) = &script[served.min(script.len() - 1)];
            served += 1;
            let response = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: text/csv; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                reason(*status),
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    TestServer {
        url: format!("http://{}/spreadsheets/d/test-doc/export?format=csv&gid=0", addr),
        requests,
    }
}

// ---------------------------------------------------------------------------
// Scripted source
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum Outcome {
    Ok(Dataset),
    Fail(&'static str),
}

/// A [`DatasetSource`] replaying a script of outcomes (the last one repeats),
/// optionally sleeping before each answer.
pub struct ScriptedSource {
    script: Vec<Outcome>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Outcome>) -> Self {
        Self::with_delay(script, Duration::ZERO)
    }

    pub fn with_delay(script: Vec<Outcome>, delay: Duration) -> Self {
        assert!(!script.is_empty());
        Self {
            script,
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl DatasetSource for ScriptedSource {
    async fn fetch_dataset(&self) -> Result<Dataset> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.script[call.min(self.script.len() - 1)] {
            Outcome::Ok(dataset) => Ok(dataset.clone()),
            Outcome::Fail(status) => Err(DashboardError::Status(status.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Sample data and helpers
// ---------------------------------------------------------------------------

/// A two-column dataset whose single row carries `value` in column `A`.
pub fn sample_dataset(value: f64) -> Dataset {
    let mut record = Record::new("2024-01-01");
    record.insert("A", Some(value));
    record.insert("B", None);
    Dataset::new(vec![record], vec!["A".to_string(), "B".to_string()])
}

/// Wait (up to five seconds) until the published state satisfies `pred`.
pub async fn wait_for<F>(rx: &mut watch::Receiver<RefreshState>, pred: F) -> RefreshState
where
    F: Fn(&RefreshState) -> bool,
{
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| pred(s)))
        .await
        .expect("timed out waiting for refresh state")
        .expect("controller dropped its state channel");
    state.clone()
}
