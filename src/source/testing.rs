//! In-process [`MonitorApi`] for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{ApiError, MonitorApi, ResetResponse, Snapshot};
use crate::recovery::Credential;

type Scripted<T> = Mutex<VecDeque<(Duration, Result<T, ApiError>)>>;

/// Scripted fake: each call pops the next response (after its delay).
#[derive(Debug, Default)]
pub struct FakeApi {
    snapshots: Scripted<Snapshot>,
    resets: Scripted<ResetResponse>,
    passwords: Mutex<Vec<String>>,
    fetch_calls: AtomicUsize,
    clear_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_snapshot(&self, snapshot: Result<Snapshot, ApiError>) {
        self.script_snapshot_after(Duration::ZERO, snapshot);
    }

    pub fn script_snapshot_after(&self, delay: Duration, snapshot: Result<Snapshot, ApiError>) {
        self.snapshots.lock().unwrap().push_back((delay, snapshot));
    }

    pub fn script_reset(&self, response: Result<ResetResponse, ApiError>) {
        self.resets.lock().unwrap().push_back((Duration::ZERO, response));
    }

    pub fn passwords(&self) -> Vec<String> {
        self.passwords.lock().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MonitorApi for FakeApi {
    async fn fetch_snapshot(&self) -> Result<Snapshot, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.snapshots.lock().unwrap().pop_front();
        match next {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Err(ApiError::Connection("nothing scripted".to_string())),
        }
    }

    async fn reset_vpn(&self, credential: Credential) -> Result<ResetResponse, ApiError> {
        self.passwords.lock().unwrap().push(credential.expose().to_string());
        let next = self.resets.lock().unwrap().pop_front();
        match next {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Ok(ResetResponse {
                message: "Reset complete".to_string(),
                output: None,
            }),
        }
    }

    async fn clear_tunnel_down(&self) -> Result<serde_json::Value, ApiError> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::json!({ "status": "success", "message": "Alert cleared" }))
    }

    fn description(&self) -> &str {
        "fake"
    }
}
