//! Result cache keyed by request content
//!
//! Keys are the SHA-256 of the request's JSON encoding. Entries expire after
//! a fixed TTL and the oldest entry is evicted once the cache is full.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};

use crate::error::IceaResult;
use crate::models::{AnalyzeRequest, AnalyzeResponse};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_ENTRIES: usize = 500;

struct Entry {
    response: AnalyzeResponse,
    inserted_at: Instant,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    order: VecDeque<String>,
}

/// Shared handle; clones point at the same entries
#[derive(Clone)]
pub struct AnalysisCache {
    inner: Arc<Mutex<Inner>>,
    ttl: Duration,
    max_entries: usize,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

impl AnalysisCache {
    /// A zero TTL or zero capacity disables caching
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            ttl,
            max_entries,
        }
    }

    /// Entries stay usable after a panic elsewhere left the lock poisoned
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero() && self.max_entries > 0
    }

    /// Content key for a request
    pub fn key(request: &AnalyzeRequest) -> IceaResult<String> {
        let bytes = serde_json::to_vec(request)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    pub fn get(&self, key: &str) -> Option<AnalyzeResponse> {
        if !self.is_enabled() {
            return None;
        }
        let mut inner = self.lock();
        let expired = match inner.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.response.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            inner.entries.remove(key);
            inner.order.retain(|k| k != key);
        }
        None
    }

    pub fn insert(&self, key: String, response: AnalyzeResponse) {
        if !self.is_enabled() {
            return;
        }
        let mut inner = self.lock();

        if inner.entries.contains_key(&key) {
            inner.order.retain(|k| k != &key);
        }
        while inner.entries.len() >= self.max_entries && !inner.entries.contains_key(&key) {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(
            key,
            Entry {
                response,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
