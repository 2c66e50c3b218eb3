//! Row store decorator that records every fetch.

use parking_lot::Mutex;

use super::{FetchRequest, Row, RowStore};
use crate::error::Error;

/// Wraps a store and keeps a log of every request served through it.
///
/// Useful for asserting fetch counts and inspecting the key sets of batched
/// fetches.
#[derive(Debug)]
pub struct RecordingStore<S> {
    inner: S,
    log: Mutex<Vec<FetchRequest>>,
}

impl<S: RowStore> RecordingStore<S> {
    /// Wrap a store.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Number of fetches issued so far.
    pub fn fetch_count(&self) -> usize {
        self.log.lock().len()
    }

    /// Snapshot of all requests issued so far.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.log.lock().clone()
    }

    /// Requests issued against one entity type.
    pub fn requests_for(&self, entity: &str) -> Vec<FetchRequest> {
        self.log
            .lock()
            .iter()
            .filter(|r| r.entity == entity)
            .cloned()
            .collect()
    }

    /// Forget recorded requests.
    pub fn reset(&self) {
        self.log.lock().clear();
    }

    /// Access the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: RowStore> RowStore for RecordingStore<S> {
    fn fetch_rows(&self, request: &FetchRequest) -> Result<Vec<Row>, Error> {
        self.log.lock().push(request.clone());
        self.inner.fetch_rows(request)
    }
}
