// Shared loading/error state
//
// One owned status object, handed out as a cloneable handle. Only the
// catalog client and the team store write to it; everything else reads
// snapshots.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SharedStatus {
    inner: Arc<Mutex<Status>>,
}

impl SharedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark loading. Loading is reset when the returned guard drops, on
    /// success and failure alike.
    #[must_use = "loading is reset as soon as the guard is dropped"]
    pub fn begin_loading(&self) -> LoadingGuard {
        self.lock().loading = true;
        LoadingGuard { status: self.clone() }
    }

    pub fn set_error(&self, message: impl Into<String>) {
        self.lock().error = Some(message.into());
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn snapshot(&self) -> Status {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Status> {
        // A panic while holding the lock cannot leave Status half-written
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct LoadingGuard {
    status: SharedStatus,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.status.lock().loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_guard_resets_on_drop() {
        let status = SharedStatus::new();

        {
            let _guard = status.begin_loading();
            assert!(status.is_loading());
        }

        assert!(!status.is_loading());
    }

    #[test]
    fn test_loading_is_a_single_flag() {
        let status = SharedStatus::new();

        let first = status.begin_loading();
        let second = status.begin_loading();
        drop(first);

        // First finisher resets the flag even though `second` is outstanding
        assert!(!status.is_loading());
        drop(second);
        assert!(!status.is_loading());
    }

    #[test]
    fn test_error_roundtrip_between_clones() {
        let status = SharedStatus::new();
        let reader = status.clone();

        status.set_error("Pokemon not found");
        assert_eq!(reader.error().as_deref(), Some("Pokemon not found"));

        status.clear_error();
        assert_eq!(reader.snapshot(), Status::default());
    }
}
