//! Scripted catalog for cascade tests.

use crate::catalog::{CatalogClient, RawEntry};
use crate::core::CatalogError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{Notify, oneshot};

type FetchResult = Result<Vec<RawEntry>, CatalogError>;

#[derive(Default)]
struct MockState {
    routes: HashMap<String, FetchResult>,
    held: HashMap<String, VecDeque<oneshot::Receiver<FetchResult>>>,
    requests: Vec<String>,
}

/// In-memory [`CatalogClient`].
///
/// Each path answers with its scripted route, or `NotFound` when it has
/// none. A path can also be held with [`MockCatalog::hold`]: the next
/// lookup of that path blocks until the returned [`HeldResponse`] is
/// released, which lets tests order responses explicitly.
#[derive(Default)]
pub struct MockCatalog {
    state: Mutex<MockState>,
    requested: Notify,
}

/// A response withheld from one lookup.
pub struct HeldResponse {
    sender: oneshot::Sender<FetchResult>,
}

impl HeldResponse {
    /// Lets the held lookup complete with `result`.
    pub fn release(self, result: FetchResult) {
        // The lookup may have been dropped; nothing to deliver then.
        let _ = self.sender.send(result);
    }

    /// Lets the held lookup complete with entries named `names`.
    pub fn release_names<S: AsRef<str>>(self, names: &[S]) {
        self.release(Ok(entries(names)));
    }
}

fn entries<S: AsRef<str>>(names: &[S]) -> Vec<RawEntry> {
    names.iter().map(|name| RawEntry::named(name.as_ref())).collect()
}

impl MockCatalog {
    /// Creates a catalog with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answers every lookup of `path` with `entries`.
    pub fn respond(&self, path: &str, entries: Vec<RawEntry>) {
        self.state().routes.insert(path.to_string(), Ok(entries));
    }

    /// Answers every lookup of `path` with entries named `names`.
    pub fn respond_names<S: AsRef<str>>(&self, path: &str, names: &[S]) {
        self.respond(path, entries(names));
    }

    /// Fails every lookup of `path` with `error`.
    pub fn fail(&self, path: &str, error: CatalogError) {
        self.state().routes.insert(path.to_string(), Err(error));
    }

    /// Holds the next unheld lookup of `path` until released.
    #[must_use]
    pub fn hold(&self, path: &str) -> HeldResponse {
        let (sender, receiver) = oneshot::channel();
        self.state().held.entry(path.to_string()).or_default().push_back(receiver);
        HeldResponse { sender }
    }

    /// Every path looked up so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    /// Forgets the recorded lookups.
    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    /// Waits until `path` has been looked up.
    pub async fn wait_for_request(&self, path: &str) {
        loop {
            let notified = self.requested.notified();
            if self.state().requests.iter().any(|request| request == path) {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn fetch(&self, path: &str) -> Result<Vec<RawEntry>, CatalogError> {
        let (held, route) = {
            let mut state = self.state();
            state.requests.push(path.to_string());
            let held = state.held.get_mut(path).and_then(VecDeque::pop_front);
            (held, state.routes.get(path).cloned())
        };
        self.requested.notify_waiters();

        if let Some(receiver) = held {
            return receiver.await.unwrap_or_else(|_| {
                Err(CatalogError::NetworkError {
                    path: path.to_string(),
                    reason: "held response was dropped".to_string(),
                })
            });
        }

        route.unwrap_or_else(|| {
            Err(CatalogError::NotFound {
                path: path.to_string(),
            })
        })
    }
}
