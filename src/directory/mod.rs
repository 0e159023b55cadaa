//! User directory lookups and block-status enrichment of risk profiles.
//! The directory is the only external I/O in an analysis run; it is time-bounded and never fatal.

mod http;

pub use http::HttpDirectory;

use crate::error::DirectoryError;
use crate::risk::ActorRiskProfile;
use crate::snapshot::UserRecord;
use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

pub trait UserDirectory: Send + Sync {
    /// Current directory entries for the given actors. Unknown ids are simply absent.
    fn lookup(&self, actor_ids: &[String]) -> Result<Vec<UserRecord>, DirectoryError>;
}

/// Directory over an already-fetched user snapshot
#[derive(Debug, Default)]
pub struct StaticDirectory {
    users: HashMap<String, UserRecord>,
}

impl StaticDirectory {
    pub fn new(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }
}

impl UserDirectory for StaticDirectory {
    fn lookup(&self, actor_ids: &[String]) -> Result<Vec<UserRecord>, DirectoryError> {
        Ok(actor_ids
            .iter()
            .filter_map(|id| self.users.get(id).cloned())
            .collect())
    }
}

/// Run the lookup on a worker thread and wait at most `timeout`.
/// A late answer is dropped with the worker.
pub fn lookup_with_timeout(
    directory: &Arc<dyn UserDirectory>,
    actor_ids: Vec<String>,
    timeout: Duration,
) -> Result<Vec<UserRecord>, DirectoryError> {
    let (tx, rx) = mpsc::channel();
    let dir = Arc::clone(directory);
    std::thread::Builder::new()
        .name("directory-lookup".to_string())
        .spawn(move || {
            let _ = tx.send(dir.lookup(&actor_ids));
        })
        .map_err(|e| DirectoryError::Unavailable(e.to_string()))?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(DirectoryError::Timeout(timeout.as_millis() as u64)),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(DirectoryError::Disconnected),
    }
}

/// Apply directory entries to profiles: blocked means SUSPENDED.
/// Actors missing from the directory stay unblocked.
pub fn apply_block_status(profiles: &mut [ActorRiskProfile], users: &[UserRecord]) {
    let by_id: HashMap<&str, &UserRecord> = users.iter().map(|u| (u.id.as_str(), u)).collect();
    for p in profiles {
        match by_id.get(p.actor_id.as_str()) {
            Some(u) => {
                p.is_blocked = u.status.is_suspended();
                p.blocked_at = u.blocked_at;
            }
            None => {
                p.is_blocked = false;
                p.blocked_at = None;
            }
        }
    }
}
