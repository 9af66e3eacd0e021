//! Per-pack operation exclusion.

use crate::core::ManagerError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Names of packs with an install/update/delete running.
#[derive(Debug, Default, Clone)]
pub(crate) struct InFlight {
    names: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    /// Claim `name`, or fail at once if another operation holds it.
    pub fn try_acquire(&self, name: &str) -> Result<OperationGuard, ManagerError> {
        if !lock(&self.names).insert(name.to_string()) {
            return Err(ManagerError::in_progress(name));
        }
        Ok(OperationGuard {
            names: Arc::clone(&self.names),
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        lock(&self.names).contains(name)
    }

    pub fn snapshot(&self) -> HashSet<String> {
        lock(&self.names).clone()
    }
}

/// Releases the pack name when dropped, whether the operation finished,
/// failed, or its future was dropped.
#[derive(Debug)]
pub(crate) struct OperationGuard {
    names: Arc<Mutex<HashSet<String>>>,
    name: String,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        lock(&self.names).remove(&self.name);
    }
}

fn lock(names: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    names.lock().unwrap_or_else(PoisonError::into_inner)
}
