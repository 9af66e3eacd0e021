//! State change listeners.

use super::state::PackEvent;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::error;

type Listener = Arc<dyn Fn(&PackEvent) + Send + Sync>;

/// Listeners called synchronously, in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    listeners: RwLock<Vec<Listener>>,
}

impl Listeners {
    pub fn register<F>(&self, listener: F)
    where
        F: Fn(&PackEvent) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Deliver `event` to every listener. The list is copied first, so a
    /// listener may call back into the manager. A panicking listener is
    /// logged and the rest still run.
    pub fn emit(&self, event: &PackEvent) {
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(event))).is_err() {
                error!(pack = %event.pack_name, state = %event.state, "State listener panicked");
            }
        }
    }
}
