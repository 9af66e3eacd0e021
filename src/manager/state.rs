//! Per-pack lifecycle state.

use std::fmt;

/// Where a pack is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackState {
    Loading,
    Loaded,
    Installing,
    Installed,
    Updating,
    Updated,
    Deleting,
    Deleted,
    Error,
}

impl PackState {
    /// An operation is running against the pack.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PackState::Loading | PackState::Installing | PackState::Updating | PackState::Deleting
        )
    }
}

impl fmt::Display for PackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PackState::Loading => "loading",
            PackState::Loaded => "loaded",
            PackState::Installing => "installing",
            PackState::Installed => "installed",
            PackState::Updating => "updating",
            PackState::Updated => "updated",
            PackState::Deleting => "deleting",
            PackState::Deleted => "deleted",
            PackState::Error => "error",
        };
        f.write_str(text)
    }
}

/// Manager operations that drive state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Install,
    Update,
    Delete,
}

impl Operation {
    fn running(self) -> PackState {
        match self {
            Operation::Load => PackState::Loading,
            Operation::Install => PackState::Installing,
            Operation::Update => PackState::Updating,
            Operation::Delete => PackState::Deleting,
        }
    }

    fn finished(self) -> PackState {
        match self {
            Operation::Load => PackState::Loaded,
            Operation::Install => PackState::Installed,
            Operation::Update => PackState::Updated,
            Operation::Delete => PackState::Deleted,
        }
    }
}

/// State of one pack plus the operation that produced it.
///
/// Only constructed through [`PackStatus::begin`] and moved on with
/// [`PackStatus::succeed`] / [`PackStatus::fail`], so a status always pairs
/// a state with the operation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackStatus {
    state: PackState,
    operation: Operation,
    error: Option<String>,
}

impl PackStatus {
    /// Enter the running state of `operation`.
    pub fn begin(operation: Operation) -> Self {
        Self {
            state: operation.running(),
            operation,
            error: None,
        }
    }

    /// Finish the operation successfully.
    pub fn succeed(self) -> Self {
        Self {
            state: self.operation.finished(),
            operation: self.operation,
            error: None,
        }
    }

    /// Finish the operation with an error.
    pub fn fail(self, error: impl Into<String>) -> Self {
        Self {
            state: PackState::Error,
            operation: self.operation,
            error: Some(error.into()),
        }
    }

    pub fn state(&self) -> PackState {
        self.state
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Notification sent to state listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEvent {
    pub pack_name: String,
    pub state: PackState,
    pub error: Option<String>,
}

impl PackEvent {
    pub fn from_status(pack_name: &str, status: &PackStatus) -> Self {
        Self {
            pack_name: pack_name.to_string(),
            state: status.state(),
            error: status.error.clone(),
        }
    }
}
