use std::fmt;
use thiserror::Error;

pub type StickerResult<T> = Result<T, StickerError>;

/// What went wrong with a local pack directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackErrorKind {
    /// `metadata.json` is missing, malformed, or lacks a required field.
    InvalidManifest,
    /// Manifest name does not match the directory it lives in.
    NameMismatch,
    /// Writing the manifest back to disk failed.
    SaveFailed,
}

/// Failures talking to the hub catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubErrorKind {
    FetchFailed,
    NotFound,
    DownloadFailed,
}

/// Failures turning a downloaded archive into an installed pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateErrorKind {
    ChecksumMismatch,
    /// An archive entry would land outside the staging directory.
    UnsafeArchive,
    /// The archive could not be read as a zip file.
    InvalidArchive,
    /// The staged copy does not pass pack validation.
    InvalidPack,
    InstallFailed,
    RemoveFailed,
}

/// Lifecycle and orchestration failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerErrorKind {
    AlreadyExists,
    NotFound,
    OperationInProgress,
    InvalidName,
    Cancelled,
}

macro_rules! kind_display {
    ($($ty:ty => { $($variant:ident => $text:expr),+ $(,)? })+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    let text = match self {
                        $(Self::$variant => $text,)+
                    };
                    f.write_str(text)
                }
            }
        )+
    };
}

kind_display! {
    PackErrorKind => {
        InvalidManifest => "invalid manifest",
        NameMismatch => "name mismatch",
        SaveFailed => "save failed",
    }
    HubErrorKind => {
        FetchFailed => "fetch failed",
        NotFound => "not found",
        DownloadFailed => "download failed",
    }
    UpdateErrorKind => {
        ChecksumMismatch => "checksum mismatch",
        UnsafeArchive => "unsafe archive",
        InvalidArchive => "invalid archive",
        InvalidPack => "invalid pack",
        InstallFailed => "install failed",
        RemoveFailed => "remove failed",
    }
    ManagerErrorKind => {
        AlreadyExists => "already exists",
        NotFound => "not found",
        OperationInProgress => "operation in progress",
        InvalidName => "invalid name",
        Cancelled => "cancelled",
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Pack error ({kind}): {detail}")]
pub struct PackError {
    pub kind: PackErrorKind,
    pub detail: String,
}

impl PackError {
    pub fn new(kind: PackErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn invalid_manifest(detail: impl Into<String>) -> Self {
        Self::new(PackErrorKind::InvalidManifest, detail)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Hub error ({kind}): {detail}")]
pub struct HubError {
    pub kind: HubErrorKind,
    pub detail: String,
}

impl HubError {
    pub fn new(kind: HubErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn fetch_failed(detail: impl Into<String>) -> Self {
        Self::new(HubErrorKind::FetchFailed, detail)
    }

    pub fn download_failed(detail: impl Into<String>) -> Self {
        Self::new(HubErrorKind::DownloadFailed, detail)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Update error ({kind}): {detail}")]
pub struct UpdateError {
    pub kind: UpdateErrorKind,
    pub detail: String,
}

impl UpdateError {
    pub fn new(kind: UpdateErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Manager error ({kind}): {detail}")]
pub struct ManagerError {
    pub kind: ManagerErrorKind,
    pub detail: String,
}

impl ManagerError {
    pub fn new(kind: ManagerErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn in_progress(pack: &str) -> Self {
        Self::new(
            ManagerErrorKind::OperationInProgress,
            format!("another operation on '{}' is still running", pack),
        )
    }

    pub fn not_found(pack: &str) -> Self {
        Self::new(
            ManagerErrorKind::NotFound,
            format!("pack '{}' is not installed", pack),
        )
    }

    pub fn cancelled(pack: &str) -> Self {
        Self::new(
            ManagerErrorKind::Cancelled,
            format!("operation on '{}' was cancelled", pack),
        )
    }
}

#[derive(Error, Debug)]
pub enum StickerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Pack(#[from] PackError),

    #[error(transparent)]
    Hub(#[from] HubError),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error(transparent)]
    Manager(#[from] ManagerError),
}

impl StickerError {
    /// Kind of the wrapped manager error, if this is one.
    pub fn manager_kind(&self) -> Option<ManagerErrorKind> {
        match self {
            StickerError::Manager(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn update_kind(&self) -> Option<UpdateErrorKind> {
        match self {
            StickerError::Update(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn hub_kind(&self) -> Option<HubErrorKind> {
        match self {
            StickerError::Hub(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn pack_kind(&self) -> Option<PackErrorKind> {
        match self {
            StickerError::Pack(e) => Some(e.kind),
            _ => None,
        }
    }
}
