pub mod atomic;
pub mod error;
pub mod path;

pub use atomic::write_atomic;
pub use error::{
    HubError, HubErrorKind, ManagerError, ManagerErrorKind, PackError, PackErrorKind,
    StickerError, StickerResult, UpdateError, UpdateErrorKind,
};
