//! Integration tests module
//!
//! Exercises the public stickerpack API end to end against a mock hub, a
//! wiremock hub server and the `stickerpack` binary.

pub mod cli;
pub mod common;
pub mod hub;
pub mod lifecycle;
pub mod updater;
