//! `fg-common` — Shared types, errors, and configuration for the framegate
//! decoder bridge.
//!
//! This crate is the foundation the session crate depends on. It defines:
//!
//! - **Types**: `TimestampUs`, `Resolution` (newtypes for safety)
//! - **Color**: `PixelFormat`, `SurfaceFormat` (frame and target pixel layouts)
//! - **Packets**: `AccessUnit` (data flow into the session)
//! - **Errors**: `SessionError`, `RenderError`, `BridgeError` (thiserror-based)
//! - **Config**: `SessionConfig`

pub mod color;
pub mod config;
pub mod error;
pub mod packet;
pub mod types;

// Re-export commonly used items at crate root
pub use color::{PixelFormat, SurfaceFormat};
pub use config::SessionConfig;
pub use error::{BridgeError, RenderError, SessionError};
pub use packet::AccessUnit;
pub use types::{Resolution, TimestampUs};
