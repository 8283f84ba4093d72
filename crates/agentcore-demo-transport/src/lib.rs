//! Transport layer for the web server and CLI client.
//!
//! Provides:
//! - Wire protocol (relay frames + JSON replies)
//! - SSE responses (feature: sse)
//! - Client state mirror

pub mod mirror;
pub mod protocol;

#[cfg(feature = "sse")]
pub mod sse;

pub use mirror::{FileMirrorStorage, MemoryMirrorStorage, MirrorState, MirrorStorage, StateMirror};
pub use protocol::{FrameDecoder, ReplyStatus, ServerMessage, encode_frame};
