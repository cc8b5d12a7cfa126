//! ComfyUI integration for the relay.
//!
//! [`api`] wraps the engine's HTTP endpoints with [`reqwest`]; [`watcher`]
//! observes the engine's output directory for freshly written results.
//! The engine is treated as an opaque service: queue a workflow, then
//! watch the filesystem. There is no WebSocket correlation -- the output
//! directory is the only source of truth for completion.

pub mod api;
pub mod watcher;
