//! Actor System for the dev loop
//!
//! ```text
//! Watcher --> Orchestrator --> WsActor
//! (notify)   (build/restart)  (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Messages to the WebSocket actor
//! - `fs` - File system watcher and change filtering
//! - `orchestrator` - Debounce, build, handoff state machine
//! - `ws` - WebSocket clients and broadcast
//! - `coordinator` - Wires up and runs everything

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod orchestrator;
pub mod ws;

pub use coordinator::Coordinator;
