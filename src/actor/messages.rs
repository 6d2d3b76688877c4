//! Actor Message Definitions
//!
//! ```text
//! orchestrator --Reload/Alert--> WsActor --broadcast--> browsers
//! acceptor     --AddClient-----> WsActor
//! ```

use std::net::TcpStream;

use crate::reload::ReloadTarget;

/// Messages to the WebSocket actor
#[derive(Debug)]
pub enum ReloadMsg {
    /// Tell every browser to reload `target`
    Reload { target: ReloadTarget },
    /// Show a message in every browser (build failures)
    Alert { message: String },
    /// New connection from the acceptor thread (handshake pending)
    AddClient(TcpStream),
    /// Close all clients and stop
    Shutdown,
}
