//! WebSocket Actor - LiveReload Clients
//!
//! This actor is responsible for:
//! - Completing the WebSocket and LiveReload handshakes
//! - Broadcasting reload and alert messages to all connected clients
//! - Receiving client messages (hello, current page URL)
//!
//! # Architecture
//!
//! ```text
//! ReloadNotifier --[Reload/Alert]--> WsActor --[broadcast]--> Clients
//!                                       ^                        |
//!                                       +------[info/close]------+
//! ```

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::ReloadMsg;
use crate::debug;
use crate::reload::message::LiveReloadMessage;

/// A connected LiveReload client
struct RegisteredClient {
    ws: WebSocket<TcpStream>,
    /// Page the client reported via `info`
    url: Option<String>,
}

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    /// Channel to receive messages
    rx: mpsc::Receiver<ReloadMsg>,
    /// Connected clients (shared for broadcast + read threads)
    clients: Arc<Mutex<Vec<RegisteredClient>>>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<ReloadMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || {
            Self::client_reader_loop(clients_for_reader);
        });

        while let Some(msg) = self.rx.recv().await {
            match msg {
                ReloadMsg::Reload { target } => {
                    debug!("reload"; "sending reload: {}", target);
                    self.broadcast(&LiveReloadMessage::reload(target.as_path()));
                }

                ReloadMsg::Alert { message } => {
                    self.broadcast(&LiveReloadMessage::alert(message));
                }

                ReloadMsg::AddClient(stream) => {
                    self.add_client(stream);
                }

                ReloadMsg::Shutdown => {
                    debug!("reload"; "shutting down");
                    break;
                }
            }
        }

        let mut clients = self.clients.lock();
        for mut client in clients.drain(..) {
            let _ = client.ws.close(None);
        }
    }
}
