use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::reload::message::LiveReloadMessage;
use crate::{debug, log};

use super::{RegisteredClient, WsActor};

/// Polls for the client hello right after the handshake.
const HELLO_ATTEMPTS: usize = 10;
const HELLO_POLL: Duration = Duration::from_millis(10);

impl WsActor {
    /// Add a new client connection
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Keep blocking mode during handshake, switch to non-blocking after
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let _ = ws.get_ref().set_nonblocking(true);

                // Clients open with a hello; answer it before anything else
                if Self::try_read_hello(&mut ws)
                    && let Err(e) = Self::send_hello(&mut ws)
                {
                    log!("reload"; "failed to send hello: {}", e);
                    return;
                }

                let mut clients = self.clients.lock();
                debug!("reload"; "client connected (total: {})", clients.len() + 1);
                clients.push(RegisteredClient { ws, url: None });
            }
            Err(e) => {
                log!("reload"; "handshake failed: {}", e);
            }
        }
    }

    /// Background thread to read client messages (non-blocking poll)
    ///
    /// Exits once the actor is gone.
    pub(super) fn client_reader_loop(clients: Arc<Mutex<Vec<RegisteredClient>>>) {
        while Arc::strong_count(&clients) > 1 {
            std::thread::sleep(Duration::from_millis(100));

            let mut clients_guard = clients.lock();
            clients_guard.retain_mut(|client| match client.ws.read() {
                Ok(Message::Text(text)) => {
                    match LiveReloadMessage::parse(&text) {
                        Some(LiveReloadMessage::Hello { .. }) => {
                            if let Err(e) = Self::send_hello(&mut client.ws) {
                                debug!("reload"; "client disconnected: {}", e);
                                return false;
                            }
                        }
                        Some(LiveReloadMessage::Info { url: Some(url) }) => {
                            debug!("reload"; "client viewing {}", url);
                            client.url = Some(url);
                        }
                        _ => {}
                    }
                    true
                }
                Ok(Message::Close(_)) => {
                    debug!("reload"; "client closed {}", client.url.as_deref().unwrap_or("connection"));
                    false
                }
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    // No data available
                    true
                }
                Err(_) => false,
                _ => true,
            });
        }
    }

    /// Wait briefly for the client hello.
    fn try_read_hello(ws: &mut WebSocket<TcpStream>) -> bool {
        for _ in 0..HELLO_ATTEMPTS {
            match ws.read() {
                Ok(Message::Text(text)) => {
                    return matches!(
                        LiveReloadMessage::parse(&text),
                        Some(LiveReloadMessage::Hello { .. })
                    );
                }
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(HELLO_POLL);
                }
                _ => break,
            }
        }
        false
    }

    fn send_hello(ws: &mut WebSocket<TcpStream>) -> tungstenite::Result<()> {
        ws.send(Message::Text(LiveReloadMessage::hello().to_json().into()))
    }
}
