//! LiveReload Server
//!
//! A single TCP listener serves both the client script and WebSocket
//! connections. The acceptor thread peeks at the request line:
//!
//! - `GET /livereload.js` is answered directly over plain HTTP
//! - WebSocket upgrades are handed to `WsActor` for the handshake
//! - anything else gets a 404

use std::io::{Read, Write};
use std::net::{IpAddr, Shutdown, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::actor::messages::ReloadMsg;
use crate::embed::serve::{LIVERELOAD_JS, LivereloadVars};
use crate::{debug, log};

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

/// Upper bound on the request head we inspect.
const PEEK_BUFFER: usize = 2048;

/// How long a fresh connection may take to send its request line.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// What a fresh connection asks for.
#[derive(Debug, PartialEq, Eq)]
enum Request {
    Script,
    WebSocket,
    Other,
}

impl Request {
    fn classify(head: &str) -> Self {
        let mut lines = head.lines();
        let request_line = lines.next().unwrap_or_default();
        let mut parts = request_line.split_whitespace();
        let (method, target) = (parts.next(), parts.next().unwrap_or_default());

        if method != Some("GET") {
            return Self::Other;
        }

        let path = target.split('?').next().unwrap_or_default();
        if path == "/livereload.js" {
            return Self::Script;
        }

        let is_upgrade = lines.any(|line| {
            line.split_once(':').is_some_and(|(name, value)| {
                name.trim().eq_ignore_ascii_case("upgrade")
                    && value.trim().eq_ignore_ascii_case("websocket")
            })
        });
        if is_upgrade {
            Self::WebSocket
        } else {
            Self::Other
        }
    }
}

/// Start the server; connections go to `WsActor` through `ws_tx`.
///
/// Returns the port actually bound (the next free one if `base_port` is
/// taken).
pub fn start_reload_server(
    interface: IpAddr,
    base_port: u16,
    ws_tx: mpsc::Sender<ReloadMsg>,
) -> Result<u16> {
    let (listener, actual_port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    debug!("reload"; "connection from {}", addr);
                    let _ = stream.set_nonblocking(false);

                    match peek_request(&stream) {
                        Request::WebSocket => {
                            if ws_tx.blocking_send(ReloadMsg::AddClient(stream)).is_err() {
                                debug!("reload"; "actor gone, stopping acceptor");
                                break;
                            }
                        }
                        Request::Script => {
                            std::thread::spawn(move || serve_script(stream, actual_port));
                        }
                        Request::Other => respond(stream, "404 Not Found", "text/plain", "not found"),
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if ws_tx.is_closed() {
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    log!("reload"; "accept error: {}", e);
                    std::thread::sleep(Duration::from_millis(100));
                }
            }
        }
    });

    Ok(actual_port)
}

/// Look at the request head without consuming it.
fn peek_request(stream: &TcpStream) -> Request {
    let _ = stream.set_read_timeout(Some(REQUEST_TIMEOUT));
    let mut buf = [0u8; PEEK_BUFFER];
    let request = match stream.peek(&mut buf) {
        Ok(n) if n > 0 => Request::classify(&String::from_utf8_lossy(&buf[..n])),
        _ => Request::Other,
    };
    let _ = stream.set_read_timeout(None);
    request
}

fn serve_script(stream: TcpStream, port: u16) {
    let body = LIVERELOAD_JS.render(&LivereloadVars { port });
    respond(stream, "200 OK", "application/javascript", &body);
}

/// Write a complete HTTP/1.1 response and close the connection.
fn respond(mut stream: TcpStream, status: &str, content_type: &str, body: &str) {
    // Consume the request so closing doesn't reset the connection
    let _ = stream.set_read_timeout(Some(Duration::from_millis(50)));
    let mut sink = [0u8; PEEK_BUFFER];
    let _ = stream.read(&mut sink);

    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}; charset=utf-8\r\nContent-Length: {}\r\nCache-Control: no-cache\r\nAccess-Control-Allow-Origin: *\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    if let Err(e) = stream.write_all(response.as_bytes()) {
        debug!("reload"; "failed to write response: {}", e);
    }
    let _ = stream.flush();
    let _ = stream.shutdown(Shutdown::Write);
}

// =============================================================================
// Helpers
// =============================================================================

/// Try binding to port, retry with incremented port if in use
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => {
                last_error = Some(e);
                continue;
            }
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind LiveReload server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
