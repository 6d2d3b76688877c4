use tungstenite::protocol::Message;

use crate::debug;
use crate::reload::message::LiveReloadMessage;

use super::WsActor;

impl WsActor {
    /// Broadcast a message to all connected clients
    ///
    /// Clients whose send fails are dropped.
    pub(super) fn broadcast(&self, msg: &LiveReloadMessage) {
        let mut clients = self.clients.lock();
        let count = clients.len();

        if count == 0 {
            debug!("reload"; "no clients connected");
            return;
        }

        let frame = Message::Text(msg.to_json().into());
        clients.retain_mut(|client| match client.ws.send(frame.clone()) {
            Ok(()) => true,
            Err(e) => {
                debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        debug!("reload"; "broadcast to {} clients", clients.len());
    }
}
