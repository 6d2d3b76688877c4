//! Actor Coordinator - wires the dev loop together.
//!
//! ```text
//! Watcher ──EventChannel──▶ Orchestrator ──▶ CommandBuilder / ProcessLauncher
//!                                │
//!                                └──ReloadNotifier──▶ WsActor ──▶ browsers
//! ```
//!
//! The reload transport is started first so the port actually bound is the
//! one exported to the build and the app as `RUNNER_RELOAD_PORT`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::fs::Watcher;
use super::messages::ReloadMsg;
use super::orchestrator::Orchestrator;
use super::ws::WsActor;
use crate::config::RunnerConfig;
use crate::core::{ShutdownSignal, event_channel};
use crate::embed::serve::script_tag;
use crate::reload::ReloadNotifier;
use crate::reload::server::start_reload_server;
use crate::runner::{CommandBuilder, ProcessLauncher};
use crate::{debug, log};

const CHANNEL_BUFFER: usize = 32;

/// How long the WebSocket actor gets to close its clients on exit.
const WS_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

/// Running reload transport.
struct Transport {
    tx: mpsc::Sender<ReloadMsg>,
    actor: JoinHandle<()>,
}

impl Transport {
    async fn shutdown(self) {
        let _ = self.tx.send(ReloadMsg::Shutdown).await;
        let _ = tokio::time::timeout(WS_SHUTDOWN_TIMEOUT, self.actor).await;
    }
}

/// Coordinator - wires up and runs the dev loop.
pub struct Coordinator {
    config: RunnerConfig,
    shutdown: ShutdownSignal,
}

impl Coordinator {
    pub fn new(config: RunnerConfig, shutdown: ShutdownSignal) -> Self {
        Self { config, shutdown }
    }

    /// Run until shutdown or a fatal first failure.
    pub async fn run(mut self) -> Result<()> {
        let transport = self.start_transport();
        let notifier = match &transport {
            Some(transport) => ReloadNotifier::new(transport.tx.clone()),
            None => ReloadNotifier::disabled(),
        };

        let config = Arc::new(self.config);
        let (events, receiver) = event_channel();
        let watcher = Watcher::start(Arc::clone(&config), events).context("failed to start watcher")?;

        let orchestrator = Orchestrator::new(
            &config,
            CommandBuilder::new(&config),
            ProcessLauncher::new(&config),
            notifier,
            receiver,
            self.shutdown,
        );

        debug!("main"; "start");
        let result = orchestrator.run().await;
        drop(watcher);

        if let Some(transport) = transport {
            transport.shutdown().await;
        }
        debug!("main"; "stopped");

        Ok(result?)
    }

    /// Start the reload server and its actor. A bind failure disables
    /// browser reload without stopping the loop.
    fn start_transport(&mut self) -> Option<Transport> {
        if !self.config.reload.enable {
            debug!("reload"; "disabled");
            return None;
        }

        let (tx, rx) = mpsc::channel::<ReloadMsg>(CHANNEL_BUFFER);
        let reload = &mut self.config.reload;
        match start_reload_server(reload.interface, reload.port, tx.clone()) {
            Ok(port) => {
                if port != reload.port {
                    log!("reload"; "port {} in use, using {}", reload.port, port);
                }
                reload.port = port;
                log!("reload"; "listening on {}:{}", reload.interface, port);
                log!("reload"; "add to your pages: {}", script_tag(port));

                let actor = tokio::spawn(WsActor::new(rx).run());
                Some(Transport { tx, actor })
            }
            Err(e) => {
                log!("error"; "reload server failed: {:#}", e);
                reload.enable = false;
                None
            }
        }
    }
}
