//! Core types - pure abstractions shared across the codebase.

mod event;
mod handoff;
mod limit;
mod state;

pub use event::{ChangeEvent, DETAIL_SEPARATOR, EventReceiver, EventSender, event_channel};
pub use handoff::{StopHandle, StopOutcome, StopToken, stop_signal};
pub use limit::{OPEN_FILE_LIMIT, raise_open_file_limit};
pub use state::{ShutdownSignal, setup_shutdown_handler};

#[cfg(test)]
pub use handoff::StopError;
#[cfg(test)]
pub use state::{ShutdownTrigger, shutdown_channel};
