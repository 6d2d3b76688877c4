//! Configuration section definitions.
//!
//! Each module corresponds to a section in `freshet.toml`:
//!
//! | Module   | TOML Section          | Purpose                              |
//! |----------|-----------------------|--------------------------------------|
//! | `watch`  | `[watch]`             | Watch root, ignored dirs, extensions |
//! | `build`  | `[build]`             | Build command, debounce, failure log |
//! | `run`    | `[run]`               | App command, stop policy, env        |
//! | `reload` | `[reload]`, `[log]`   | LiveReload server, verbosity         |

mod build;
mod reload;
mod run;
mod watch;

pub use build::BuildConfig;
pub use reload::{LogConfig, ReloadConfig};
pub use run::RunConfig;
pub use watch::WatchConfig;
