//! `freshet init` - write a commented default config file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::cli::{Cli, Commands};
use crate::log;

/// Default configuration, every value spelled out.
const CONFIG_TEMPLATE: &str = r#"[watch]
root = "."                                    # Directory to watch recursively
ignored = ["assets", "tmp"]                   # Directories to skip (relative to root)
extensions = ["go", "tpl", "tmpl", "html"]    # Files that trigger a rebuild ([] = all)

[build]
command = ["go", "build", "-o", "tmp/runner-build", "."]
delay = 600                                   # Debounce delay (ms)
failure_log = "tmp/runner-build-errors.log"   # Last build failure, removed on success
tmp_dir = "tmp"                               # Scratch directory (created at startup)
# timeout = 120                               # Kill builds running longer (seconds)

[run]
command = ["tmp/runner-build"]
stop_timeout = 5000                           # Max wait for the old instance to stop (ms)
kill_grace = 2000                             # SIGTERM -> SIGKILL grace period (ms)

[run.env]
# PORT = "8080"

[reload]
enable = true                                 # Serve the LiveReload endpoint
interface = "127.0.0.1"
port = 35729

[log]
verbose = false
"#;

/// Generate the config file content.
pub fn generate_config_template() -> String {
    format!(
        "# freshet configuration file (v{})\n\n{CONFIG_TEMPLATE}",
        env!("CARGO_PKG_VERSION")
    )
}

/// Handle `freshet init`.
pub fn init_config(cli: &Cli) -> Result<()> {
    let force = matches!(cli.command, Some(Commands::Init { force: true }));
    let path = target_path(&cli.config)?;
    write_config(&path, force)?;
    log!("init"; "wrote {}", path.display());
    Ok(())
}

fn target_path(config: &Path) -> Result<PathBuf> {
    if config.is_absolute() {
        return Ok(config.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(cwd.join(config))
}

/// Write the default config to `path`, refusing to clobber an existing file
/// unless `force` is set.
pub fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "'{}' already exists.\nUse `freshet init --force` to overwrite it.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    fs::write(path, generate_config_template())
        .with_context(|| format!("Failed to write config file '{}'", path.display()))?;

    Ok(())
}
