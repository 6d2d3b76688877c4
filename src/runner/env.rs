//! Runner environment for child processes.
//!
//! Build and app processes receive the same variables. They are passed to
//! each child explicitly; the runner's own environment is never modified.

use rustc_hash::FxHashMap;

use crate::config::RunnerConfig;

/// Marker telling the app it runs under the dev runner.
pub const DEV_RUNNER: &str = "DEV_RUNNER";

/// Build `DEV_RUNNER` and `$RUNNER_*` variables, plus `[run.env]` entries.
///
/// `RUNNER_RELOAD_PORT` is only set while the reload server is enabled.
pub fn runner_vars(config: &RunnerConfig) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();

    vars.insert(DEV_RUNNER.into(), "1".into());
    vars.insert("RUNNER_WD".into(), config.root.display().to_string());
    vars.insert(
        "RUNNER_TMP_DIR".into(),
        config.build.tmp_dir.display().to_string(),
    );
    vars.insert("RUNNER_BUILD_DELAY".into(), config.build.delay.to_string());
    if config.reload.enable {
        vars.insert("RUNNER_RELOAD_PORT".into(), config.reload.port.to_string());
    }

    for (key, value) in &config.run.env {
        vars.insert(key.clone(), value.clone());
    }

    vars
}

/// Resolve `$VAR` references to entries of `vars` in command arguments.
///
/// Longer names are replaced first so `$RUNNER_WD` never eats part of a
/// longer variable sharing its prefix.
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    let mut keys: Vec<_> = vars.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for key in &keys {
                let pattern = format!("${}", key);
                if result.contains(&pattern) {
                    result = result.replace(&pattern, &vars[*key]);
                }
            }
            result
        })
        .collect()
}
