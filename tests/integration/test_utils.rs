//! Shared test utilities for integration tests
//!
//! Serializes access to HOME and the XDG variables so tests that depend on the
//! user's config or state directories do not race each other.

use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize XDG environment variable access across all tests
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

const VARS: [&str; 4] = ["HOME", "XDG_CONFIG_HOME", "XDG_STATE_HOME", "LETTA_API_KEY"];

/// Environment variable state to restore after test
struct EnvState(Vec<(&'static str, Option<String>)>);

impl EnvState {
    fn capture() -> Self {
        Self(VARS.iter().map(|v| (*v, std::env::var(v).ok())).collect())
    }

    fn restore(self) {
        for (name, value) in self.0 {
            match value {
                Some(orig) => std::env::set_var(name, orig),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Run `f` with HOME, XDG_CONFIG_HOME and XDG_STATE_HOME pointing into `test_dir`
/// and no LETTA_API_KEY. The original environment is restored afterwards.
///
/// Layout: `<test_dir>/home`, `<test_dir>/config`, `<test_dir>/state`.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let root = test_dir.path();
    for dir in ["home", "config", "state"] {
        std::fs::create_dir_all(root.join(dir)).unwrap();
    }
    std::env::set_var("HOME", root.join("home"));
    std::env::set_var("XDG_CONFIG_HOME", root.join("config"));
    std::env::set_var("XDG_STATE_HOME", root.join("state"));
    std::env::remove_var("LETTA_API_KEY");

    let result = f();

    env_state.restore();

    result
}

/// Environment for spawning the memlog binary in isolation.
pub fn isolated_env(root: &Path) -> Vec<(&'static str, std::path::PathBuf)> {
    for dir in ["home", "config", "state"] {
        std::fs::create_dir_all(root.join(dir)).unwrap();
    }
    vec![
        ("HOME", root.join("home")),
        ("XDG_CONFIG_HOME", root.join("config")),
        ("XDG_STATE_HOME", root.join("state")),
    ]
}
