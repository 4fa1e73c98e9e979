//! Environment configuration.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_TAB_STOP: usize = 8;
pub const DEFAULT_QUIT_TIMES: u32 = 3;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Tab stop width used when expanding rows for rendering.
    pub tab_stop: usize,
    /// Consecutive Ctrl-Q presses required to quit with unsaved changes.
    pub quit_times: u32,
    /// Optional path that receives a copy of every flushed frame.
    pub write_log: Option<PathBuf>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            tab_stop: env_usize("FEMTO_TAB_STOP", DEFAULT_TAB_STOP).max(1),
            quit_times: env_u32("FEMTO_QUIT_TIMES", DEFAULT_QUIT_TIMES),
            write_log: env_path_opt("FEMTO_WRITE_LOG"),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            quit_times: DEFAULT_QUIT_TIMES,
            write_log: None,
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn env_path_opt(key: &str) -> Option<PathBuf> {
    env::var_os(key).and_then(|value| {
        if value.is_empty() {
            None
        } else {
            Some(PathBuf::from(value))
        }
    })
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::sync::{Mutex, OnceLock};

    use super::EnvConfig;

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let previous = env::var(key).ok();
            env::set_var(key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn defaults_when_env_unset() {
        let _guard = env_lock().lock().expect("env lock poisoned");
        env::remove_var("FEMTO_TAB_STOP");
        env::remove_var("FEMTO_QUIT_TIMES");
        env::remove_var("FEMTO_WRITE_LOG");
        let cfg = EnvConfig::from_env();
        assert_eq!(cfg.tab_stop, 8);
        assert_eq!(cfg.quit_times, 3);
        assert!(cfg.write_log.is_none());
    }

    #[test]
    fn tab_stop_overridden_and_clamped() {
        let _guard = env_lock().lock().expect("env lock poisoned");
        {
            let _tab = EnvGuard::set("FEMTO_TAB_STOP", "4");
            assert_eq!(EnvConfig::from_env().tab_stop, 4);
        }
        {
            let _tab = EnvGuard::set("FEMTO_TAB_STOP", "0");
            assert_eq!(EnvConfig::from_env().tab_stop, 1);
        }
        {
            let _tab = EnvGuard::set("FEMTO_TAB_STOP", "junk");
            assert_eq!(EnvConfig::from_env().tab_stop, 8);
        }
    }

    #[test]
    fn write_log_path_from_env() {
        let _guard = env_lock().lock().expect("env lock poisoned");
        let _log = EnvGuard::set("FEMTO_WRITE_LOG", "/tmp/femto.log");
        let cfg = EnvConfig::from_env();
        assert_eq!(
            cfg.write_log.as_deref(),
            Some(std::path::Path::new("/tmp/femto.log"))
        );
    }
}
