use sandrun_core::config::schema::DEFAULT_SANDBOX_DIR;
use sandrun_core::config::SandboxSettings;
use std::path::PathBuf;

/// Runtime configuration for the sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Directory for runner logs and the guest console log
    pub log_directory: PathBuf,
    /// Working directory of the runner (sockets, snapshots)
    pub tmp_directory: PathBuf,
    /// Runner executable; `None` means `hyperlight-nanvix` from `PATH`
    pub runner: Option<String>,
    /// Pass `--verbose` to the runner and echo guest output live
    pub verbose: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_directory: PathBuf::from(DEFAULT_SANDBOX_DIR),
            tmp_directory: PathBuf::from(DEFAULT_SANDBOX_DIR),
            runner: None,
            verbose: false,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &SandboxSettings) -> Self {
        Self {
            log_directory: settings.log_directory.clone(),
            tmp_directory: settings.tmp_directory.clone(),
            runner: settings.runner.clone(),
            verbose: false,
        }
    }

    pub fn with_log_directory<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.log_directory = dir.into();
        self
    }

    pub fn with_tmp_directory<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.tmp_directory = dir.into();
        self
    }

    pub fn with_runner<S: Into<String>>(mut self, runner: S) -> Self {
        self.runner = Some(runner.into());
        self
    }

    /// File that receives guest stdout, one section per run
    pub fn console_log_path(&self) -> PathBuf {
        self.log_directory.join("guest-console.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_config_builder() {
        let config = RuntimeConfig::new()
            .with_log_directory("/custom/log")
            .with_tmp_directory("/custom/tmp")
            .with_runner("/opt/bin/hyperlight-nanvix");

        assert_eq!(config.log_directory, PathBuf::from("/custom/log"));
        assert_eq!(config.tmp_directory, PathBuf::from("/custom/tmp"));
        assert_eq!(config.runner.as_deref(), Some("/opt/bin/hyperlight-nanvix"));
        assert_eq!(
            config.console_log_path(),
            PathBuf::from("/custom/log/guest-console.log")
        );
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.log_directory, PathBuf::from("/tmp/hyperlight-nanvix"));
        assert_eq!(config.tmp_directory, PathBuf::from("/tmp/hyperlight-nanvix"));
        assert!(config.runner.is_none());
        assert!(!config.verbose);
    }
}
