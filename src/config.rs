//! Server configuration: a listening port and two root directories.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fs::Roots;
use crate::RetransmissionConfig;

/// The port requests are accepted on unless told otherwise.
pub const DEFAULT_PORT: u16 = 4970;

/// The directory files are read from and written to unless told otherwise.
pub const DEFAULT_ROOT: &str = "./read";

/// A configuration that cannot be served.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A root directory is missing or is not a directory.
    #[error("{role} directory {} does not exist", .path.display())]
    MissingDirectory {
        /// Which root this is ("read" or "write").
        role: &'static str,
        /// The configured path.
        path: PathBuf,
    },
}

/// Everything the server needs to start.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// UDP port to listen for requests on.
    pub port: u16,

    /// Directory read requests are served from.
    pub read_dir: PathBuf,

    /// Directory write requests are stored into.
    pub write_dir: PathBuf,

    /// Timeout and attempt limit for every exchange.
    pub retransmission: RetransmissionConfig,
}

impl Config {
    /// Creates a new config with the default retransmission policy.
    pub fn new<R: Into<PathBuf>, W: Into<PathBuf>>(port: u16, read_dir: R, write_dir: W) -> Self {
        Self {
            port,
            read_dir: read_dir.into(),
            write_dir: write_dir.into(),
            retransmission: RetransmissionConfig::default(),
        }
    }

    /// Replaces the retransmission policy.
    pub fn with_retransmission(mut self, retransmission: RetransmissionConfig) -> Self {
        self.retransmission = retransmission;
        self
    }

    /// Checks that both roots are existing directories.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dir("read", &self.read_dir)?;
        check_dir("write", &self.write_dir)
    }

    pub(crate) fn roots(&self) -> Roots {
        Roots::new(&self.read_dir, &self.write_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_PORT, DEFAULT_ROOT, DEFAULT_ROOT)
    }
}

fn check_dir(role: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ConfigError::MissingDirectory {
            role,
            path: path.to_path_buf(),
        })
    }
}
