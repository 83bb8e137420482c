//! XDG Base Directory Support
//!
//! Resolves where quarry keeps its configuration file and its
//! document store on Linux/Unix systems.

use std::env;
use std::fs;
use std::path::PathBuf;

/// XDG directory structure for quarry
///
/// `QUARRY_*` variables win over `XDG_*` variables, which win over
/// the XDG defaults under the home directory.
#[derive(Debug, Clone)]
pub struct XdgDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl XdgDirs {
    /// Resolve directories from the current environment
    pub fn new() -> Self {
        Self {
            config_dir: resolve("QUARRY_CONFIG_DIR", "XDG_CONFIG_HOME", &[".config"]),
            data_dir: resolve("QUARRY_DATA_DIR", "XDG_DATA_HOME", &[".local", "share"]),
        }
    }

    /// Get config file path
    pub fn config_file(&self) -> PathBuf {
        // QUARRY_CONFIG names the file itself
        if let Ok(file) = env::var("QUARRY_CONFIG") {
            return PathBuf::from(file);
        }

        self.config_dir.join("config.toml")
    }

    /// Directory of the persistent document store
    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join("index")
    }

    /// Create the config and index directories if missing
    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::create_dir_all(self.index_dir())?;
        Ok(())
    }

    /// Log the resolved XDG paths
    pub fn log_paths(&self) {
        tracing::debug!("XDG directories resolved:");
        tracing::debug!("  Config: {:?}", self.config_dir);
        tracing::debug!("  Data: {:?}", self.data_dir);
        tracing::debug!("  Config file: {:?}", self.config_file());
        tracing::debug!("  Index: {:?}", self.index_dir());
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve(own_var: &str, xdg_var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(dir) = env::var(own_var) {
        return PathBuf::from(dir);
    }

    if let Ok(xdg) = env::var(xdg_var) {
        return PathBuf::from(xdg).join("quarry");
    }

    let mut dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.extend(home_default);
    dir.join("quarry")
}
