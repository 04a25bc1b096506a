//! Persisted authentication token.
//!
//! The only state kept across runs: one token string in a file named
//! `token` under the client state directory (`~/.shopfront/` by default).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.shopfront/token`, or `./.shopfront/token` when there is no home
    pub fn default_location() -> Self {
        let dir = dirs::home_dir()
            .map(|home| home.join(".shopfront"))
            .unwrap_or_else(|| PathBuf::from(".shopfront"));
        Self::new(dir.join(TOKEN_KEY))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing, unreadable, or blank files all read as "no token"
    pub fn load(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let token = content.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        std::fs::write(&self.path, token)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}
