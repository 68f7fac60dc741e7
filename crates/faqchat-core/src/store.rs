//! Session-storage edge for the encoded transcript.
//!
//! The transcript persists across runs as one plain text file holding the
//! encoded string and nothing else. No server-side persistence exists; this
//! file plays the role of the client session store.

use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::transcript::Transcript;

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the default config directory (`faqchat/session.txt`).
    pub fn default_location() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(Self::new(config_dir.join("faqchat").join("session.txt")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted transcript; a missing file is an empty session.
    pub fn load(&self) -> Result<Transcript> {
        if !self.path.exists() {
            return Ok(Transcript::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(Transcript::from(raw))
    }

    pub fn save(&self, transcript: &Transcript) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, transcript.as_str())?;
        Ok(())
    }
}
