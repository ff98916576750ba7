use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

pub const CONFIG_FILENAME: &str = "custom-recognition.config";

/// On-disk credential file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb_api_key: String,
}

/// Where the provider API key comes from and goes back to.
pub trait CredentialStore {
    /// The stored key, or `None` when nothing usable is stored.
    fn load(&self) -> Result<Option<String>, CredentialError>;
    fn save(&self, api_key: &str) -> Result<(), CredentialError>;
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// `custom-recognition.config` in the working directory.
    pub fn in_working_dir() -> Self {
        Self::new(CONFIG_FILENAME)
    }
}

impl CredentialStore for JsonFileStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(Some(config.tmdb_api_key).filter(|key| !key.is_empty()))
    }

    fn save(&self, api_key: &str) -> Result<(), CredentialError> {
        let config = Config { tmdb_api_key: api_key.to_string() };
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        config.serialize(&mut ser)?;
        buf.push(b'\n');
        fs::write(&self.path, buf)?;
        Ok(())
    }
}
