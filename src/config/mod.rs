use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::core::utils::{ensure_dir, PathResolver};
use crate::currency::MoneyFormat;
use crate::domain::{owner::OwnerId, period::Frequency};
use crate::errors::LedgerError;

const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config format error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<ConfigError> for LedgerError {
    fn from(err: ConfigError) -> Self {
        tracing::error!(error = %err, "configuration failure");
        LedgerError::Storage(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    pub currency_prefix: String,
    pub grouping_separator: char,
    pub default_frequency: Frequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipts_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_owner: Option<OwnerId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "id-ID".into(),
            currency: "IDR".into(),
            currency_prefix: "Rp".into(),
            grouping_separator: '.',
            default_frequency: Frequency::Monthly,
            database_file: None,
            receipts_dir: None,
            local_owner: None,
        }
    }
}

impl Config {
    pub fn money_format(&self) -> MoneyFormat {
        MoneyFormat {
            prefix: self.currency_prefix.clone(),
            grouping_separator: self.grouping_separator,
        }
    }
}

/// Loads and persists [`Config`] and resolves the data directory layout.
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_base(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    /// Reads the config file, falling back to defaults when it does not exist.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    /// Returns the local profile's owner id, generating and persisting one on
    /// first use.
    pub fn ensure_local_owner(&self, config: &mut Config) -> Result<OwnerId, ConfigError> {
        if let Some(owner) = &config.local_owner {
            return Ok(owner.clone());
        }
        let owner = OwnerId::random();
        config.local_owner = Some(owner.clone());
        self.save(config)?;
        tracing::info!(%owner, "local profile created");
        Ok(owner)
    }

    pub fn database_path(&self, config: &Config) -> PathBuf {
        self.resolve(config.database_file.as_deref())
            .unwrap_or_else(|| PathResolver::database_file_in(&self.base))
    }

    pub fn receipts_dir(&self, config: &Config) -> PathBuf {
        self.resolve(config.receipts_dir.as_deref())
            .unwrap_or_else(|| PathResolver::receipts_dir_in(&self.base))
    }

    /// Relative overrides are taken relative to the data directory.
    fn resolve(&self, custom: Option<&Path>) -> Option<PathBuf> {
        custom.map(|path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.base.join(path)
            }
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_indonesian_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.locale, "id-ID");
        assert_eq!(config.money_format(), MoneyFormat::default());
        assert_eq!(
            manager.database_path(&config),
            dir.path().join("ledger.sqlite3")
        );
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = Config::default();
        config.receipts_dir = Some(PathBuf::from("photos"));
        manager.save(&config).unwrap();

        assert!(manager.path().exists());
        assert!(!tmp_path(manager.path()).exists());
        let loaded = manager.load().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(manager.receipts_dir(&loaded), dir.path().join("photos"));
    }

    #[test]
    fn local_owner_is_generated_once() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut config = manager.load().unwrap();
        let first = manager.ensure_local_owner(&mut config).unwrap();

        let mut reloaded = manager.load().unwrap();
        let second = manager.ensure_local_owner(&mut reloaded).unwrap();
        assert_eq!(first, second);
    }
}
