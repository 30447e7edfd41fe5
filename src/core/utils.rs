use dirs::home_dir;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

const DEFAULT_DIR_NAME: &str = ".allowance_core";
const HOME_ENV: &str = "ALLOWANCE_CORE_HOME";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "ledger.sqlite3";
const RECEIPTS_DIR: &str = "receipts";

/// Resolves the on-disk layout beneath the application data directory.
pub struct PathResolver;

impl PathResolver {
    /// `$ALLOWANCE_CORE_HOME`, falling back to `~/.allowance_core`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn config_dir_in(base: &Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }

    pub fn database_file_in(base: &Path) -> PathBuf {
        base.join(DATABASE_FILE)
    }

    pub fn receipts_dir_in(base: &Path) -> PathBuf {
        base.join(RECEIPTS_DIR)
    }
}

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted_at_the_base_dir() {
        let base = PathBuf::from("/tmp/allowance");
        assert_eq!(
            PathResolver::config_file_in(&base),
            PathBuf::from("/tmp/allowance/config/config.json")
        );
        assert_eq!(
            PathResolver::database_file_in(&base),
            PathBuf::from("/tmp/allowance/ledger.sqlite3")
        );
        assert_eq!(
            PathResolver::resolve_base(Some(base.clone())),
            base
        );
    }
}
