use std::path::{Path, PathBuf};

use skyisle_core::IsleResult;

use crate::{IsleConfig, IslandStore};

const DEFAULT_DB_NAME: &str = "skyisle.db";

pub fn load_or_init_config(base: &Path) -> IsleResult<IsleConfig> {
    IsleConfig::load_or_init(base)
}

pub async fn open_store(base: &Path) -> IsleResult<IslandStore> {
    let config = load_or_init_config(base)?;
    IslandStore::connect(&config, base).await
}

pub fn default_sqlite_path(base: &Path) -> PathBuf {
    base.join(DEFAULT_DB_NAME)
}
