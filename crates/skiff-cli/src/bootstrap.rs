use std::path::{Path, PathBuf};

use anyhow::Context;

/// Load `.env` (if present) and then the layered configuration.
pub fn load_config() -> anyhow::Result<skiff_config::SkiffConfig> {
    load_dotenv()?;
    skiff_config::SkiffConfig::load().context("failed to load skiff configuration")
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;

    if let Some(path) = dotenv_path(&cwd) {
        dotenvy::from_path(&path)
            .with_context(|| format!("failed to load dotenv file at {}", path.display()))?;
    }
    Ok(())
}

/// `.skiff/.env` wins over a plain `.env` in the same directory.
fn dotenv_path(dir: &Path) -> Option<PathBuf> {
    [dir.join(".skiff").join(".env"), dir.join(".env")]
        .into_iter()
        .find(|candidate| candidate.is_file())
}
