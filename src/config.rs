//! Loading the sheet configuration from `config.toml`.
//!
//! ```toml
//! width = 40
//! height = 100
//! default_color = "#FAFAFA"
//! ```
//!
//! Every key is optional. Problems never stop the program: they are
//! returned as warnings and the defaults are used instead.

use std::path::{Path, PathBuf};

use cellgrid_core::SheetConfig;
use directories::ProjectDirs;

/// Config files larger than this are not read.
pub const MAX_CONFIG_FILE_BYTES: u64 = 64 * 1024;

/// Load the sheet configuration.
///
/// `config_file` overrides the per-user `config.toml`. A missing per-user
/// file is silent; a missing explicit file is a warning.
pub fn load_config(config_file: Option<&PathBuf>) -> (SheetConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let config_path = config_file.cloned().or_else(user_config_path);

    let Some(path) = config_path else {
        return (SheetConfig::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (SheetConfig::default(), warnings);
    }

    match read_config(&path) {
        Ok(config) => (config, warnings),
        Err(warning) => {
            warnings.push(warning);
            (SheetConfig::default(), warnings)
        }
    }
}

fn read_config(path: &Path) -> Result<SheetConfig, String> {
    let len = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?
        .len();
    if len > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes)",
            path.display(),
            len
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    toml::from_str::<SheetConfig>(&content)
        .map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellgrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
