//! Persisted user configuration: discovery, parsing, validation, and
//! atomic writes of `cplot.toml`.

mod file;
mod kv;

pub use file::{ConfigFile, Orientation, CURRENT_SCHEMA_VERSION};
pub use kv::apply_kv;

use std::fs;
use std::path::{Path, PathBuf};

use core_error::{PlotError, Result};
use tracing::{info, warn};

/// Local-working-directory file first, falling back to the platform's
/// config directory; a final relative-filename fallback if neither the
/// cwd nor a platform config dir is resolvable.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("cplot.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("cplot").join("cplot.toml");
    }
    PathBuf::from("cplot.toml")
}

/// Load from an explicit path, or the discovered default location. A
/// missing file yields built-in defaults. A present-but-malformed file,
/// or one whose values fail validation, also falls back to defaults —
/// logged as a warning rather than surfaced as an error — following the
/// tolerant-parse philosophy the config collaborator already uses for
/// its other settings. Only `save` enforces validation as a hard error:
/// validation on write is about refusing bad *persistence*, not bad reads.
pub fn load(path: Option<&Path>) -> Result<ConfigFile> {
    let resolved = path.map(Path::to_path_buf).unwrap_or_else(discover);
    let content = match fs::read_to_string(&resolved) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ConfigFile::default()),
        Err(e) => return Err(PlotError::resource(format!("reading {}: {e}", resolved.display()))),
    };
    let parsed: ConfigFile = match toml::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!(target: "core_config::load", path = %resolved.display(), error = %e, "malformed config, using defaults");
            return Ok(ConfigFile::default());
        }
    };
    if let Err(e) = parsed.validate() {
        warn!(target: "core_config::load", path = %resolved.display(), error = %e, "invalid config values, using defaults");
        return Ok(ConfigFile::default());
    }
    Ok(parsed)
}

/// Validate, then write atomically: serialize to a sibling temp file and
/// rename it over the target so a crash never leaves a half-written
/// config on disk.
pub fn save(path: &Path, config: &ConfigFile) -> Result<()> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| PlotError::io(format!("creating {}: {e}", parent.display())))?;
        }
    }
    let serialized = toml::to_string_pretty(config).map_err(|e| PlotError::internal(format!("serializing config: {e}")))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, serialized).map_err(|e| PlotError::io(format!("writing {}: {e}", tmp_path.display())))?;
    fs::rename(&tmp_path, path).map_err(|e| PlotError::io(format!("renaming into {}: {e}", path.display())))?;
    info!(target: "core_config::save", path = %path.display(), "config persisted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = load(Some(Path::new("__does_not_exist__.toml"))).unwrap();
        assert_eq!(cfg.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cplot.toml");
        let mut cfg = ConfigFile::default();
        cfg.default_family_id = "sans-serif".to_string();
        cfg.nominal_feed_mm_s = 42.0;
        save(&path, &cfg).unwrap();
        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded.default_family_id, "sans-serif");
        assert_eq!(loaded.nominal_feed_mm_s, 42.0);
    }

    #[test]
    fn invalid_config_refuses_to_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cplot.toml");
        let mut cfg = ConfigFile::default();
        cfg.paper_width_mm = 0.0;
        assert!(save(&path, &cfg).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cplot.toml");
        fs::write(&path, "this is not [ valid toml").unwrap();
        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn out_of_range_values_on_load_also_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cplot.toml");
        fs::write(&path, "paper_width_mm = 0.0\n").unwrap();
        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.paper_width_mm, ConfigFile::default().paper_width_mm);
    }
}
