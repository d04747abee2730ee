use std::path::{Path, PathBuf};

use super::types::AppConfig;
use crate::errors::ConfigError;

const LOCAL_CONFIG: &str = "proctor.toml";

/// Loads `proctor.toml` from the working directory, then
/// `~/.proctor/config.toml`, falling back to defaults. Env overrides and
/// validation are applied in every case.
pub fn load_default() -> Result<AppConfig, ConfigError> {
    let local = Path::new(LOCAL_CONFIG);
    let mut cfg = if local.exists() {
        read_file(local)?
    } else if let Some(home) = home_config_path().filter(|p| p.exists()) {
        read_file(&home)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg)?;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    let mut cfg = read_file(path)?;
    apply_env_overrides(&mut cfg)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".proctor").join("config.toml"))
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<AppConfig>(&s).map_err(|e| ConfigError::Parse(e.into()))
}

fn apply_env_overrides(cfg: &mut AppConfig) -> Result<(), ConfigError> {
    if let Ok(v) = std::env::var("PROCTOR_DATA_DIR") {
        if !v.trim().is_empty() {
            cfg.persistence.data_dir = v;
        }
    }

    if let Ok(v) = std::env::var("PROCTOR_HTTP_PORT") {
        if !v.trim().is_empty() {
            cfg.http_server.port = v.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::EnvInvalid {
                    key: "PROCTOR_HTTP_PORT".to_string(),
                    source: e.into(),
                }
            })?;
        }
    }

    if let Ok(v) = std::env::var("PROCTOR_SPEECH_THRESHOLD") {
        if !v.trim().is_empty() {
            cfg.classifier.speech_threshold =
                v.trim().parse().map_err(|e: std::num::ParseFloatError| {
                    ConfigError::EnvInvalid {
                        key: "PROCTOR_SPEECH_THRESHOLD".to_string(),
                        source: e.into(),
                    }
                })?;
        }
    }

    Ok(())
}

pub(crate) fn validate(cfg: &AppConfig) -> Result<(), ConfigError> {
    let w = &cfg.weights;
    let weights = [
        ("speech", w.speech),
        ("mouse_off_screen", w.mouse_off_screen),
        ("fullscreen_exit", w.fullscreen_exit),
        ("face_missing", w.face_missing),
        ("copy_action", w.copy_action),
        ("multiple_faces", w.multiple_faces),
    ];
    for (name, value) in weights {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Validation(format!(
                "weights.{name} must be a non-negative number, got {value}"
            )));
        }
    }

    if !cfg.classifier.speech_threshold.is_finite() {
        return Err(ConfigError::Validation(
            "classifier.speech_threshold must be finite".to_string(),
        ));
    }

    if cfg.persistence.channel_capacity == 0 {
        return Err(ConfigError::Validation(
            "persistence.channel_capacity must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
