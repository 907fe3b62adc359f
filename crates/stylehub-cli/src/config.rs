//! `stylehub.toml`: store path, salon zone and log filter.

use chrono::FixedOffset;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "stylehub.toml";
pub const DEFAULT_STORE_PATH: &str = ".stylehub/salon.jsonl";
pub const DEFAULT_UTC_OFFSET: &str = "+00:00";
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    store: Option<String>,
    #[serde(default)]
    utc_offset: Option<String>,
    #[serde(default)]
    log: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub store_path: PathBuf,
    pub zone: FixedOffset,
    pub log: String,
}

/// Resolve settings from an optional config file and the `--store` flag.
///
/// An explicit `--config` path must exist; the default `stylehub.toml` is
/// read only when present.
pub fn load(config: Option<&str>, store_override: Option<&str>) -> Result<Settings, String> {
    let file = match config {
        Some(path) => read_config(Path::new(path))?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                read_config(default_path)?
            } else {
                ConfigFile::default()
            }
        }
    };
    resolve(file, store_override)
}

pub fn load_or_exit(config: Option<&str>, store_override: Option<&str>) -> Settings {
    load(config, store_override).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

fn read_config(path: &Path) -> Result<ConfigFile, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
    parse_config(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))
}

fn parse_config(text: &str) -> Result<ConfigFile, String> {
    toml::from_str(text).map_err(|e| e.to_string())
}

fn resolve(file: ConfigFile, store_override: Option<&str>) -> Result<Settings, String> {
    let store_path = store_override
        .map(str::to_string)
        .or(file.store)
        .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string());
    let zone = parse_utc_offset(file.utc_offset.as_deref().unwrap_or(DEFAULT_UTC_OFFSET))?;
    let log = file.log.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    Ok(Settings {
        store_path: PathBuf::from(store_path),
        zone,
        log,
    })
}

/// Parse `+HH:MM`, `-HH:MM` or `Z`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, String> {
    let invalid = || format!("invalid utc_offset '{raw}' (expected +HH:MM or -HH:MM)");
    let trimmed = raw.trim();
    if trimmed == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match trimmed.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if minutes >= 60 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings =
            resolve(parse_config("").expect("empty config parses"), None).expect("defaults");
        assert_eq!(settings.store_path, PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(settings.zone.local_minus_utc(), 0);
        assert_eq!(settings.log, "warn");
    }

    #[test]
    fn store_flag_overrides_config_file() {
        let file = parse_config(
            "store = \"salon/data.jsonl\"\nutc_offset = \"+02:00\"\nlog = \"info\"\n",
        )
        .expect("config parses");
        let settings = resolve(file, Some("other.jsonl")).expect("settings");
        assert_eq!(settings.store_path, PathBuf::from("other.jsonl"));
        assert_eq!(settings.zone.local_minus_utc(), 7200);
        assert_eq!(settings.log, "info");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_config("timezone = \"+01:00\"\n").is_err());
    }

    #[test]
    fn parses_signed_offsets() {
        assert_eq!(
            parse_utc_offset("-03:30").expect("offset").local_minus_utc(),
            -(3 * 3600 + 30 * 60)
        );
        assert_eq!(parse_utc_offset("Z").expect("offset").local_minus_utc(), 0);
    }

    #[test]
    fn rejects_malformed_offsets() {
        for raw in ["02:00", "+2:00", "+02:75", "+02", "+30:00", ""] {
            assert!(parse_utc_offset(raw).is_err(), "{raw} should be rejected");
        }
    }
}
