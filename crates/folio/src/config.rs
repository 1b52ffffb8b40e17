use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use orbit::settings::{AssetPath, Settings, SettingsError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PageConfig {
    pub heading: String,
    pub since: String,
    pub location: String,
    pub asset_dir: PathBuf,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            heading: "JAI THAKUR".to_string(),
            since: "SINCE 2001".to_string(),
            location: "JAMMU".to_string(),
            asset_dir: PathBuf::from("public"),
        }
    }
}

impl PageConfig {
    /// Page paths are rooted at the asset directory, so `/me9.webp` becomes
    /// `<asset_dir>/me9.webp`.
    pub fn resolve_asset(&self, asset: &AssetPath) -> PathBuf {
        self.asset_dir.join(asset.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub hero: Settings,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid hero settings: {0}")]
    Invalid(#[from] SettingsError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("dev", "folio", "folio").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => get_config_path(),
    }
}

/// Config file to watch for reloads, or `None` when no location can be
/// resolved. The app still runs on defaults without a watcher.
pub fn watch_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match resolve_config_path(explicit) {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("Config reloading disabled: {}", e);
            None
        }
    }
}

pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = resolve_config_path(explicit)?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
        .build()?;

    let config: Config = s.try_deserialize()?;
    config.hero.validate()?;
    Ok(config)
}

pub fn load_or_default(explicit: Option<&Path>) -> Config {
    match load_config(explicit) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using built-in configuration: {}", e);
            Config::default()
        }
    }
}

/// Writes the bundled config to `explicit`, or to the user config directory.
/// An existing file is left untouched.
pub fn write_default_config(explicit: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = resolve_config_path(explicit)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(config_path: PathBuf, tx: Sender<AppEvent>) {
    let config_dir = match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    let file_name = config_path.file_name().map(|n| n.to_owned());

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_owned()) == file_name)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit::ease::Ease;
    use std::time::Duration;

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        let s = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let config: Config = s.try_deserialize()?;
        config.hero.validate()?;
        Ok(config)
    }

    #[test]
    fn test_bundled_config_matches_defaults() {
        let config = parse(DEFAULT_CONFIG).unwrap();
        let defaults = Config::default();

        assert_eq!(config.hero.assets, defaults.hero.assets);
        assert_eq!(config.hero.orbit, defaults.hero.orbit);
        assert_eq!(config.hero.layout, defaults.hero.layout);
        assert_eq!(config.hero.indicators, defaults.hero.indicators);

        // fractional seconds go through f64, compare loosely
        let (got, want) = (&config.hero.timeline, &defaults.hero.timeline);
        for (a, b) in [
            (got.entrance.duration, want.entrance.duration),
            (got.entrance.stagger, want.entrance.stagger),
            (got.hold, want.hold),
            (got.exit.duration, want.exit.duration),
            (got.exit.stagger, want.exit.stagger),
            (got.exit_overlap, want.exit_overlap),
            (got.repeat_delay, want.repeat_delay),
        ] {
            assert!((a.as_secs_f64() - b.as_secs_f64()).abs() < 1e-6);
        }
        assert_eq!(got.entrance.ease, want.entrance.ease);
        assert_eq!(got.exit.ease, want.exit.ease);
        assert_eq!(config.page.heading, defaults.page.heading);
        assert_eq!(config.page.asset_dir, defaults.page.asset_dir);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse(
            r#"
            [page]
            heading = "HELLO"

            [hero.layout.desktop]
            radius = 300.0
            image_size = 200.0

            [hero.timeline]
            hold = 7

            [hero.timeline.exit]
            duration = 0.5
            stagger = 0.1
            ease = "power2.inOut"
            "#,
        )
        .unwrap();

        assert_eq!(config.page.heading, "HELLO");
        assert_eq!(config.page.location, "JAMMU");
        assert_eq!(config.hero.layout.desktop.radius, 300.0);
        assert_eq!(config.hero.timeline.hold, Duration::from_secs(7));
        assert_eq!(config.hero.timeline.exit.ease, Ease::POWER2_IN_OUT);
        assert_eq!(config.hero.assets.len(), 8);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let err = parse("[hero]\nassets = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(SettingsError::NoAssets)));

        let err = parse(
            "[hero.timeline.entrance]\nduration = 1.0\nstagger = 0.1\nease = \"wobble\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn test_write_default_config_honours_explicit_path() {
        let dir = std::env::temp_dir().join(format!("folio-init-{}", std::process::id()));
        let path = dir.join("nested").join("folio.toml");

        let written = write_default_config(Some(&path)).unwrap();
        assert_eq!(written, path);
        assert_eq!(fs_err::read_to_string(&path).unwrap(), DEFAULT_CONFIG);

        fs_err::write(&path, "[page]\nheading = \"MINE\"\n").unwrap();
        write_default_config(Some(&path)).unwrap();
        assert!(fs_err::read_to_string(&path).unwrap().contains("MINE"));

        fs_err::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_watch_path_prefers_explicit_file() {
        let path = PathBuf::from("/tmp/folio/custom.toml");
        assert_eq!(watch_path(Some(&path)), Some(path));
    }

    #[test]
    fn test_assets_resolve_under_asset_dir() {
        let page = PageConfig {
            asset_dir: PathBuf::from("/srv/site"),
            ..PageConfig::default()
        };
        assert_eq!(
            page.resolve_asset(&AssetPath::new("/me9.webp")),
            PathBuf::from("/srv/site/me9.webp")
        );
        assert_eq!(
            page.resolve_asset(&AssetPath::new("img/me1.jpg")),
            PathBuf::from("/srv/site/img/me1.jpg")
        );
    }
}
