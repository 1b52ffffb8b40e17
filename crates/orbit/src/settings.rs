use crate::engine::OrbitSettings;
use crate::indicator::IndicatorSettings;
use crate::layout::ResponsiveRules;
use crate::timeline::TimelineSettings;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Image reference as written in the page, e.g. `/me9.webp`. Never checked
/// for existence; a missing file only shows up as a broken picture.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct AssetPath(String);

crate::impl_string_newtype!(AssetPath);

pub const DEFAULT_ASSETS: [&str; 8] = [
    "/me9.webp",
    "/me10.webp",
    "/me16.webp",
    "/me11.webp",
    "/me12.jpg",
    "/me13.jpg",
    "/me14.jpg",
    "/me15.jpg",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub assets: Vec<AssetPath>,
    pub orbit: OrbitSettings,
    pub layout: ResponsiveRules,
    pub timeline: TimelineSettings,
    pub indicators: IndicatorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            assets: DEFAULT_ASSETS.iter().copied().map(AssetPath::new).collect(),
            orbit: OrbitSettings::default(),
            layout: ResponsiveRules::default(),
            timeline: TimelineSettings::default(),
            indicators: IndicatorSettings::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("at least one orbiting image is required")]
    NoAssets,
    #[error("{0} must be positive, got {1}")]
    NotPositive(&'static str, f64),
    #[error("{0} must be longer than zero")]
    ZeroDuration(&'static str),
}

fn positive(name: &'static str, value: f64) -> Result<(), SettingsError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::NotPositive(name, value))
    }
}

fn nonzero(name: &'static str, value: Duration) -> Result<(), SettingsError> {
    if value.is_zero() {
        Err(SettingsError::ZeroDuration(name))
    } else {
        Ok(())
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.assets.is_empty() {
            return Err(SettingsError::NoAssets);
        }

        positive("orbit.angle_step", self.orbit.angle_step)?;
        for (name, rule) in [
            ("orbit.mobile.x.divisor", self.orbit.mobile.x),
            ("orbit.mobile.y.divisor", self.orbit.mobile.y),
            ("orbit.desktop.x.divisor", self.orbit.desktop.x),
            ("orbit.desktop.y.divisor", self.orbit.desktop.y),
        ] {
            positive(name, rule.divisor)?;
        }

        positive("layout.mobile.radius", self.layout.mobile.radius)?;
        positive("layout.mobile.image_size", self.layout.mobile.image_size)?;
        positive("layout.desktop.radius", self.layout.desktop.radius)?;
        positive("layout.desktop.image_size", self.layout.desktop.image_size)?;

        nonzero("timeline.entrance.duration", self.timeline.entrance.duration)?;
        nonzero("timeline.exit.duration", self.timeline.exit.duration)?;
        nonzero("indicators.globe_period", self.indicators.globe_period)?;
        nonzero("indicators.arc_period", self.indicators.arc_period)?;
        nonzero("indicators.pin_period", self.indicators.pin_period)?;
        Ok(())
    }
}
