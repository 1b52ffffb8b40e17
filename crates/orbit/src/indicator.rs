//! Decorative indicators next to the hero: a spinning globe, and a location pin
//! that bobs while a dashed arc circles it. None of them touch the orbit.

use crate::ease::{Curve, Ease};
use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub globe_period: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub arc_period: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub pin_period: Duration,
    /// Peak upward travel of the pin, in pixels.
    pub pin_lift: f64,
    pub pin_ease: Ease,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            globe_period: Duration::from_secs(6),
            arc_period: Duration::from_secs(2),
            pin_period: Duration::from_millis(1500),
            pin_lift: 6.0,
            pin_ease: Ease::Sine(Curve::InOut),
        }
    }
}

/// Endless 360 degree rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub period: f64,
    pub ease: Ease,
}

impl Spin {
    pub fn linear(period: Duration) -> Self {
        Self {
            period: period.as_secs_f64(),
            ease: Ease::Linear,
        }
    }

    pub fn angle(&self, elapsed: f64) -> f64 {
        if self.period <= 0.0 {
            return 0.0;
        }
        let progress = elapsed.max(0.0).rem_euclid(self.period) / self.period;
        360.0 * self.ease.apply(progress)
    }
}

/// Vertical keyframes `[0, -lift, 0]`, eased per segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bob {
    pub lift: f64,
    pub period: f64,
    pub ease: Ease,
}

impl Bob {
    pub fn offset(&self, elapsed: f64) -> f64 {
        if self.period <= 0.0 {
            return 0.0;
        }
        let progress = elapsed.max(0.0).rem_euclid(self.period) / self.period;
        if progress < 0.5 {
            -self.lift * self.ease.apply(progress * 2.0)
        } else {
            -self.lift * (1.0 - self.ease.apply((progress - 0.5) * 2.0))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DecorationState {
    pub globe_rotation: f64,
    pub arc_rotation: f64,
    pub pin_offset: f64,
}

#[derive(Debug, Clone)]
pub struct Decorations {
    globe: Spin,
    arc: Spin,
    pin: Bob,
    origin: Option<Duration>,
    running: bool,
}

impl Decorations {
    pub fn new(settings: &IndicatorSettings) -> Self {
        Self {
            globe: Spin::linear(settings.globe_period),
            arc: Spin::linear(settings.arc_period),
            pin: Bob {
                lift: settings.pin_lift,
                period: settings.pin_period.as_secs_f64(),
                ease: settings.pin_ease,
            },
            origin: None,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.origin = None;
        self.running = true;
    }

    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn sample(&mut self, now: Duration) -> Option<DecorationState> {
        if !self.running {
            return None;
        }
        let origin = *self.origin.get_or_insert(now);
        let elapsed = now.saturating_sub(origin).as_secs_f64();
        Some(DecorationState {
            globe_rotation: self.globe.angle(elapsed),
            arc_rotation: self.arc.angle(elapsed),
            pin_offset: self.pin.offset(elapsed),
        })
    }
}
