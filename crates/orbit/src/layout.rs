use serde::{Deserialize, Serialize};

pub const MOBILE_BREAKPOINT: f64 = 766.0;
pub const MOBILE_RADIUS: f64 = 120.0;
pub const MOBILE_IMAGE_SIZE: f64 = 100.0;
pub const DESKTOP_RADIUS: f64 = 280.0;
pub const DESKTOP_IMAGE_SIZE: f64 = 200.0;

/// Orbit dimensions in effect for one viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Layout {
    pub radius: f64,
    pub image_size: f64,
    pub is_mobile: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutProfile {
    pub radius: f64,
    pub image_size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsiveRules {
    /// Widths at or below this are mobile.
    pub breakpoint: f64,
    pub mobile: LayoutProfile,
    pub desktop: LayoutProfile,
}

impl Default for ResponsiveRules {
    fn default() -> Self {
        Self {
            breakpoint: MOBILE_BREAKPOINT,
            mobile: LayoutProfile {
                radius: MOBILE_RADIUS,
                image_size: MOBILE_IMAGE_SIZE,
            },
            desktop: LayoutProfile {
                radius: DESKTOP_RADIUS,
                image_size: DESKTOP_IMAGE_SIZE,
            },
        }
    }
}

impl ResponsiveRules {
    pub fn resolve(&self, viewport_width: f64) -> Layout {
        let is_mobile = viewport_width <= self.breakpoint;
        let profile = if is_mobile { self.mobile } else { self.desktop };
        Layout {
            radius: profile.radius,
            image_size: profile.image_size,
            is_mobile,
        }
    }
}

/// Keeps the layout in step with the viewport. Every notification recomputes
/// immediately; there is no debouncing and no interpolation between values.
#[derive(Debug, Clone)]
pub struct ResponsiveTracker {
    rules: ResponsiveRules,
    width: f64,
    current: Layout,
}

impl ResponsiveTracker {
    pub fn new(rules: ResponsiveRules, viewport_width: f64) -> Self {
        Self {
            current: rules.resolve(viewport_width),
            width: viewport_width,
            rules,
        }
    }

    pub fn current(&self) -> Layout {
        self.current
    }

    pub fn rules(&self) -> &ResponsiveRules {
        &self.rules
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns `true` when the resolved layout differs from the previous one.
    pub fn on_resize(&mut self, viewport_width: f64) -> bool {
        let next = self.rules.resolve(viewport_width);
        let changed = next != self.current;
        if changed {
            log::info!(
                "Layout changed at width {}: radius {} -> {}, image size {} -> {}",
                viewport_width,
                self.current.radius,
                next.radius,
                self.current.image_size,
                next.image_size
            );
        }
        self.width = viewport_width;
        self.current = next;
        changed
    }
}
