use crate::geometry::{Point, Rect, Size};
use crate::layout::Layout;
use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use strum::Display as StrumDisplay;

pub const ANGLE_STEP: f64 = 0.001; // radians per frame
pub const FRONT_Z_INDEX: i32 = 10;
pub const BACK_Z_INDEX: i32 = 5;

// tuned for the one hero layout, not derived
pub const MOBILE_CENTER_X_DIVISOR: f64 = 13.0;
pub const MOBILE_CENTER_Y_DIVISOR: f64 = 15.0;
pub const DESKTOP_CENTER_X_DIVISOR: f64 = 15.0;
pub const DESKTOP_CENTER_Y_DIVISOR: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Dimension {
    Width,
    Height,
}

/// One axis of the orbit center: a container dimension divided by a constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRule {
    pub of: Dimension,
    pub divisor: f64,
}

impl AxisRule {
    pub fn new(of: Dimension, divisor: f64) -> Self {
        Self { of, divisor }
    }

    pub fn apply(&self, container: Size) -> f64 {
        let extent = match self.of {
            Dimension::Width => container.width,
            Dimension::Height => container.height,
        };
        extent / self.divisor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterRule {
    pub x: AxisRule,
    pub y: AxisRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub angle_step: f64,
    pub mobile: CenterRule,
    pub desktop: CenterRule,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            angle_step: ANGLE_STEP,
            mobile: CenterRule {
                x: AxisRule::new(Dimension::Height, MOBILE_CENTER_X_DIVISOR),
                y: AxisRule::new(Dimension::Height, MOBILE_CENTER_Y_DIVISOR),
            },
            desktop: CenterRule {
                x: AxisRule::new(Dimension::Width, DESKTOP_CENTER_X_DIVISOR),
                y: AxisRule::new(Dimension::Height, DESKTOP_CENTER_Y_DIVISOR),
            },
        }
    }
}

impl OrbitSettings {
    pub fn center(&self, container: Size, is_mobile: bool) -> Point {
        let rule = if is_mobile { self.mobile } else { self.desktop };
        Point::new(rule.x.apply(container), rule.y.apply(container))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, StrumDisplay)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BlendMode {
    Normal,
    Difference,
}

/// Pseudo-3D stacking: slots on the upper arc pass in front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, StrumDisplay)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Depth {
    Back,
    Front,
}

impl Depth {
    /// `Front` iff `y` is strictly above the center line.
    pub fn classify(y: f64, center_y: f64) -> Self {
        if y < center_y { Self::Front } else { Self::Back }
    }

    pub fn z_index(&self) -> i32 {
        match self {
            Self::Front => FRONT_Z_INDEX,
            Self::Back => BACK_Z_INDEX,
        }
    }
}

/// Values written to a slot's handle on one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlotFrame {
    /// Translation from the slot's resting (centered) position.
    pub offset: Point,
    pub size: f64,
    pub depth: Depth,
    pub blend: BlendMode,
}

impl SlotFrame {
    /// Box the slot occupies inside `container`. Slots rest centered in the
    /// container, so the offset is applied to `center - size / 2`.
    pub fn bounds(&self, container: Size) -> Rect {
        let anchor = container.center();
        Rect::new(
            anchor.x - self.size / 2.0 + self.offset.x,
            anchor.y - self.size / 2.0 + self.offset.y,
            self.size,
            self.size,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub index: usize,
    pub angle: f64,
    pub frame: Option<SlotFrame>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub updated: usize,
    pub skipped: usize,
}

/// Per-slot orbital state. Angles only ever grow, by a fixed step per frame.
#[derive(Debug, Clone)]
pub struct OrbitEngine {
    settings: OrbitSettings,
    slots: Vec<Slot>,
    frames: u64,
}

impl OrbitEngine {
    pub fn new(slot_count: usize, settings: OrbitSettings) -> Self {
        let slots = (0..slot_count)
            .map(|index| Slot {
                index,
                angle: Self::initial_angle(index, slot_count),
                frame: None,
            })
            .collect();
        Self {
            settings,
            slots,
            frames: 0,
        }
    }

    pub fn initial_angle(index: usize, slot_count: usize) -> f64 {
        index as f64 / slot_count as f64 * 2.0 * PI
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    /// Top-left offset of a slot at `angle` so that its center sits on the orbit.
    pub fn position(center: Point, layout: &Layout, angle: f64) -> Point {
        Point::new(
            center.x + angle.cos() * layout.radius - layout.image_size / 2.0,
            center.y + angle.sin() * layout.radius - layout.image_size / 2.0,
        )
    }

    /// Runs one frame of the orbit loop.
    pub fn advance(&mut self, layout: &Layout, stage: &dyn Stage) -> FrameReport {
        self.frames += 1;
        let step = self.settings.angle_step;
        self.slots.iter_mut().for_each(|slot| slot.angle += step);

        let Some(container) = stage.container() else {
            log::trace!("Container not measurable, skipping frame {}", self.frames);
            return FrameReport {
                updated: 0,
                skipped: self.slots.len(),
            };
        };

        let center = self.settings.center(container, layout.is_mobile);
        let heading = stage.heading();
        let mut report = FrameReport::default();

        for slot in &mut self.slots {
            if !stage.is_attached(slot.index) {
                report.skipped += 1;
                continue;
            }

            let offset = Self::position(center, layout, slot.angle);
            let mut frame = SlotFrame {
                offset,
                size: layout.image_size,
                depth: Depth::classify(offset.y, center.y),
                blend: BlendMode::Normal,
            };
            if heading.is_some_and(|h| frame.bounds(container).intersects(&h)) {
                frame.blend = BlendMode::Difference;
            }

            slot.frame = Some(frame);
            report.updated += 1;
        }

        report
    }
}
