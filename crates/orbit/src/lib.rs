//! Orbit engine for the animated hero section: circular image motion around a
//! measured container, a repeating entrance/hold/exit visibility timeline, and
//! the small decorative indicators that spin next to it.
//!
//! Nothing in here knows about a toolkit. Hosts plug in through the traits in
//! [`frame`] and [`stage`]; [`headless`] provides in-memory versions of them.

pub mod ease;
pub mod engine;
pub mod frame;
pub mod geometry;
pub mod headless;
pub mod hero;
pub mod indicator;
pub mod layout;
mod macros;
pub mod settings;
pub mod stage;
pub mod timeline;

pub use engine::{BlendMode, Depth, OrbitEngine, SlotFrame};
pub use geometry::{Point, Rect, Size};
pub use hero::{HeroSection, Mounted, SlotView};
pub use layout::{Layout, ResponsiveRules, ResponsiveTracker};
pub use settings::{AssetPath, Settings, SettingsError};
pub use stage::Stage;
pub use timeline::{Phase, Timeline, TimelinePlayer, Visibility};
