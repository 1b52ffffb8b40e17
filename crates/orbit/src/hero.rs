//! Mount lifecycle of the hero section.
//!
//! Mounting resolves the layout, starts the decorations, and starts one
//! *effect*: the orbit frame loop plus the visibility timeline. A resize that
//! changes the layout stops that effect completely before a new one starts, so
//! the timeline begins again from its entrance. Orbit angles live in the
//! section itself and survive effect restarts; only a remount resets them.
//!
//! Every loop also checks the section's mount token, which lives outside the
//! `RefCell`, so unmounting stops them even while the section is borrowed.

use crate::engine::{FrameReport, OrbitEngine, SlotFrame};
use crate::frame::{CancelToken, FrameClock, ListenerGuard, Viewport};
use crate::indicator::{DecorationState, Decorations};
use crate::layout::{Layout, ResponsiveTracker};
use crate::settings::Settings;
use crate::stage::Stage;
use crate::timeline::{self, Timeline, TimelinePlayer, Visibility};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Everything the renderer needs for one placed slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlotView {
    pub index: usize,
    pub angle: f64,
    #[serde(flatten)]
    pub frame: SlotFrame,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub frame: u64,
    pub layout: Layout,
    pub slots: Vec<SlotView>,
    pub decorations: DecorationState,
}

pub struct HeroSection {
    settings: Settings,
    tracker: ResponsiveTracker,
    engine: OrbitEngine,
    timeline: TimelinePlayer,
    decorations: Decorations,
    visibility: Vec<Visibility>,
    decoration_state: DecorationState,
    effect: Option<CancelToken>,
    mount: CancelToken,
    effects_started: u64,
}

impl HeroSection {
    pub fn new(settings: Settings, viewport_width: f64) -> Self {
        let count = settings.assets.len();
        Self {
            tracker: ResponsiveTracker::new(settings.layout, viewport_width),
            engine: OrbitEngine::new(count, settings.orbit),
            timeline: TimelinePlayer::new(Timeline::new(count, &settings.timeline)),
            decorations: Decorations::new(&settings.indicators),
            visibility: vec![timeline::HIDDEN; count],
            decoration_state: DecorationState::default(),
            effect: None,
            mount: CancelToken::new(),
            effects_started: 0,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn layout(&self) -> Layout {
        self.tracker.current()
    }

    pub fn engine(&self) -> &OrbitEngine {
        &self.engine
    }

    pub fn timeline(&self) -> &TimelinePlayer {
        &self.timeline
    }

    pub fn decorations(&self) -> DecorationState {
        self.decoration_state
    }

    pub fn visibility(&self) -> &[Visibility] {
        &self.visibility
    }

    pub fn effects_started(&self) -> u64 {
        self.effects_started
    }

    pub fn is_running(&self) -> bool {
        !self.mount.is_cancelled() && self.effect.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Cancels the frame loop and kills the timeline. Returns `false` if there
    /// was nothing left to stop.
    pub fn stop_effect(&mut self) -> bool {
        let cancelled = self.effect.take().is_some_and(|token| token.cancel());
        let killed = self.timeline.kill();
        cancelled || killed
    }

    fn begin_effect(&mut self) -> CancelToken {
        self.stop_effect();
        self.timeline.restart();
        let token = CancelToken::new();
        self.effect = Some(token.clone());
        self.effects_started += 1;
        log::debug!(
            "Starting orbit effect #{} with {:?}",
            self.effects_started,
            self.layout()
        );
        token
    }

    /// Applies a viewport width. When the layout changes, the running effect
    /// is stopped before the new layout takes hold; restarting is the
    /// caller's job.
    pub fn resize(&mut self, viewport_width: f64) -> bool {
        if self.tracker.rules().resolve(viewport_width) != self.tracker.current() {
            self.stop_effect();
        }
        self.tracker.on_resize(viewport_width)
    }

    /// Stops everything this section started. Safe to call repeatedly.
    pub fn teardown(&mut self) -> bool {
        let unmounted = self.mount.cancel();
        let stopped = self.stop_effect();
        let decorations = self.decorations.stop();
        unmounted || stopped || decorations
    }

    /// One refresh: orbit positions, then timeline and decoration samples.
    pub fn frame(&mut self, now: Duration, stage: &dyn Stage) -> FrameReport {
        let layout = self.tracker.current();
        let report = self.engine.advance(&layout, stage);
        if let Some(visibility) = self.timeline.sample(now) {
            self.visibility = visibility;
        }
        if let Some(state) = self.decorations.sample(now) {
            self.decoration_state = state;
        }
        report
    }

    /// Placed slots in index order.
    pub fn slot_views(&self) -> impl Iterator<Item = SlotView> + '_ {
        self.engine
            .slots()
            .iter()
            .zip(&self.visibility)
            .filter_map(|(slot, &visibility)| {
                slot.frame.map(|frame| SlotView {
                    index: slot.index,
                    angle: slot.angle,
                    frame,
                    visibility,
                })
            })
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            frame: self.engine.frames(),
            layout: self.layout(),
            slots: self.slot_views().collect(),
            decorations: self.decoration_state,
        }
    }
}

/// Host handles shared by the frame loops and the resize listener.
#[derive(Clone)]
struct Driver {
    hero: Weak<RefCell<HeroSection>>,
    clock: Rc<dyn FrameClock>,
    stage: Rc<dyn Stage>,
    mount: CancelToken,
    latest_width: Rc<Cell<f64>>,
    resize_pending: Rc<Cell<bool>>,
}

impl Driver {
    fn start_effect(&self, hero: &mut HeroSection) {
        let token = hero.begin_effect();
        let driver = self.clone();
        self.clock.request_frames(Box::new(move |now| driver.refresh(&token, now)));
    }

    fn refresh(&self, token: &CancelToken, now: Duration) -> ControlFlow<()> {
        if token.is_cancelled() || self.mount.is_cancelled() {
            return ControlFlow::Break(());
        }
        let Some(cell) = self.hero.upgrade() else {
            return ControlFlow::Break(());
        };
        // busy elsewhere this refresh; positions catch up next time
        let Ok(mut hero) = cell.try_borrow_mut() else {
            return ControlFlow::Continue(());
        };
        hero.frame(now, &*self.stage);
        ControlFlow::Continue(())
    }

    /// Returns `false` while the section is borrowed elsewhere.
    fn apply_resize(&self, width: f64) -> bool {
        let Some(cell) = self.hero.upgrade() else {
            return true;
        };
        let Ok(mut hero) = cell.try_borrow_mut() else {
            return false;
        };
        if hero.resize(width) {
            self.start_effect(&mut hero);
        }
        true
    }

    fn on_resize(&self, width: f64) {
        self.latest_width.set(width);
        if self.apply_resize(width) || self.resize_pending.replace(true) {
            return;
        }

        log::debug!("Hero busy during resize to {}; applying on next frame", width);
        let driver = self.clone();
        self.clock.request_frames(Box::new(move |_| {
            if driver.mount.is_cancelled() {
                driver.resize_pending.set(false);
                return ControlFlow::Break(());
            }
            if driver.apply_resize(driver.latest_width.get()) {
                driver.resize_pending.set(false);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }));
    }
}

/// A mounted hero section. Dropping it unmounts.
pub struct Mounted {
    hero: Rc<RefCell<HeroSection>>,
    mount: CancelToken,
    resize: ListenerGuard,
}

impl Mounted {
    pub fn mount(
        settings: Settings,
        viewport: &dyn Viewport,
        clock: Rc<dyn FrameClock>,
        stage: Rc<dyn Stage>,
    ) -> Self {
        let width = viewport.width();
        let hero = Rc::new(RefCell::new(HeroSection::new(settings, width)));
        let mount = hero.borrow().mount.clone();
        let driver = Driver {
            hero: Rc::downgrade(&hero),
            clock,
            stage,
            mount: mount.clone(),
            latest_width: Rc::new(Cell::new(width)),
            resize_pending: Rc::new(Cell::new(false)),
        };

        {
            let mut section = hero.borrow_mut();
            section.decorations.start();
            driver.start_effect(&mut section);
        }
        let resize = viewport.on_resize(Box::new(move |width| driver.on_resize(width)));

        log::info!(
            "Hero mounted with {} images",
            hero.borrow().settings.assets.len()
        );
        Self {
            hero,
            mount,
            resize,
        }
    }

    pub fn hero(&self) -> &Rc<RefCell<HeroSection>> {
        &self.hero
    }

    /// Releases the resize listener and stops the effect and decorations.
    /// Returns `false` when already unmounted. If the section is borrowed, only
    /// the loops are stopped and a later call finishes the teardown.
    pub fn unmount(&mut self) -> bool {
        let released = self.resize.release();
        let cancelled = self.mount.cancel();
        let stopped = match self.hero.try_borrow_mut() {
            Ok(mut hero) => hero.teardown(),
            Err(_) => {
                log::warn!("Hero busy during unmount; loops cancelled, timeline left as is");
                false
            }
        };
        if released || cancelled || stopped {
            log::info!("Hero unmounted");
        }
        released || cancelled || stopped
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Size};
    use crate::headless::{FixedViewport, ManualClock, StaticStage};
    use crate::layout::DESKTOP_RADIUS;
    use crate::timeline::{ENTRANCE_FROM, ENTRANCE_TO};

    const FRAME: Duration = Duration::from_micros(16_667);

    struct Harness {
        clock: ManualClock,
        viewport: FixedViewport,
        mounted: Mounted,
    }

    fn mount(width: f64) -> Harness {
        let clock = ManualClock::new();
        let viewport = FixedViewport::new(width);
        let stage = StaticStage::new(Size::new(width, 900.0))
            .with_heading(Rect::new(width * 0.2, 350.0, width * 0.6, 200.0));
        let mounted = Mounted::mount(
            Settings::default(),
            &viewport,
            Rc::new(clock.clone()),
            Rc::new(stage),
        );
        Harness {
            clock,
            viewport,
            mounted,
        }
    }

    fn angles(h: &Harness) -> Vec<f64> {
        let hero = h.mounted.hero().borrow();
        hero.engine().slots().iter().map(|s| s.angle).collect()
    }

    #[test]
    fn test_desktop_mount_runs_twenty_frames() {
        let h = mount(1200.0);
        let mut previous = angles(&h);

        for _ in 0..20 {
            h.clock.tick(FRAME);
            let current = angles(&h);
            assert_eq!(current.len(), 8);
            assert!(current.iter().zip(&previous).all(|(now, before)| now > before));
            assert_eq!(h.mounted.hero().borrow().layout().radius, DESKTOP_RADIUS);
            previous = current;
        }

        let hero = h.mounted.hero().borrow();
        assert_eq!(hero.engine().frames(), 20);
        assert_eq!(hero.slot_views().count(), 8);
        assert_eq!(hero.effects_started(), 1);
        assert_eq!(h.clock.pending(), 1);
    }

    #[test]
    fn test_layout_change_restarts_effect_but_keeps_angles() {
        let h = mount(1200.0);
        // well past slot 0's entrance
        h.clock.run(200, FRAME);
        assert_eq!(h.mounted.hero().borrow().visibility()[0], ENTRANCE_TO);
        let before = angles(&h);

        h.viewport.resize(500.0);
        {
            let hero = h.mounted.hero().borrow();
            let layout = hero.layout();
            assert!(layout.is_mobile);
            assert_eq!(layout.radius, 120.0);
            assert_eq!(layout.image_size, 100.0);
            assert_eq!(hero.effects_started(), 2);
        }
        // the replaced loop is still queued until it sees its token
        assert_eq!(h.clock.pending(), 2);

        h.clock.tick(FRAME);
        assert_eq!(h.clock.pending(), 1);
        let hero = h.mounted.hero().borrow();
        assert_eq!(hero.visibility()[0], ENTRANCE_FROM);
        assert!(hero.slot_views().all(|v| v.frame.size == 100.0));

        // exactly one step per refresh, no reset
        let after: Vec<f64> = hero.engine().slots().iter().map(|s| s.angle).collect();
        for (a, b) in after.iter().zip(&before) {
            assert!((a - b - crate::engine::ANGLE_STEP).abs() < 1e-9);
        }
    }

    #[test]
    fn test_resize_within_profile_keeps_effect() {
        let h = mount(1200.0);
        h.clock.run(5, FRAME);
        h.viewport.resize(1300.0);
        h.viewport.resize(1000.0);
        assert_eq!(h.mounted.hero().borrow().effects_started(), 1);
        assert!(h.mounted.hero().borrow().is_running());
    }

    #[test]
    fn test_unmount_is_idempotent() {
        let mut h = mount(1200.0);
        h.clock.run(3, FRAME);

        assert!(h.mounted.unmount());
        assert!(!h.mounted.unmount());
        assert_eq!(h.viewport.listener_count(), 0);
        assert!(!h.mounted.hero().borrow().is_running());
        assert!(!h.mounted.hero().borrow().timeline().is_alive());

        h.clock.tick(FRAME);
        assert_eq!(h.clock.pending(), 0);
        assert_eq!(h.mounted.hero().borrow().engine().frames(), 3);

        // resizes after unmount reach nobody
        h.viewport.resize(400.0);
        assert!(!h.mounted.hero().borrow().layout().is_mobile);
    }

    #[test]
    fn test_unmount_while_borrowed_still_stops_loop() {
        let mut h = mount(1200.0);
        h.clock.tick(FRAME);

        let reader = h.mounted.hero().clone();
        let guard = reader.borrow();
        assert!(h.mounted.unmount());
        assert!(!guard.is_running());
        drop(guard);

        h.clock.run(10, FRAME);
        assert_eq!(h.clock.pending(), 0);
        assert_eq!(h.mounted.hero().borrow().engine().frames(), 1);
        assert_eq!(h.viewport.listener_count(), 0);

        // a second call finishes the teardown that the borrow blocked
        assert!(h.mounted.hero().borrow().timeline().is_alive());
        assert!(h.mounted.unmount());
        assert!(!h.mounted.hero().borrow().timeline().is_alive());
        assert!(!h.mounted.unmount());
    }

    #[test]
    fn test_resize_while_borrowed_applies_next_frame() {
        let h = mount(1200.0);
        h.clock.tick(FRAME);

        {
            let _reader = h.mounted.hero().borrow();
            h.viewport.resize(900.0);
            h.viewport.resize(500.0);
        }
        assert!(!h.mounted.hero().borrow().layout().is_mobile);

        h.clock.tick(FRAME);
        {
            let hero = h.mounted.hero().borrow();
            assert!(hero.layout().is_mobile);
            assert_eq!(hero.layout().radius, 120.0);
            assert_eq!(hero.effects_started(), 2);
        }
        // the old loop drains on this tick, the retry is already gone
        h.clock.tick(FRAME);
        assert_eq!(h.clock.pending(), 1);
    }

    #[test]
    fn test_pending_resize_dropped_after_unmount() {
        let mut h = mount(1200.0);
        {
            let _reader = h.mounted.hero().borrow();
            h.viewport.resize(500.0);
        }
        h.mounted.unmount();
        h.clock.tick(FRAME);

        assert_eq!(h.clock.pending(), 0);
        assert!(!h.mounted.hero().borrow().layout().is_mobile);
    }

    #[test]
    fn test_drop_unmounts() {
        let Harness {
            clock,
            viewport,
            mounted,
        } = mount(1200.0);
        clock.tick(FRAME);
        drop(mounted);

        assert_eq!(viewport.listener_count(), 0);
        clock.tick(FRAME);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_mount_before_container_is_measured() {
        let clock = ManualClock::new();
        let viewport = FixedViewport::new(1200.0);
        let mounted = Mounted::mount(
            Settings::default(),
            &viewport,
            Rc::new(clock.clone()),
            Rc::new(StaticStage::detached()),
        );
        clock.run(4, FRAME);

        let hero = mounted.hero().borrow();
        assert_eq!(hero.engine().frames(), 4);
        assert_eq!(hero.slot_views().count(), 0);
        assert!(hero.is_running());
    }

    #[test]
    fn test_snapshot_serializes() {
        let h = mount(1200.0);
        h.clock.run(2, FRAME);
        let snapshot = h.mounted.hero().borrow().snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["frame"], 2);
        assert_eq!(json["layout"]["radius"], 280.0);
        assert_eq!(json["slots"].as_array().map(Vec::len), Some(8));
        assert!(json["slots"][0]["depth"].is_string());
        assert!(json["slots"][0]["offset"]["x"].is_number());
    }
}
