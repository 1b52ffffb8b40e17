//! The repeating entrance / hold / exit sequence driving each slot's scale,
//! opacity and rotation. It shares nothing with the orbit loop; only time.

use crate::ease::Ease;
use serde::{Deserialize, Serialize};
use serde_with::{DurationSecondsWithFrac, serde_as};
use std::time::Duration;
use strum::Display as StrumDisplay;

/// Visual state of one slot. Rotation is in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Visibility {
    pub scale: f64,
    pub opacity: f64,
    pub rotation: f64,
}

impl Visibility {
    pub const fn new(scale: f64, opacity: f64, rotation: f64) -> Self {
        Self {
            scale,
            opacity,
            rotation,
        }
    }

    pub fn lerp(self, to: Visibility, k: f64) -> Visibility {
        if k >= 1.0 {
            return to;
        }
        let mix = |a: f64, b: f64| a + (b - a) * k;
        Visibility {
            scale: mix(self.scale, to.scale),
            opacity: mix(self.opacity, to.opacity),
            rotation: mix(self.rotation, to.rotation),
        }
    }
}

/// Applied at mount, before the timeline has rendered anything.
pub const HIDDEN: Visibility = Visibility::new(0.1, 0.0, 0.0);
pub const ENTRANCE_FROM: Visibility = Visibility::new(0.01, 0.0, -90.0);
pub const ENTRANCE_TO: Visibility = Visibility::new(1.0, 1.0, 360.0);
pub const EXIT_SCALE: f64 = 0.1;
pub const EXIT_OPACITY: f64 = 0.0;
/// Added to whatever rotation the slot has when its exit starts.
pub const EXIT_SPIN: f64 = 90.0;

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TweenSettings {
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub duration: Duration,
    /// Delay between consecutive slots.
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub stagger: Duration,
    pub ease: Ease,
}

#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    pub entrance: TweenSettings,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub hold: Duration,
    pub exit: TweenSettings,
    /// How far before the end of the hold the exit begins.
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub exit_overlap: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub repeat_delay: Duration,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            entrance: TweenSettings {
                duration: Duration::from_millis(1200),
                stagger: Duration::from_millis(120),
                ease: Ease::POWER3_OUT,
            },
            hold: Duration::from_secs(6),
            exit: TweenSettings {
                duration: Duration::from_millis(600),
                stagger: Duration::from_millis(100),
                ease: Ease::POWER2_IN_OUT,
            },
            exit_overlap: Duration::from_secs(1),
            repeat_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, StrumDisplay)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    Entrance,
    Hold,
    Exit,
    /// Between the end of one cycle and the start of the next.
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tween {
    start: f64,
    duration: f64,
    ease: Ease,
    from: Visibility,
    to: Visibility,
}

impl Tween {
    fn end(&self) -> f64 {
        self.start + self.duration
    }

    fn at(&self, t: f64) -> Visibility {
        if self.duration <= 0.0 {
            return if t >= self.start { self.to } else { self.from };
        }
        let progress = (t - self.start) / self.duration;
        self.from.lerp(self.to, self.ease.apply(progress))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Track {
    entrance: Tween,
    exit: Tween,
}

/// One cycle of the sequence, laid out in seconds from the cycle start.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    tracks: Vec<Track>,
    hold_end: f64,
    duration: f64,
    repeat_delay: f64,
}

impl Timeline {
    pub fn new(slot_count: usize, settings: &TimelineSettings) -> Self {
        let enter_cfg = &settings.entrance;
        let exit_cfg = &settings.exit;
        let enter_stagger = enter_cfg.stagger.as_secs_f64();
        let exit_stagger = exit_cfg.stagger.as_secs_f64();

        let entrance_end = match slot_count {
            0 => 0.0,
            n => (n - 1) as f64 * enter_stagger + enter_cfg.duration.as_secs_f64(),
        };
        let hold_end = entrance_end + settings.hold.as_secs_f64();
        let exit_origin = (hold_end - settings.exit_overlap.as_secs_f64()).max(0.0);

        let tracks: Vec<Track> = (0..slot_count)
            .map(|i| {
                let entrance = Tween {
                    start: i as f64 * enter_stagger,
                    duration: enter_cfg.duration.as_secs_f64(),
                    ease: enter_cfg.ease,
                    from: ENTRANCE_FROM,
                    to: ENTRANCE_TO,
                };
                // last slot leaves first
                let rank = (slot_count - 1 - i) as f64;
                let exit = Tween {
                    start: (exit_origin + rank * exit_stagger).max(entrance.end()),
                    duration: exit_cfg.duration.as_secs_f64(),
                    ease: exit_cfg.ease,
                    from: entrance.to,
                    to: Visibility::new(EXIT_SCALE, EXIT_OPACITY, entrance.to.rotation + EXIT_SPIN),
                };
                Track { entrance, exit }
            })
            .collect();

        let duration = tracks
            .iter()
            .map(|t| t.exit.end())
            .fold(hold_end, f64::max);

        Self {
            tracks,
            hold_end,
            duration,
            repeat_delay: settings.repeat_delay.as_secs_f64(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.tracks.len()
    }

    /// Length of one cycle, without the repeat delay.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn period(&self) -> f64 {
        self.duration + self.repeat_delay
    }

    pub fn hold_end(&self) -> f64 {
        self.hold_end
    }

    /// `(start, end)` of a slot's entrance within a cycle.
    pub fn entrance_window(&self, slot: usize) -> Option<(f64, f64)> {
        self.tracks
            .get(slot)
            .map(|t| (t.entrance.start, t.entrance.end()))
    }

    pub fn exit_window(&self, slot: usize) -> Option<(f64, f64)> {
        self.tracks.get(slot).map(|t| (t.exit.start, t.exit.end()))
    }

    fn cycle_time(&self, elapsed: f64) -> f64 {
        let period = self.period();
        if period <= 0.0 {
            return 0.0;
        }
        elapsed.max(0.0).rem_euclid(period)
    }

    pub fn phase(&self, slot: usize, elapsed: f64) -> Option<Phase> {
        let track = self.tracks.get(slot)?;
        let t = self.cycle_time(elapsed);
        let phase = if t >= self.duration && self.repeat_delay > 0.0 {
            Phase::Pause
        } else if t < track.entrance.end() {
            Phase::Entrance
        } else if t < track.exit.start {
            Phase::Hold
        } else {
            Phase::Exit
        };
        Some(phase)
    }

    pub fn sample(&self, slot: usize, elapsed: f64) -> Option<Visibility> {
        let track = self.tracks.get(slot)?;
        // the repeat delay holds the final frame
        let t = self.cycle_time(elapsed).min(self.duration);
        let state = if t < track.exit.start {
            track.entrance.at(t)
        } else {
            track.exit.at(t)
        };
        Some(state)
    }
}

/// A timeline bound to a host clock. The first frame it sees becomes its zero.
#[derive(Debug, Clone)]
pub struct TimelinePlayer {
    timeline: Timeline,
    origin: Option<Duration>,
    alive: bool,
}

impl TimelinePlayer {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            origin: None,
            alive: true,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Starts over from the entrance on the next frame.
    pub fn restart(&mut self) {
        self.origin = None;
        self.alive = true;
    }

    /// Returns `true` only if the player was running.
    pub fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    pub fn elapsed(&mut self, now: Duration) -> Option<f64> {
        if !self.alive {
            return None;
        }
        let origin = *self.origin.get_or_insert(now);
        Some(now.saturating_sub(origin).as_secs_f64())
    }

    pub fn sample(&mut self, now: Duration) -> Option<Vec<Visibility>> {
        let elapsed = self.elapsed(now)?;
        (0..self.timeline.slot_count())
            .map(|slot| self.timeline.sample(slot, elapsed))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn eight() -> Timeline {
        Timeline::new(8, &TimelineSettings::default())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn test_cycle_layout() {
        let tl = eight();
        // 7 * 0.12 + 1.2
        assert!(close(tl.hold_end(), 2.04 + 6.0));
        assert_eq!(tl.entrance_window(7).map(|w| close(w.1, 2.04)), Some(true));

        // exit anchored one second before the hold ends, last slot first
        let (last_start, _) = tl.exit_window(7).unwrap();
        let (first_start, first_end) = tl.exit_window(0).unwrap();
        assert!(close(last_start, 7.04));
        assert!(close(first_start, 7.04 + 0.7));
        assert!(close(first_end, 8.34));
        assert!(close(tl.duration(), 8.34));
        assert!(close(tl.period(), 8.84));
    }

    #[test]
    fn test_entrance_is_staggered_in_index_order() {
        let tl = eight();
        for slot in 1..8 {
            let (prev, _) = tl.entrance_window(slot - 1).unwrap();
            let (start, _) = tl.entrance_window(slot).unwrap();
            assert!(close(start - prev, 0.12));
        }
    }

    #[test]
    fn test_exit_is_staggered_in_reverse_order() {
        let tl = eight();
        for slot in 1..8 {
            let (later, _) = tl.exit_window(slot - 1).unwrap();
            let (earlier, _) = tl.exit_window(slot).unwrap();
            assert!(close(later - earlier, 0.1));
        }
    }

    #[test]
    fn test_sample_endpoints() {
        let tl = eight();
        assert_eq!(tl.sample(0, 0.0), Some(ENTRANCE_FROM));
        // slot 3 has not started at t = 0.2
        assert_eq!(tl.sample(3, 0.2), Some(ENTRANCE_FROM));
        assert_eq!(tl.sample(0, 3.0), Some(ENTRANCE_TO));

        let gone = tl.sample(0, 8.34).unwrap();
        assert!(close(gone.scale, EXIT_SCALE));
        assert!(close(gone.opacity, 0.0));
        assert!(close(gone.rotation, 450.0));
        assert_eq!(tl.sample(8, 1.0), None);
    }

    #[test]
    fn test_entrance_decelerates() {
        let tl = eight();
        let quarter = tl.sample(0, 0.3).unwrap();
        // power3.out at 25% progress is 1 - 0.75^4
        let k = 1.0 - 0.75f64.powi(4);
        assert!(close(quarter.opacity, k));
        assert!(close(quarter.rotation, -90.0 + 450.0 * k));
    }

    #[test]
    fn test_pause_holds_final_state_then_repeats() {
        let tl = eight();
        let end = tl.sample(2, 8.34).unwrap();
        assert_eq!(tl.sample(2, 8.6), Some(end));
        assert_eq!(tl.phase(2, 8.6), Some(Phase::Pause));

        // second cycle starts again from the entrance
        assert_eq!(tl.sample(0, tl.period()), Some(ENTRANCE_FROM));
        assert_eq!(tl.phase(0, tl.period() + 0.1), Some(Phase::Entrance));
    }

    #[test]
    fn test_exactly_one_phase_at_a_time() {
        let tl = eight();
        for slot in 0..8 {
            let (_, entrance_end) = tl.entrance_window(slot).unwrap();
            let (exit_start, _) = tl.exit_window(slot).unwrap();
            assert!(exit_start >= entrance_end);
            // exit may only begin inside the last second of the hold
            assert!(exit_start >= tl.hold_end() - 1.0 - EPS);

            let mut t = 0.0;
            let mut last = Phase::Entrance;
            while t < tl.period() {
                let phase = tl.phase(slot, t).unwrap();
                let expected = if t >= tl.duration() {
                    Phase::Pause
                } else if t < entrance_end {
                    Phase::Entrance
                } else if t < exit_start {
                    Phase::Hold
                } else {
                    Phase::Exit
                };
                assert_eq!(phase, expected, "slot {slot} at {t}");
                // phases only move forward within a cycle
                assert!(rank(phase) >= rank(last));
                last = phase;
                t += 0.01;
            }
        }
    }

    fn rank(phase: Phase) -> u8 {
        match phase {
            Phase::Entrance => 0,
            Phase::Hold => 1,
            Phase::Exit => 2,
            Phase::Pause => 3,
        }
    }

    #[test]
    fn test_short_hold_never_overlaps_entrance() {
        let settings = TimelineSettings {
            hold: Duration::ZERO,
            ..TimelineSettings::default()
        };
        let tl = Timeline::new(8, &settings);
        for slot in 0..8 {
            let (_, entrance_end) = tl.entrance_window(slot).unwrap();
            let (exit_start, _) = tl.exit_window(slot).unwrap();
            assert!(exit_start >= entrance_end);
        }
    }

    #[test]
    fn test_player_anchors_on_first_frame_and_kill_is_idempotent() {
        let mut player = TimelinePlayer::new(eight());
        let first = player.sample(Duration::from_secs(100)).unwrap();
        assert_eq!(first[0], ENTRANCE_FROM);
        assert_eq!(player.elapsed(Duration::from_secs(103)), Some(3.0));

        assert!(player.kill());
        assert!(!player.kill());
        assert_eq!(player.sample(Duration::from_secs(104)), None);

        player.restart();
        assert_eq!(player.elapsed(Duration::from_secs(200)), Some(0.0));
    }

    #[test]
    fn test_settings_deserialize_from_seconds() {
        let settings: TimelineSettings = serde_json::from_str(
            r#"{ "hold": 7.0,
                 "exit": { "duration": 0.5, "stagger": 0.1, "ease": "power2.inOut" } }"#,
        )
        .unwrap();
        assert_eq!(settings.hold, Duration::from_secs(7));
        assert_eq!(settings.exit.duration, Duration::from_millis(500));
        assert_eq!(settings.entrance, TimelineSettings::default().entrance);
    }
}
