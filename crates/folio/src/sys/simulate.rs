//! Headless run of the hero: a manual clock, a fixed viewport, and an
//! estimated heading box stand in for the window.

use crate::config::Config;
use crate::gui::hero::heading_font_size;
use orbit::geometry::{Rect, Size};
use orbit::headless::{FixedViewport, ManualClock, StaticStage};
use orbit::hero::Mounted;
use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct SimulateOptions {
    pub frames: usize,
    pub width: f64,
    pub height: f64,
    pub fps: f64,
    /// Switch the viewport to this width halfway through.
    pub resize_to: Option<f64>,
}

/// Rough box of the heading text: bold sans glyphs are about 0.6 em wide.
pub fn estimate_heading_bounds(text: &str, container: Size) -> Rect {
    let font = heading_font_size(container.width);
    let width = (text.chars().count() as f64 * font * 0.6).min(container.width);
    let height = font * 0.72;
    Rect::new(
        (container.width - width) / 2.0,
        (container.height - height) / 2.0,
        width,
        height,
    )
}

pub fn run(config: &Config, options: SimulateOptions, out: &mut impl Write) -> anyhow::Result<()> {
    config.hero.validate()?;
    if options.fps.is_nan() || options.fps <= 0.0 {
        anyhow::bail!("fps must be positive, got {}", options.fps);
    }
    let Ok(dt) = Duration::try_from_secs_f64(1.0 / options.fps) else {
        anyhow::bail!("fps {} gives a frame interval too long to represent", options.fps);
    };

    let container = Size::new(options.width, options.height);
    let stage = StaticStage::new(container)
        .with_heading(estimate_heading_bounds(&config.page.heading, container));
    let clock = ManualClock::new();
    let viewport = FixedViewport::new(options.width);
    let mut mounted = Mounted::mount(
        config.hero.clone(),
        &viewport,
        Rc::new(clock.clone()),
        Rc::new(stage),
    );

    let resize_at = options.resize_to.map(|w| (options.frames / 2, w));

    for frame in 0..options.frames {
        if let Some((at, width)) = resize_at
            && at == frame
        {
            log::info!("Resizing viewport to {} before frame {}", width, frame + 1);
            viewport.resize(width);
        }
        clock.tick(dt);
        serde_json::to_writer(&mut *out, &mounted.hero().borrow().snapshot())?;
        writeln!(out)?;
    }

    mounted.unmount();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(options: SimulateOptions) -> Vec<serde_json::Value> {
        let mut out = Vec::new();
        run(&Config::default(), options, &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_one_line_per_frame() {
        let frames = lines(SimulateOptions {
            frames: 20,
            width: 1200.0,
            height: 900.0,
            fps: 60.0,
            resize_to: None,
        });

        assert_eq!(frames.len(), 20);
        assert_eq!(frames[19]["frame"], 20);
        assert!(frames.iter().all(|f| f["layout"]["radius"] == 280.0));
        assert!(frames.iter().all(|f| f["slots"].as_array().map(Vec::len) == Some(8)));
    }

    #[test]
    fn test_resize_switches_layout_midway() {
        let frames = lines(SimulateOptions {
            frames: 10,
            width: 1200.0,
            height: 900.0,
            fps: 60.0,
            resize_to: Some(500.0),
        });

        assert_eq!(frames[4]["layout"]["is_mobile"], false);
        assert_eq!(frames[5]["layout"]["is_mobile"], true);
        assert_eq!(frames[5]["slots"][0]["size"], 100.0);
    }

    #[test]
    fn test_rejects_zero_fps() {
        let mut out = Vec::new();
        let options = SimulateOptions {
            frames: 1,
            width: 1200.0,
            height: 900.0,
            fps: 0.0,
            resize_to: None,
        };
        assert!(run(&Config::default(), options, &mut out).is_err());
    }

    #[test]
    fn test_rejects_vanishing_fps() {
        let mut out = Vec::new();
        let options = SimulateOptions {
            frames: 1,
            width: 1200.0,
            height: 900.0,
            fps: 1e-30,
            resize_to: None,
        };
        assert!(run(&Config::default(), options, &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_heading_estimate_is_centered() {
        let container = Size::new(1000.0, 800.0);
        let bounds = estimate_heading_bounds("JAI THAKUR", container);
        assert!((bounds.center().x - 500.0).abs() < 1e-9);
        assert!((bounds.center().y - 400.0).abs() < 1e-9);
        assert!(bounds.width <= container.width);
    }
}
