use super::canvas::Canvas;
use super::{ARC_DASH, CAPTION_FONT, INDICATOR_RADIUS, caption_margin, heading_font_size};
use crate::gui::theme::ThemeColors;
use cairo::{Context, FontSlant, FontWeight, Operator};
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use orbit::engine::BlendMode;
use orbit::geometry::{Rect, Size};
use orbit::hero::{HeroSection, SlotView};
use orbit::indicator::DecorationState;
use palette::Srgba;
use std::f64::consts::PI;

fn set_color(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

struct SlotRenderer<'a> {
    view: &'a SlotView,
    image: Option<&'a Pixbuf>,
    container: Size,
}

impl<'a> SlotRenderer<'a> {
    fn new(view: &'a SlotView, image: Option<&'a Pixbuf>, container: Size) -> Self {
        Self {
            view,
            image,
            container,
        }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let visibility = self.view.visibility;
        if visibility.opacity <= 0.0 || visibility.scale <= 0.0 {
            return Ok(());
        }

        let bounds = self.view.frame.bounds(self.container);
        let center = bounds.center();
        let half = bounds.width / 2.0;

        cr.save()?;
        cr.translate(center.x, center.y);
        cr.rotate(visibility.rotation.to_radians());
        cr.scale(visibility.scale, visibility.scale);
        cr.rectangle(-half, -half, bounds.width, bounds.height);
        cr.clip();

        if self.view.frame.blend == BlendMode::Difference {
            cr.set_operator(Operator::Difference);
        }

        match self.image {
            Some(pixbuf) => self.draw_image(cr, pixbuf, bounds.width, visibility.opacity)?,
            None => {
                set_color(cr, colors.placeholder);
                cr.paint_with_alpha(visibility.opacity)?;
            }
        }
        cr.restore()
    }

    /// Crops the image to a square and fills the slot with it.
    fn draw_image(
        &self,
        cr: &Context,
        pixbuf: &Pixbuf,
        side: f64,
        opacity: f64,
    ) -> Result<(), cairo::Error> {
        let (pw, ph) = (pixbuf.width() as f64, pixbuf.height() as f64);
        let cover = side / pw.min(ph);
        cr.scale(cover, cover);
        cr.set_source_pixbuf(pixbuf, -pw / 2.0, -ph / 2.0);
        cr.paint_with_alpha(opacity)
    }
}

fn draw_heading(
    cr: &Context,
    text: &str,
    size: Size,
    colors: &ThemeColors,
) -> Result<Rect, cairo::Error> {
    cr.save()?;
    cr.select_font_face("Sans", FontSlant::Normal, FontWeight::Bold);
    cr.set_font_size(heading_font_size(size.width));

    let ext = cr.text_extents(text)?;
    let bounds = Rect::new(
        (size.width - ext.width()) / 2.0,
        (size.height - ext.height()) / 2.0,
        ext.width(),
        ext.height(),
    );

    // heading sits above the images and inverts whatever is under it
    cr.set_operator(Operator::Difference);
    set_color(cr, colors.heading);
    cr.move_to(bounds.x - ext.x_bearing(), bounds.y - ext.y_bearing());
    cr.show_text(text)?;
    cr.restore()?;

    Ok(bounds)
}

fn draw_globe(cr: &Context, x: f64, y: f64, rotation: f64) -> Result<(), cairo::Error> {
    cr.save()?;
    cr.translate(x, y);
    cr.rotate(rotation.to_radians());
    cr.set_line_width(1.5);

    cr.arc(0.0, 0.0, INDICATOR_RADIUS, 0.0, 2.0 * PI);
    cr.move_to(-INDICATOR_RADIUS, 0.0);
    cr.line_to(INDICATOR_RADIUS, 0.0);
    cr.stroke()?;

    // meridian
    cr.save()?;
    cr.scale(0.45, 1.0);
    cr.arc(0.0, 0.0, INDICATOR_RADIUS, 0.0, 2.0 * PI);
    cr.restore()?;
    cr.stroke()?;

    cr.restore()
}

fn draw_pin(cr: &Context, x: f64, y: f64, deco: &DecorationState) -> Result<(), cairo::Error> {
    cr.save()?;
    cr.translate(x, y);

    // rotating dashed arc around the pin
    cr.save()?;
    cr.rotate(deco.arc_rotation.to_radians());
    cr.set_line_width(2.0);
    cr.set_dash(&ARC_DASH, 0.0);
    cr.arc(0.0, 0.0, INDICATOR_RADIUS, 0.0, 2.0 * PI);
    cr.stroke()?;
    cr.restore()?;

    // pin head and point
    cr.translate(0.0, deco.pin_offset);
    cr.arc(0.0, -3.0, 5.0, PI, 0.0);
    cr.line_to(0.0, 7.0);
    cr.close_path();
    cr.fill()?;

    cr.restore()
}

fn draw_captions(
    cr: &Context,
    canvas: &Canvas,
    size: Size,
    is_mobile: bool,
    deco: &DecorationState,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let (side, bottom) = caption_margin(is_mobile);
    let baseline = size.height - bottom;
    let icon_y = baseline - CAPTION_FONT / 3.0;

    cr.save()?;
    set_color(cr, colors.caption);
    cr.select_font_face("Sans", FontSlant::Normal, FontWeight::Normal);
    cr.set_font_size(CAPTION_FONT);

    // bottom left: globe + since
    draw_globe(cr, side + INDICATOR_RADIUS, icon_y, deco.globe_rotation)?;
    cr.move_to(side + INDICATOR_RADIUS * 2.0 + 12.0, baseline);
    cr.show_text(&canvas.page().since)?;

    // bottom right: location + pin
    let pin_x = size.width - side - INDICATOR_RADIUS * 2.0;
    draw_pin(cr, pin_x, icon_y, deco)?;
    let location = &canvas.page().location;
    let ext = cr.text_extents(location)?;
    cr.move_to(pin_x - INDICATOR_RADIUS * 2.0 - ext.x_advance(), baseline);
    cr.show_text(location)?;

    cr.restore()
}

pub fn draw(
    cr: &Context,
    canvas: &mut Canvas,
    hero: &HeroSection,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    set_color(cr, colors.background);
    cr.paint()?;

    let Some(size) = canvas.size() else {
        return Ok(());
    };

    // back arc first; the sort is stable so index order holds within a depth
    let mut views: Vec<SlotView> = hero.slot_views().collect();
    views.sort_by_key(|v| v.frame.depth);
    for view in &views {
        SlotRenderer::new(view, canvas.image(view.index), size).draw(cr, colors)?;
    }

    let heading = draw_heading(cr, &canvas.page().heading, size, colors)?;
    canvas.set_heading(Some(heading));

    draw_captions(
        cr,
        canvas,
        size,
        hero.layout().is_mobile,
        &hero.decorations(),
        colors,
    )
}
