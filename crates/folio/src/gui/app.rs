use crate::config::{self, Config};
use crate::events::AppEvent;
use crate::gui::hero::{self, Canvas};
use crate::gui::theme::{self, ThemeColors};
use crate::gui::window::{WidgetClock, WidgetViewport};
use gtk::prelude::*;
use gtk4 as gtk;
use orbit::frame::FrameClock;
use orbit::hero::Mounted;
use orbit::stage::Stage;
use relm4::prelude::*;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

pub const DEFAULT_WIDTH: i32 = 1280;
pub const DEFAULT_HEIGHT: i32 = 800;

pub struct AppModel {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub canvas: Rc<RefCell<Canvas>>,
    pub mounted: Rc<RefCell<Option<Mounted>>>,
    pub drawing_area: gtk::DrawingArea,
}

#[derive(Debug)]
pub enum AppMsg {
    ConfigReload,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

impl AppModel {
    /// Unmounts the current hero, if any, and mounts one for the current
    /// config. Orbit angles start over.
    fn mount_hero(&self) {
        let previous = self.mounted.borrow_mut().take();
        drop(previous);

        let viewport = WidgetViewport::new(&self.drawing_area, f64::from(DEFAULT_WIDTH));
        let clock: Rc<dyn FrameClock> = Rc::new(WidgetClock::new(&self.drawing_area));
        let stage: Rc<dyn Stage> = self.canvas.clone();

        let mounted = Mounted::mount(self.config.hero.clone(), &viewport, clock, stage);
        *self.mounted.borrow_mut() = Some(mounted);
        self.drawing_area.queue_draw();
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (
        Config,
        Option<PathBuf>,
        async_channel::Receiver<AppEvent>,
    );
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        #[name = "window"]
        gtk::ApplicationWindow {
            set_title: Some("Folio"),
            set_default_size: (DEFAULT_WIDTH, DEFAULT_HEIGHT),
            add_css_class: "folio-window",

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "folio-hero",
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (config, config_path, rx) = init;

        theme::load_css();

        let canvas = Rc::new(RefCell::new(Canvas::new(&config.page, &config.hero.assets)));

        let model = AppModel {
            config,
            config_path,
            canvas,
            mounted: Rc::new(RefCell::new(None)),
            drawing_area: gtk::DrawingArea::default(),
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();

        // connected before the hero's own resize listener, so the stage is
        // measured by the time the layout reacts
        let canvas_resize = model.canvas.clone();
        widgets.drawing_area.connect_resize(move |_, width, height| {
            canvas_resize
                .borrow_mut()
                .set_size(f64::from(width), f64::from(height));
        });

        let canvas_draw = model.canvas.clone();
        let mounted_draw = model.mounted.clone();
        widgets.drawing_area.set_draw_func(move |_, cr, _, _| {
            let colors = ThemeColors::default();
            let mounted = mounted_draw.borrow();
            let Some(mounted) = mounted.as_ref() else {
                return;
            };
            let (Ok(hero_section), Ok(mut canvas)) =
                (mounted.hero().try_borrow(), canvas_draw.try_borrow_mut())
            else {
                return;
            };
            if let Err(e) = hero::draw(cr, &mut canvas, &hero_section, &colors) {
                log::error!("Drawing error: {}", e);
            }
        });

        model.mount_hero();

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::ConfigReload => match config::load_config(self.config_path.as_deref()) {
                Ok(new_config) => {
                    self.config = new_config;
                    self.canvas
                        .borrow_mut()
                        .reload(&self.config.page, &self.config.hero.assets);
                    self.mount_hero();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
        }
    }
}
