use crate::config::PageConfig;
use gdk_pixbuf::Pixbuf;
use orbit::geometry::{Rect, Size};
use orbit::settings::AssetPath;
use orbit::stage::Stage;

/// The painted side of the hero: measured size, the heading box from the last
/// paint, and one image handle per slot.
pub struct Canvas {
    page: PageConfig,
    size: Option<Size>,
    heading: Option<Rect>,
    images: Vec<Option<Pixbuf>>,
}

impl Canvas {
    pub fn new(page: &PageConfig, assets: &[AssetPath]) -> Self {
        Self {
            images: Self::load_images(page, assets),
            page: page.clone(),
            size: None,
            heading: None,
        }
    }

    /// Swaps in new page content and images, keeping the measured size.
    pub fn reload(&mut self, page: &PageConfig, assets: &[AssetPath]) {
        self.images = Self::load_images(page, assets);
        self.page = page.clone();
        self.heading = None;
    }

    fn load_images(page: &PageConfig, assets: &[AssetPath]) -> Vec<Option<Pixbuf>> {
        assets
            .iter()
            .map(|asset| {
                let path = page.resolve_asset(asset);
                Pixbuf::from_file(&path)
                    .inspect_err(|e| {
                        log::warn!("Hero image {} unavailable: {}", path.display(), e)
                    })
                    .ok()
            })
            .collect()
    }

    pub fn page(&self) -> &PageConfig {
        &self.page
    }

    pub fn size(&self) -> Option<Size> {
        self.size
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = (width > 0.0 && height > 0.0).then(|| Size::new(width, height));
    }

    pub fn set_heading(&mut self, heading: Option<Rect>) {
        self.heading = heading;
    }

    pub fn image(&self, slot: usize) -> Option<&Pixbuf> {
        self.images.get(slot).and_then(Option::as_ref)
    }
}

impl Stage for Canvas {
    fn container(&self) -> Option<Size> {
        self.size
    }

    fn heading(&self) -> Option<Rect> {
        self.heading
    }

    fn is_attached(&self, slot: usize) -> bool {
        slot < self.images.len()
    }
}
