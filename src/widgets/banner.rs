//! Banner image drawn with upper-half-block cells: foreground is the top pixel, background the
//! bottom one.

use image::imageops::{self, FilterType};
use image::RgbImage;
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Color,
    widgets::Widget,
};
use std::path::Path;

pub struct Banner {
    image: RgbImage,
    /// Last resize, keyed by cell size.
    cache: Option<((u16, u16), RgbImage)>,
}

impl Banner {
    pub fn load(path: &Path) -> Result<Self, image::ImageError> {
        Ok(Self::from_image(image::open(path)?.to_rgb8()))
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self { image, cache: None }
    }

    /// Largest (columns, rows) that fits in the bounds and keeps the aspect ratio.
    pub fn fit(&self, max_width: u16, max_height: u16) -> (u16, u16) {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 || max_width == 0 || max_height == 0 {
            return (0, 0);
        }
        let (w, h) = (u64::from(w), u64::from(h));
        let rows = (u64::from(max_width) * h).div_ceil(w * 2);
        if rows <= u64::from(max_height) {
            return (max_width, rows.max(1) as u16);
        }
        let cols = (u64::from(max_height) * 2 * w / h).clamp(1, u64::from(max_width));
        (cols as u16, max_height)
    }

    fn scaled(&mut self, cols: u16, rows: u16) -> &RgbImage {
        let stale = !matches!(&self.cache, Some((size, _)) if *size == (cols, rows));
        if stale {
            let resized = imageops::resize(
                &self.image,
                u32::from(cols),
                u32::from(rows) * 2,
                FilterType::Triangle,
            );
            self.cache = Some(((cols, rows), resized));
        }
        match &self.cache {
            Some((_, img)) => img,
            None => &self.image,
        }
    }
}

impl Widget for &mut Banner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (cols, rows) = self.fit(area.width, area.height);
        if cols == 0 || rows == 0 {
            return;
        }
        let x0 = area.x + (area.width - cols) / 2;
        let img = self.scaled(cols, rows);

        for row in 0..rows {
            for col in 0..cols {
                let top = img.get_pixel(u32::from(col), u32::from(row) * 2);
                let bottom = img.get_pixel(u32::from(col), u32::from(row) * 2 + 1);
                if let Some(cell) = buf.cell_mut(Position::new(x0 + col, area.y + row)) {
                    cell.set_symbol("▀")
                        .set_fg(Color::Rgb(top[0], top[1], top[2]))
                        .set_bg(Color::Rgb(bottom[0], bottom[1], bottom[2]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn banner(w: u32, h: u32) -> Banner {
        Banner::from_image(RgbImage::from_pixel(w, h, Rgb([10, 20, 30])))
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        assert_eq!(banner(4, 2).fit(10, 10), (10, 3));
        assert_eq!(banner(4, 2).fit(10, 1), (4, 1));
        assert_eq!(banner(100, 100).fit(40, 8), (16, 8));
        assert_eq!(banner(0, 0).fit(40, 8), (0, 0));
    }

    #[test]
    fn renders_half_blocks_centred() {
        let mut banner = banner(100, 100);
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        (&mut banner).render(area, &mut buf);
        assert_eq!(buf[(12, 0)].symbol(), "▀");
        assert_eq!(buf[(27, 7)].symbol(), "▀");
        assert_eq!(buf[(11, 0)].symbol(), " ");
        assert_eq!(buf[(28, 0)].symbol(), " ");
    }
}
