use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, Glyph, GlyphId, PxScale, PxScaleFont, ScaleFont, point};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::error::{Error, Result};

pub const CLOUD_WIDTH: u32 = 800;
pub const CLOUD_HEIGHT: u32 = 400;

const INITIAL_PX: f32 = 56.0;
const MIN_PX: f32 = 12.0;
const GAP: u32 = 4;
const SPIRAL_STEP: f32 = 0.35;
const SPIRAL_GROWTH: f32 = 1.8;
const MAX_ANGLE: f32 = 400.0;
const VERTICAL_SQUASH: f32 = 0.55;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

const PALETTE: &[Rgba<u8>] = &[
    Rgba([31, 119, 180, 255]),
    Rgba([214, 39, 40, 255]),
    Rgba([44, 160, 44, 255]),
    Rgba([255, 127, 14, 255]),
    Rgba([148, 103, 189, 255]),
    Rgba([140, 86, 75, 255]),
    Rgba([227, 119, 194, 255]),
    Rgba([23, 190, 207, 255]),
];

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Draws keyword clouds onto a fixed 800x400 white canvas. Every word is
/// rendered at the same size; the first word lands in the center and the
/// rest settle along an outward spiral.
#[derive(Debug)]
pub struct CloudRenderer {
    font: FontVec,
}

impl CloudRenderer {
    /// Loads the font at `font_path`, or tries a handful of well-known
    /// system font locations when none is given.
    pub fn new(font_path: Option<&Path>) -> Result<Self> {
        let path = resolve_font(font_path)?;
        let bytes = std::fs::read(&path)?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|_| Error::WordCloud(format!("{} is not a usable font", path.display())))?;
        debug!(font = %path.display(), "loaded word cloud font");
        Ok(Self { font })
    }

    pub fn render(&self, words: &[&str]) -> Result<RgbaImage> {
        if words.is_empty() {
            return Err(Error::WordCloud("no words to draw".into()));
        }

        // Shrink until every word fits on the canvas.
        let mut size = INITIAL_PX;
        while size >= MIN_PX {
            let scaled = self.font.as_scaled(PxScale::from(size));
            let boxes: Vec<(u32, u32)> = words.iter().map(|w| measure_box(&scaled, w)).collect();
            if let Some(origins) = place_boxes(&boxes, (CLOUD_WIDTH, CLOUD_HEIGHT)) {
                let mut image = RgbaImage::from_pixel(CLOUD_WIDTH, CLOUD_HEIGHT, WHITE);
                for (index, (word, origin)) in words.iter().zip(origins).enumerate() {
                    let color = PALETTE[index % PALETTE.len()];
                    draw_word(&mut image, &scaled, word, origin, color);
                }
                debug!(words = words.len(), px = f64::from(size), "rendered word cloud");
                return Ok(image);
            }
            size *= 0.85;
        }
        Err(Error::WordCloud("words do not fit on the canvas".into()))
    }

    pub fn render_to_file(&self, words: &[&str], path: &Path) -> Result<()> {
        let image = self.render(words)?;
        image
            .save(path)
            .map_err(|e| Error::WordCloud(format!("could not write {}: {e}", path.display())))?;
        Ok(())
    }
}

fn resolve_font(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return if path.exists() {
            Ok(path.to_path_buf())
        } else {
            Err(Error::WordCloud(format!(
                "font {} does not exist",
                path.display()
            )))
        };
    }
    FONT_CANDIDATES
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            Error::WordCloud(format!(
                "no usable font found; set {} to a .ttf file",
                crate::config::FONT_ENV
            ))
        })
}

fn measure_box(font: &PxScaleFont<&FontVec>, word: &str) -> (u32, u32) {
    let mut width = 0.0f32;
    let mut last: Option<GlyphId> = None;
    for c in word.chars() {
        let id = font.glyph_id(c);
        if let Some(prev) = last {
            width += font.kern(prev, id);
        }
        width += font.h_advance(id);
        last = Some(id);
    }
    (width.ceil() as u32 + 2, font.height().ceil() as u32 + 2)
}

/// Finds an origin for each box along an outward spiral so that no two
/// boxes overlap and every box stays inside `bounds`. Returns `None` when a
/// box cannot be placed, which tells the caller to try a smaller text size.
fn place_boxes(sizes: &[(u32, u32)], bounds: (u32, u32)) -> Option<Vec<(u32, u32)>> {
    let (bound_w, bound_h) = bounds;
    let center_x = bound_w as f32 / 2.0;
    let center_y = bound_h as f32 / 2.0;

    let mut placed: Vec<(u32, u32, u32, u32)> = Vec::new();
    let mut origins = Vec::with_capacity(sizes.len());

    for &(w, h) in sizes {
        if w > bound_w || h > bound_h {
            return None;
        }
        let mut found = None;
        let mut angle = 0.0f32;
        while angle <= MAX_ANGLE {
            let radius = SPIRAL_GROWTH * angle;
            let x = center_x + radius * angle.cos() - w as f32 / 2.0;
            let y = center_y + VERTICAL_SQUASH * radius * angle.sin() - h as f32 / 2.0;
            if x >= 0.0
                && y >= 0.0
                && x + w as f32 <= bound_w as f32
                && y + h as f32 <= bound_h as f32
            {
                let candidate = (x as u32, y as u32, w, h);
                if !placed.iter().any(|&prior| overlaps(candidate, prior)) {
                    found = Some((candidate.0, candidate.1));
                    break;
                }
            }
            angle += SPIRAL_STEP;
        }
        let origin = found?;
        placed.push((origin.0, origin.1, w, h));
        origins.push(origin);
    }
    Some(origins)
}

fn overlaps(a: (u32, u32, u32, u32), b: (u32, u32, u32, u32)) -> bool {
    let (ax, ay, aw, ah) = a;
    let (bx, by, bw, bh) = b;
    ax < bx + bw + GAP && bx < ax + aw + GAP && ay < by + bh + GAP && by < ay + ah + GAP
}

fn draw_word(
    image: &mut RgbaImage,
    font: &PxScaleFont<&FontVec>,
    word: &str,
    origin: (u32, u32),
    color: Rgba<u8>,
) {
    let baseline = origin.1 as f32 + font.ascent();
    let mut caret = origin.0 as f32;
    let mut last: Option<GlyphId> = None;

    for c in word.chars() {
        let id = font.glyph_id(c);
        if let Some(prev) = last {
            caret += font.kern(prev, id);
        }
        let mut glyph: Glyph = id.with_scale(font.scale());
        glyph.position = point(caret, baseline);
        caret += font.h_advance(id);
        last = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let px_bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = px_bounds.min.x as i32 + gx as i32;
                let py = px_bounds.min.y as i32 + gy as i32;
                if px >= 0 && py >= 0 && (px as u32) < image.width() && (py as u32) < image.height()
                {
                    let pixel = image.get_pixel_mut(px as u32, py as u32);
                    *pixel = blend(*pixel, color, coverage);
                }
            });
        }
    }
}

fn blend(under: Rgba<u8>, over: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let alpha = coverage.clamp(0.0, 1.0);
    let mix = |u: u8, o: u8| (f32::from(u) * (1.0 - alpha) + f32::from(o) * alpha).round() as u8;
    Rgba([
        mix(under[0], over[0]),
        mix(under[1], over[1]),
        mix(under[2], over[2]),
        255,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_bounds(origin: (u32, u32), size: (u32, u32), bounds: (u32, u32)) -> bool {
        origin.0 + size.0 <= bounds.0 && origin.1 + size.1 <= bounds.1
    }

    #[test]
    fn single_box_lands_in_the_center() {
        let origins = place_boxes(&[(100, 40)], (800, 400)).unwrap();
        assert_eq!(origins, vec![(350, 180)]);
    }

    #[test]
    fn placed_boxes_stay_separated_and_inside() {
        let sizes = vec![(120, 40); 6];
        let origins = place_boxes(&sizes, (800, 400)).unwrap();
        assert_eq!(origins.len(), 6);
        for (origin, size) in origins.iter().zip(&sizes) {
            assert!(in_bounds(*origin, *size, (800, 400)));
        }
        for i in 0..origins.len() {
            for j in (i + 1)..origins.len() {
                let a = (origins[i].0, origins[i].1, sizes[i].0, sizes[i].1);
                let b = (origins[j].0, origins[j].1, sizes[j].0, sizes[j].1);
                assert!(!overlaps(a, b), "boxes {i} and {j} overlap");
            }
        }
    }

    #[test]
    fn oversized_box_fails_placement() {
        assert!(place_boxes(&[(900, 50)], (800, 400)).is_none());
    }

    #[test]
    fn crowded_canvas_fails_placement() {
        let sizes = vec![(400, 200); 3];
        assert!(place_boxes(&sizes, (800, 400)).is_none());
    }

    #[test]
    fn no_boxes_is_a_successful_layout() {
        assert_eq!(place_boxes(&[], (800, 400)), Some(vec![]));
    }

    #[test]
    fn empty_word_list_is_an_error() {
        // Needs a system font; skip quietly on hosts without one.
        let Ok(renderer) = CloudRenderer::new(None) else {
            return;
        };
        assert!(matches!(renderer.render(&[]), Err(Error::WordCloud(_))));
    }

    #[test]
    fn rendered_cloud_has_expected_dimensions() {
        let Ok(renderer) = CloudRenderer::new(None) else {
            return;
        };
        let image = renderer.render(&["alpha", "beta", "gamma"]).unwrap();
        assert_eq!(image.dimensions(), (CLOUD_WIDTH, CLOUD_HEIGHT));
        assert_eq!(*image.get_pixel(0, 0), WHITE);
        assert!(image.pixels().any(|p| *p != WHITE));
    }

    #[test]
    fn missing_font_path_is_reported() {
        let err = CloudRenderer::new(Some(Path::new("/nonexistent/font.ttf"))).unwrap_err();
        assert!(matches!(err, Error::WordCloud(_)));
    }
}
