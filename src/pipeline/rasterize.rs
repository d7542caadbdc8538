//! Pixel grid → SVG: one unit `<rect>` per pixel.
//!
//! The viewBox equals the pixel grid (`0,0,width,height`) and the declared
//! `width`/`height` equal the caller's size token, so a renderer scales every
//! cell to `size / width` without resampling. Nothing is merged or
//! compressed; the output is a literal transcription of the grid.
//!
//! ## Layout contract
//!
//! Rects are emitted row by row: the outer loop runs over `y`, the inner over
//! `x`. Pixel `(x, y)` lands at `x="{x}" y="{y}"` with id `box{x}-{y}`.
//! Files generated by earlier tooling follow exactly this text, so any change
//! here (attribute order, whitespace, number formatting) breaks byte
//! compatibility with them.

use crate::error::Tag2SvgError;
use crate::output::VectorDocument;
use image::RgbaImage;
use std::fmt::Write;
use tracing::debug;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" standalone=\"yes\"?>\n";
const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Approximate bytes per emitted rect line, used to pre-size the buffer.
const RECT_LINE_ESTIMATE: usize = 96;

/// Rasterize a `width × height` grid into an SVG document.
///
/// `pixel_at(x, y)` must return the RGBA colour of every in-range cell.
/// `size` is written verbatim into the `width` and `height` attributes.
///
/// # Errors
/// [`Tag2SvgError::InvalidInput`] when either dimension is zero or
/// `pixel_at` returns `None` for a required coordinate. No partial document
/// is ever returned.
///
/// # Example
/// ```rust
/// use tag2svg::pipeline::rasterize;
///
/// let doc = rasterize(1, 1, |_, _| Some([255, 0, 0, 255]), "20mm").unwrap();
/// assert!(doc.as_str().contains(r#"fill="rgba(255, 0, 0, 1.0)""#));
/// assert_eq!(doc.primitive_count(), 1);
/// ```
pub fn rasterize<F>(
    width: u32,
    height: u32,
    mut pixel_at: F,
    size: &str,
) -> Result<VectorDocument, Tag2SvgError>
where
    F: FnMut(u32, u32) -> Option<[u8; 4]>,
{
    if width == 0 || height == 0 {
        return Err(Tag2SvgError::invalid_input(format!(
            "pixel grid must be at least 1x1, got {width}x{height}"
        )));
    }

    let cells = width as usize * height as usize;
    let mut svg = String::with_capacity(256 + cells * RECT_LINE_ESTIMATE);

    svg.push_str(XML_DECLARATION);
    writeln!(
        svg,
        "<svg width=\"{size}\" height=\"{size}\" viewBox=\"0,0,{width},{height}\" xmlns=\"{SVG_NAMESPACE}\">"
    )
    .map_err(fmt_error)?;

    for y in 0..height {
        for x in 0..width {
            let rgba = pixel_at(x, y).ok_or_else(|| {
                Tag2SvgError::invalid_input(format!(
                    "no pixel at ({x}, {y}) in a {width}x{height} grid"
                ))
            })?;
            push_rect(&mut svg, x, y, rgba)?;
        }
    }

    svg.push_str("</svg>\n");

    debug!(
        "Rasterized {}x{} grid → {} rects, {} bytes",
        width,
        height,
        cells,
        svg.len()
    );

    Ok(VectorDocument::new(width, height, size, svg))
}

/// Rasterize a decoded RGBA image.
pub fn rasterize_image(image: &RgbaImage, size: &str) -> Result<VectorDocument, Tag2SvgError> {
    rasterize(
        image.width(),
        image.height(),
        |x, y| image.get_pixel_checked(x, y).map(|p| p.0),
        size,
    )
}

fn push_rect(svg: &mut String, x: u32, y: u32, rgba: [u8; 4]) -> Result<(), Tag2SvgError> {
    writeln!(
        svg,
        "\t<rect width=\"1\" height=\"1\" x=\"{x}\" y=\"{y}\" fill=\"{}\" id=\"box{x}-{y}\"/>",
        rgba_paint(rgba)
    )
    .map_err(fmt_error)
}

/// `rgba(r, g, b, a)` with alpha scaled to 0.0–1.0.
///
/// `{:?}` prints the shortest round-trip form and always keeps a decimal
/// point, so 255 becomes `1.0` rather than `1`.
fn rgba_paint([r, g, b, a]: [u8; 4]) -> String {
    let alpha = f64::from(a) / 255.0;
    format!("rgba({r}, {g}, {b}, {alpha:?})")
}

fn fmt_error(e: std::fmt::Error) -> Tag2SvgError {
    Tag2SvgError::Internal(format!("SVG formatting failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn rect_count(doc: &VectorDocument) -> usize {
        doc.as_str().matches("<rect ").count()
    }

    #[test]
    fn two_by_two_scenario_exact_text() {
        let grid = [[WHITE, BLACK], [BLACK, WHITE]];
        let doc = rasterize(2, 2, |x, y| Some(grid[y as usize][x as usize]), "10px").unwrap();

        let expected = "<?xml version=\"1.0\" standalone=\"yes\"?>\n\
<svg width=\"10px\" height=\"10px\" viewBox=\"0,0,2,2\" xmlns=\"http://www.w3.org/2000/svg\">\n\
\t<rect width=\"1\" height=\"1\" x=\"0\" y=\"0\" fill=\"rgba(255, 255, 255, 1.0)\" id=\"box0-0\"/>\n\
\t<rect width=\"1\" height=\"1\" x=\"1\" y=\"0\" fill=\"rgba(0, 0, 0, 1.0)\" id=\"box1-0\"/>\n\
\t<rect width=\"1\" height=\"1\" x=\"0\" y=\"1\" fill=\"rgba(0, 0, 0, 1.0)\" id=\"box0-1\"/>\n\
\t<rect width=\"1\" height=\"1\" x=\"1\" y=\"1\" fill=\"rgba(255, 255, 255, 1.0)\" id=\"box1-1\"/>\n\
</svg>\n";
        assert_eq!(doc.as_str(), expected);
        assert_eq!(doc.primitive_count(), 4);
    }

    #[test]
    fn rect_count_equals_cell_count() {
        for (w, h) in [(1, 1), (1, 7), (7, 1), (8, 8), (10, 3)] {
            let doc = rasterize(w, h, |_, _| Some(WHITE), "20mm").unwrap();
            assert_eq!(rect_count(&doc), (w * h) as usize, "{w}x{h}");
            assert_eq!(doc.primitive_count(), (w * h) as usize);
        }
    }

    #[test]
    fn single_pixel_sits_at_origin() {
        let doc = rasterize(1, 1, |_, _| Some(BLACK), "20mm").unwrap();
        assert_eq!(rect_count(&doc), 1);
        assert!(doc.as_str().contains(r#"x="0" y="0""#));
        assert!(doc.as_str().contains(r#"id="box0-0""#));
    }

    #[test]
    fn alpha_is_normalised() {
        assert_eq!(rgba_paint([255, 0, 0, 255]), "rgba(255, 0, 0, 1.0)");
        assert_eq!(rgba_paint([0, 0, 0, 0]), "rgba(0, 0, 0, 0.0)");
        assert_eq!(rgba_paint([1, 2, 3, 51]), "rgba(1, 2, 3, 0.2)");
        assert_eq!(rgba_paint([9, 9, 9, 128]), "rgba(9, 9, 9, 0.5019607843137255)");
    }

    #[test]
    fn size_is_passed_through_verbatim() {
        let doc = rasterize(8, 3, |_, _| Some(WHITE), "20mm").unwrap();
        assert!(doc
            .as_str()
            .contains(r#"<svg width="20mm" height="20mm" viewBox="0,0,8,3""#));
        assert_eq!(doc.size(), "20mm");
    }

    #[test]
    fn x_is_horizontal_on_non_square_grids() {
        // Only the top-right pixel of a 3x2 grid is black.
        let doc = rasterize(
            3,
            2,
            |x, y| Some(if (x, y) == (2, 0) { BLACK } else { WHITE }),
            "1in",
        )
        .unwrap();
        assert!(doc
            .as_str()
            .contains(r#"x="2" y="0" fill="rgba(0, 0, 0, 1.0)" id="box2-0""#));

        let ids: Vec<&str> = doc
            .as_str()
            .lines()
            .filter_map(|l| l.split("id=\"").nth(1))
            .map(|rest| rest.trim_end_matches("\"/>"))
            .collect();
        assert_eq!(ids, ["box0-0", "box1-0", "box2-0", "box0-1", "box1-1", "box2-1"]);
    }

    #[test]
    fn output_is_deterministic() {
        let f = |x: u32, y: u32| Some([(x * 17) as u8, (y * 31) as u8, 7, (x + y) as u8]);
        let a = rasterize(9, 5, f, "2in").unwrap();
        let b = rasterize(9, 5, f, "2in").unwrap();
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn zero_dimension_is_invalid_input() {
        for (w, h) in [(0, 0), (0, 4), (4, 0)] {
            let err = rasterize(w, h, |_, _| Some(WHITE), "20mm").unwrap_err();
            assert!(matches!(err, Tag2SvgError::InvalidInput { .. }), "{w}x{h}");
        }
    }

    #[test]
    fn missing_pixel_is_invalid_input() {
        // Claims 4x4 but only has data for a 3x3 region.
        let err = rasterize(4, 4, |x, y| (x < 3 && y < 3).then_some(WHITE), "20mm").unwrap_err();
        match err {
            Tag2SvgError::InvalidInput { detail } => assert!(detail.contains("(3, 0)"), "{detail}"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rasterize_image_reads_buffer() {
        let mut img = RgbaImage::from_pixel(2, 1, Rgba(WHITE));
        img.put_pixel(1, 0, Rgba([10, 20, 30, 0]));
        let doc = rasterize_image(&img, "5mm").unwrap();
        assert!(doc
            .as_str()
            .contains(r#"x="1" y="0" fill="rgba(10, 20, 30, 0.0)" id="box1-0""#));
        assert_eq!((doc.width(), doc.height()), (2, 1));
    }

    #[test]
    fn empty_image_is_invalid_input() {
        let img = RgbaImage::new(0, 0);
        assert!(matches!(
            rasterize_image(&img, "20mm"),
            Err(Tag2SvgError::InvalidInput { .. })
        ));
    }
}
