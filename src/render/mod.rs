//! Content rendering: template resolution, flexbox layout, and
//! rasterization onto an RGBA canvas.
//!
//! The pipeline per frame: resolve the template, parse it into a node tree,
//! bind the content slots, solve the flexbox layout against the viewport,
//! then walk the solved tree drawing text and dithered images. The canvas
//! only ever holds black-on-white; red ink enters via caller-supplied
//! canvases handed straight to the packer.

pub mod node;
pub mod template;

mod image;
mod layout;
mod packer;
mod text;

use std::fs;
use std::path::Path;

use ::image::{Rgba, RgbaImage};
use fontdue::{Font, FontSettings};
use taffy::NodeId;

use crate::display::{Content, Slot};
use crate::error::Error;

pub use self::image::DitherKernel;
pub use self::layout::{PlacedRect, SolvedLayout};
pub use self::packer::{pack, FramePlanes};
pub use self::template::{resolve, TEMPLATE_AUTO, TEMPLATE_LANDSCAPE, TEMPLATE_PORTRAIT};

/// File name of the default face, looked up by the front end.
pub const DEFAULT_FONT_FILE: &str = "wqy-microhei.ttc";

const DEFAULT_FONT_SIZE: f32 = 9.0;
const DEFAULT_DPI: f32 = 72.0;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Renders bound content into packed-frame-ready canvases.
///
/// Holds the single glyph face, the base font size in points, the DPI the
/// point sizes resolve against, and the dither kernel for images. Immutable
/// once built, so one engine can serve any number of renders.
#[derive(Debug)]
pub struct RenderEngine {
    font: Font,
    font_size: f32,
    dpi: f32,
    kernel: DitherKernel,
}

impl RenderEngine {
    /// Builds an engine from font file bytes at the default 9 pt / 72 DPI.
    pub fn new(font_bytes: &[u8]) -> Result<Self, Error> {
        Self::with_options(font_bytes, DEFAULT_FONT_SIZE, DEFAULT_DPI)
    }

    /// Builds an engine with an explicit base size and DPI.
    pub fn with_options(font_bytes: &[u8], font_size: f32, dpi: f32) -> Result<Self, Error> {
        let font = Font::from_bytes(font_bytes, FontSettings::default())
            .map_err(|e| Error::FontLoad(e.to_string()))?;
        Ok(RenderEngine {
            font,
            font_size,
            dpi,
            kernel: DitherKernel::default(),
        })
    }

    /// Reads and parses a font file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| Error::FontLoad(format!("reading {}: {e}", path.display())))?;
        Self::new(&bytes)
    }

    /// Selects the dither kernel used for image content.
    pub fn with_kernel(mut self, kernel: DitherKernel) -> Self {
        self.kernel = kernel;
        self
    }

    /// Pixel size of the face at a per-node scale multiplier.
    fn px(&self, scale: f32) -> f32 {
        scale * self.font_size * self.dpi / 72.0
    }

    /// Measures wrapped text for the layout solver, in pixels.
    pub(crate) fn measure_text(&self, text: &str, scale: f32, hint_width: f32) -> (f32, f32) {
        text::measure(&self.font, self.px(scale), text, hint_width)
    }

    /// Renders `content` through `template` onto a fresh white canvas.
    ///
    /// Template and binding problems surface here, before any hardware is
    /// involved.
    pub fn render(
        &self,
        content: Content,
        width: u32,
        height: u32,
        template: &str,
    ) -> Result<RgbaImage, Error> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let template = template::resolve(template, width, height);
        let mut root = node::Node::parse(template)?;
        root.bind(content.into_slots())?;

        let solved = layout::solve(root, width, height, self)?;
        if log::log_enabled!(log::Level::Debug) {
            for rect in solved.rects(width, height)? {
                log::debug!(
                    "node {}: [{}, {}] {}x{}",
                    rect.id.as_deref().unwrap_or("-"),
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height
                );
            }
        }

        let mut canvas = RgbaImage::from_pixel(width, height, WHITE);
        self.draw_node(&solved, solved.root, 0, 0, &mut canvas)?;
        Ok(canvas)
    }

    /// Lays out a bound tree without rasterizing, for callers that only
    /// need geometry.
    pub fn layout(
        &self,
        mut root: node::Node,
        content: Content,
        width: u32,
        height: u32,
    ) -> Result<SolvedLayout, Error> {
        root.bind(content.into_slots())?;
        layout::solve(root, width, height, self)
    }

    fn draw_node(
        &self,
        solved: &SolvedLayout,
        node: NodeId,
        offset_x: i32,
        offset_y: i32,
        canvas: &mut RgbaImage,
    ) -> Result<(), Error> {
        let layout = solved
            .tree
            .layout(node)
            .map_err(|e| Error::Layout(e.to_string()))?;
        let x = offset_x + layout.location.x as i32;
        let y = offset_y + layout.location.y as i32;

        if let Some(node_box) = solved.tree.get_node_context(node) {
            if let Some(slot) = &node_box.content {
                let left = x + layout.padding.left as i32;
                let top = y + layout.padding.top as i32;
                let right = x + layout.size.width as i32 - layout.padding.right as i32;
                let bottom = y + layout.size.height as i32 - layout.padding.bottom as i32;
                match slot {
                    Slot::Text(value) => text::draw(
                        &self.font,
                        self.px(node_box.font_size),
                        value,
                        left,
                        top,
                        (right - left).max(0) as f32,
                        canvas,
                    ),
                    Slot::Image(value) => image::draw(
                        value,
                        self.kernel,
                        left,
                        top,
                        right - left,
                        bottom - top,
                        canvas,
                    ),
                }
            }
        }

        let children = solved
            .tree
            .children(node)
            .map_err(|e| Error::Layout(e.to_string()))?;
        for child in children {
            self.draw_node(solved, child, x, y, canvas)?;
        }
        Ok(())
    }
}
