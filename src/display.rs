//! Content model and the high-level display abstraction.
//!
//! A [`Display`] is anything that can take structured [`Content`] and put it
//! in front of the user: the physical panel ([`Epd42`](crate::epd::Epd42))
//! or the file-backed renderer ([`FileDisplay`]) used for previewing layouts
//! without hardware attached.

use std::collections::HashMap;
use std::path::PathBuf;

use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::Error;
use crate::render::{RenderEngine, TEMPLATE_AUTO};

/// Screen orientation of the attached display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Parses an orientation name, case insensitively.
    ///
    /// Anything other than "portrait" maps to [`Orientation::Landscape`].
    pub fn parse(name: &str) -> Self {
        if name.eq_ignore_ascii_case("portrait") {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    /// Render dimensions for a panel of `width`x`height` in this orientation.
    pub(crate) fn frame_size(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Orientation::Landscape => (width, height),
            Orientation::Portrait => (height, width),
        }
    }
}

/// A value bound into a template slot.
///
/// Slots are a closed set: text or a decoded bitmap. Decoding file formats
/// is the caller's concern; the pipeline only consumes bitmaps.
#[derive(Debug, Clone)]
pub enum Slot {
    Text(String),
    Image(DynamicImage),
}

impl Slot {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Slot::Text(_) => "text",
            Slot::Image(_) => "image",
        }
    }
}

/// Content to show, keyed by template slot id.
///
/// Ids with no matching node in the template are silently dropped, which
/// keeps templates reusable across callers.
#[derive(Debug, Clone, Default)]
pub struct Content {
    slots: HashMap<String, Slot>,
}

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a text value to `id`. Replaces any previous value for the id.
    pub fn text(mut self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(id.into(), Slot::Text(value.into()));
        self
    }

    /// Binds a decoded bitmap to `id`. Replaces any previous value.
    pub fn image(mut self, id: impl Into<String>, value: DynamicImage) -> Self {
        self.slots.insert(id.into(), Slot::Image(value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn into_slots(self) -> HashMap<String, Slot> {
        self.slots
    }
}

/// The abstract high-level operations of an attached display.
pub trait Display {
    /// Renders `content` and pushes the frame out.
    fn show(&mut self, content: Content) -> Result<(), Error>;

    /// Blanks the display.
    fn clear(&mut self) -> Result<(), Error>;

    /// Native width in pixels.
    fn width(&self) -> u32;

    /// Native height in pixels.
    fn height(&self) -> u32;
}

/// A pure renderer that writes frames to a PNG file instead of a panel.
///
/// Useful for iterating on templates and content on a workstation; there is
/// no bus and no panel state behind it.
pub struct FileDisplay {
    engine: RenderEngine,
    width: u32,
    height: u32,
    orientation: Orientation,
    template: Option<String>,
    path: PathBuf,
}

impl FileDisplay {
    pub fn new(
        engine: RenderEngine,
        width: u32,
        height: u32,
        orientation: Orientation,
        path: impl Into<PathBuf>,
    ) -> Self {
        FileDisplay {
            engine,
            width,
            height,
            orientation,
            template: None,
            path: path.into(),
        }
    }

    /// Uses a caller-supplied template instead of the built-in pair.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    fn save(&self, canvas: &RgbaImage) -> Result<(), Error> {
        canvas
            .save(&self.path)
            .map_err(|e| Error::Io(format!("writing {}: {e}", self.path.display())))
    }
}

impl Display for FileDisplay {
    fn show(&mut self, content: Content) -> Result<(), Error> {
        let (w, h) = self.orientation.frame_size(self.width, self.height);
        let template = self.template.as_deref().unwrap_or(TEMPLATE_AUTO);
        let canvas = self.engine.render(content, w, h, template)?;
        log::debug!("writing rendered frame to {}", self.path.display());
        self.save(&canvas)
    }

    fn clear(&mut self) -> Result<(), Error> {
        let (w, h) = self.orientation.frame_size(self.width, self.height);
        let white = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]));
        self.save(&white)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_parse_is_case_insensitive() {
        assert_eq!(Orientation::parse("Portrait"), Orientation::Portrait);
        assert_eq!(Orientation::parse("PORTRAIT"), Orientation::Portrait);
        assert_eq!(Orientation::parse("landscape"), Orientation::Landscape);
    }

    #[test]
    fn orientation_parse_defaults_to_landscape() {
        assert_eq!(Orientation::parse(""), Orientation::Landscape);
        assert_eq!(Orientation::parse("upside-down"), Orientation::Landscape);
    }

    #[test]
    fn portrait_swaps_frame_size() {
        assert_eq!(Orientation::Portrait.frame_size(400, 300), (300, 400));
        assert_eq!(Orientation::Landscape.frame_size(400, 300), (400, 300));
    }

    #[test]
    fn content_builder_replaces_duplicates() {
        let content = Content::new().text("title", "first").text("title", "second");
        let slots = content.into_slots();
        match slots.get("title") {
            Some(Slot::Text(s)) => assert_eq!(s, "second"),
            other => panic!("unexpected slot {other:?}"),
        }
    }
}
