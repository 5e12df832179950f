//! Flexbox-layout renderer and SPI driver for 4.2" tri-color e-paper panels.
//!
//! The crate turns structured content (title, body, footer, and an
//! optional bitmap) into a dithered 1-bit-per-plane frame and pushes it to
//! a 400×300 black/white/red panel over SPI with the usual RESET/DC/BUSY
//! control lines.
//!
//! ## Pipeline
//!
//! 1. A JSON layout template (built-in or caller supplied) is parsed into a
//!    node tree and the content slots are bound by id.
//! 2. The tree is solved as a flexbox layout against the panel viewport;
//!    bound nodes report intrinsic sizes through measure callbacks.
//! 3. Text is wrapped and drawn from a single glyph face; images are
//!    Lanczos-scaled, Atkinson-dithered, and centered in their boxes.
//! 4. The canvas packs into a black plane and a red plane, one bit per
//!    pixel, and the panel driver sequences
//!    reset → init → transmit → refresh → sleep over the bus.
//!
//! ## Example
//!
//! Previewing a frame without hardware attached:
//!
//! ```rust,no_run
//! use epdview::{Content, Display, FileDisplay, Orientation, RenderEngine};
//!
//! # fn main() -> Result<(), epdview::Error> {
//! let engine = RenderEngine::from_file("wqy-microhei.ttc")?;
//! let mut display = FileDisplay::new(engine, 400, 300, Orientation::Landscape, "frame.png");
//!
//! let content = Content::new()
//!     .text("title", "Hello World!")
//!     .text("body", "Rendered by flexbox, dithered by Atkinson.")
//!     .text("footer", "bye");
//! display.show(content)?;
//! # Ok(())
//! # }
//! ```
//!
//! Driving a physical panel is the same `Display` surface behind
//! [`Epd42::open`] with a platform [`Bus`] (see [`HalBus`] for the
//! `embedded-hal` adapter), plus [`Epd42::with_engine`] to attach the
//! renderer.

pub mod display;
pub mod epd;
pub mod error;
pub mod render;

pub use display::{Content, Display, FileDisplay, Orientation, Slot};
pub use epd::{Bus, Epd42, Epd42Config, HalBus, Level, PanelState, PinMode};
pub use error::Error;
pub use render::{pack, DitherKernel, FramePlanes, RenderEngine};
