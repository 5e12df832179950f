//! Error type shared by the render pipeline and the panel driver.

use thiserror::Error;

/// Errors surfaced by template handling, rendering, and the panel driver.
///
/// Layout and content-binding errors are produced before any bus activity;
/// bus errors during a show terminate the sequence and leave the driver
/// [`faulted`](crate::epd::PanelState::Faulted).
#[derive(Debug, Error)]
pub enum Error {
    /// The layout template was not valid JSON or not a valid node tree.
    #[error("template parse error: {0}")]
    TemplateParse(#[from] serde_json::Error),

    /// A content slot was bound to a node type that cannot draw it.
    #[error("slot '{slot}' does not accept {kind} content")]
    SlotTypeMismatch { slot: String, kind: &'static str },

    /// The font data could not be parsed or the font file could not be read.
    #[error("font load error: {0}")]
    FontLoad(String),

    /// The bus port failed to bring up the SPI link or resolve its pins.
    #[error("bus init error: {0}")]
    BusInit(String),

    /// A write or pin operation on the bus failed.
    #[error("bus io error: {0}")]
    BusIo(String),

    /// A pin name that the bus port was never configured with.
    #[error("unknown pin '{0}'")]
    PinUnknown(String),

    /// Frame dimensions that cannot be packed into whole bytes.
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The busy signal never went idle within the configured bound.
    #[error("timed out waiting for the panel busy signal")]
    PanelTimeout,

    /// The driver faulted on an earlier bus error and must be reopened.
    #[error("panel driver is faulted and needs a reopen")]
    Faulted,

    /// Internal layout solver failure.
    #[error("layout error: {0}")]
    Layout(String),

    /// Filesystem output failure from the file-backed display.
    #[error("io error: {0}")]
    Io(String),
}
