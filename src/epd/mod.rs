//! Driver for the 400×300 4.2" tri-color e-paper panel.
//!
//! The panel speaks the common three-wire command set: SPI for command and
//! data bytes, a DC line selecting between them, RESET for hardware reset,
//! and a BUSY line the panel drives high while refreshing.
//!
//! ## Layering
//!
//! - [`bus`]: the abstract port the driver owns, SPI writes plus name-keyed
//!   GPIO access. [`HalBus`] adapts `embedded-hal` platforms to it.
//! - [`interface`]: wire framing, command vs. data transfers, the 3x200 ms
//!   reset, the busy-pin poll loop.
//! - [`driver`]: the [`Epd42`] state machine sequencing
//!   prepare → transmit → refresh → sleep, and the clear path.
//!
//! ## Refresh model
//!
//! Every show is a full refresh: both bit planes are transmitted and the
//! panel is put into deep sleep afterwards. Waking requires the full reset
//! and power-on sequence, which the driver re-runs automatically on the
//! next show or clear. A refresh takes a few seconds; the driver blocks on
//! the BUSY handshake for the duration.
//!
//! ## Plane polarity
//!
//! On the wire a cleared bit is ink: the black plane carries 0 for black
//! pixels and the red plane carries 0 for red pixels, idling at 0xFF.
//! This matches the panel's factory waveform tables; do not "fix" it
//! without the physical hardware to verify against.

pub mod bus;
pub mod cmd;
pub mod flag;
pub mod interface;

pub mod driver;

pub use bus::{Bus, HalBus, Level, PinMode};
pub use driver::{Epd42, Epd42Config, PanelState};

/// Native width of the 4.2" panel in pixels.
pub const EPD42_WIDTH: u32 = 400;

/// Native height of the 4.2" panel in pixels.
pub const EPD42_HEIGHT: u32 = 300;
