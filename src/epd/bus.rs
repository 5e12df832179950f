//! The bus port: the capability object the panel driver talks through.
//!
//! The driver never touches a HAL directly. It owns a [`Bus`], addresses the
//! RESET/DC/BUSY pins by name, and writes command/data bytes to the SPI link.
//! [`HalBus`] adapts any platform with `embedded-hal` SPI and GPIO types to
//! the port; tests substitute a recording bus.

use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::error::Error;

/// Logic level of a GPIO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Direction and initial state requested for a pin at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Output(Level),
    InputPullDown,
}

/// Exclusive handle on the SPI link and the named control pins.
///
/// The wire contract for the attached panel: SPI mode 0, MSB first, 2 MHz,
/// 8-bit words. `write` may be full duplex with the read side discarded.
pub trait Bus {
    /// Opens the SPI link at `spi_address` and resolves `pins` by name.
    fn init(&mut self, spi_address: &str, pins: &[&str]) -> Result<(), Error>;

    /// Sets a pin's direction and initial state.
    fn configure(&mut self, pin: &str, mode: PinMode) -> Result<(), Error>;

    /// Reads a digital input; true is high.
    fn digital_read(&mut self, pin: &str) -> Result<bool, Error>;

    /// Drives a digital output.
    fn digital_write(&mut self, pin: &str, level: Level) -> Result<(), Error>;

    /// Transmits bytes on the SPI link.
    fn write(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Name of the chip-select pin, for explicit framing writes.
    fn cs(&self) -> &str;

    /// Releases the link and pins.
    fn close(&mut self) -> Result<(), Error>;
}

/// Name the [`HalBus`] chip-select answers to.
pub const HAL_CS: &str = "CS";

/// [`Bus`] over `embedded-hal` traits.
///
/// Pin directions are fixed by the platform types, so `configure` only
/// validates the name. Chip-select belongs to the `SpiDevice`, which asserts
/// it for the duration of each `write` block; explicit writes to the CS name
/// are accepted and ignored. That is the per-block CS coalescing the panel
/// protocol permits, and it means DC can never toggle mid-block.
pub struct HalBus<SPI, RST, DC, BUSY> {
    spi: SPI,
    rst: RST,
    dc: DC,
    busy: BUSY,
    reset_name: String,
    dc_name: String,
    busy_name: String,
}

impl<SPI, RST, DC, BUSY> HalBus<SPI, RST, DC, BUSY> {
    pub fn new(spi: SPI, rst: RST, dc: DC, busy: BUSY) -> Self {
        HalBus {
            spi,
            rst,
            dc,
            busy,
            reset_name: String::new(),
            dc_name: String::new(),
            busy_name: String::new(),
        }
    }
}

impl<SPI, RST, DC, BUSY> Bus for HalBus<SPI, RST, DC, BUSY>
where
    SPI: SpiDevice,
    RST: OutputPin,
    DC: OutputPin,
    BUSY: InputPin,
{
    fn init(&mut self, spi_address: &str, pins: &[&str]) -> Result<(), Error> {
        let [reset, dc, busy] = pins else {
            return Err(Error::BusInit(format!(
                "expected reset, dc, busy pin names, got {} names",
                pins.len()
            )));
        };
        // The SpiDevice is already connected; the address is informational.
        log::debug!("bus up on {spi_address} (reset={reset} dc={dc} busy={busy})");
        self.reset_name = (*reset).to_string();
        self.dc_name = (*dc).to_string();
        self.busy_name = (*busy).to_string();
        Ok(())
    }

    fn configure(&mut self, pin: &str, mode: PinMode) -> Result<(), Error> {
        if pin == self.busy_name {
            return Ok(());
        }
        match mode {
            PinMode::Output(level) => self.digital_write(pin, level),
            PinMode::InputPullDown => Err(Error::PinUnknown(pin.to_string())),
        }
    }

    fn digital_read(&mut self, pin: &str) -> Result<bool, Error> {
        if pin == self.busy_name {
            self.busy
                .is_high()
                .map_err(|e| Error::BusIo(format!("busy read: {e:?}")))
        } else {
            Err(Error::PinUnknown(pin.to_string()))
        }
    }

    fn digital_write(&mut self, pin: &str, level: Level) -> Result<(), Error> {
        let result = if pin == self.reset_name {
            match level {
                Level::High => self.rst.set_high(),
                Level::Low => self.rst.set_low(),
            }
            .map_err(|e| format!("reset write: {e:?}"))
        } else if pin == self.dc_name {
            match level {
                Level::High => self.dc.set_high(),
                Level::Low => self.dc.set_low(),
            }
            .map_err(|e| format!("dc write: {e:?}"))
        } else if pin == HAL_CS {
            // Managed by the SpiDevice per transaction.
            Ok(())
        } else {
            return Err(Error::PinUnknown(pin.to_string()));
        };
        result.map_err(Error::BusIo)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.spi
            .write(data)
            .map_err(|e| Error::BusIo(format!("spi write of {} bytes: {e:?}", data.len())))
    }

    fn cs(&self) -> &str {
        HAL_CS
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
