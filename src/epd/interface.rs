//! Wire framing for the panel: command/data transfers, hardware reset, and
//! the busy-pin handshake.

use std::thread;
use std::time::{Duration, Instant};

use crate::epd::bus::{Bus, Level};
use crate::error::Error;

/// Reset edge spacing mandated by the panel.
const RESET_DELAY: Duration = Duration::from_millis(200);

/// Framing layer over a [`Bus`].
///
/// Commands are single bytes sent with DC low; data blocks are sent with DC
/// high as one bulk write. CS is dropped around every transfer and DC never
/// changes inside a block.
#[derive(Debug)]
pub struct PanelInterface<B> {
    bus: B,
    reset: String,
    dc: String,
    busy: String,
    cs: String,
    poll_interval: Duration,
    busy_timeout: Option<Duration>,
}

impl<B: Bus> PanelInterface<B> {
    pub fn new(
        bus: B,
        reset: String,
        dc: String,
        busy: String,
        poll_interval: Duration,
        busy_timeout: Option<Duration>,
    ) -> Self {
        let cs = bus.cs().to_string();
        PanelInterface {
            bus,
            reset,
            dc,
            busy,
            cs,
            poll_interval,
            busy_timeout,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Sends one command byte: CS low, DC low, byte, CS high.
    pub(crate) fn cmd(&mut self, command: u8) -> Result<(), Error> {
        log::trace!("cmd 0x{command:02X}");
        self.bus.digital_write(&self.cs, Level::Low)?;
        self.bus.digital_write(&self.dc, Level::Low)?;
        self.bus.write(&[command])?;
        self.bus.digital_write(&self.cs, Level::High)
    }

    /// Sends a data block: CS low, DC high, bytes, CS high.
    pub(crate) fn data(&mut self, data: &[u8]) -> Result<(), Error> {
        log::trace!("data {} bytes", data.len());
        self.bus.digital_write(&self.cs, Level::Low)?;
        self.bus.digital_write(&self.dc, Level::High)?;
        self.bus.write(data)?;
        self.bus.digital_write(&self.cs, Level::High)
    }

    pub(crate) fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), Error> {
        self.cmd(command)?;
        self.data(data)
    }

    /// Hardware reset: high, low, high with 200 ms between every edge.
    pub(crate) fn reset(&mut self) -> Result<(), Error> {
        log::debug!("panel reset");
        self.bus.digital_write(&self.reset, Level::High)?;
        thread::sleep(RESET_DELAY);
        self.bus.digital_write(&self.reset, Level::Low)?;
        thread::sleep(RESET_DELAY);
        self.bus.digital_write(&self.reset, Level::High)?;
        thread::sleep(RESET_DELAY);
        Ok(())
    }

    /// Blocks until the BUSY input reads low.
    ///
    /// Polls at the configured interval. Read errors are logged and polling
    /// continues: the bus occasionally returns transient errors while the
    /// panel is refreshing. The configured timeout bounds the total wait.
    pub(crate) fn wait_until_idle(&mut self) -> Result<(), Error> {
        log::debug!("waiting for panel idle");
        let start = Instant::now();
        loop {
            match self.bus.digital_read(&self.busy) {
                Ok(false) => return Ok(()),
                Ok(true) => {}
                Err(e) => log::warn!("busy poll read failed, still polling: {e}"),
            }
            if let Some(bound) = self.busy_timeout {
                if start.elapsed() >= bound {
                    log::error!("panel still busy after {bound:?}");
                    return Err(Error::PanelTimeout);
                }
            }
            thread::sleep(self.poll_interval);
        }
    }

    pub(crate) fn close(&mut self) -> Result<(), Error> {
        self.bus.close()
    }
}
