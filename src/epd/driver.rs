//! Panel driver: sequences the reset, init, transmit, refresh, and sleep
//! phases over the bus port, and tracks the panel state machine.

use std::borrow::Cow;
use std::time::Duration;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::display::{Content, Display, Orientation};
use crate::epd::bus::{Bus, Level, PinMode};
use crate::epd::cmd::Cmd;
use crate::epd::flag::Flag;
use crate::epd::interface::PanelInterface;
use crate::epd::{EPD42_HEIGHT, EPD42_WIDTH};
use crate::error::Error;
use crate::render::{pack, RenderEngine, TEMPLATE_AUTO};

/// Lifecycle state of the panel.
///
/// `Faulted` is absorbing: once a bus error interrupts a sequence the panel
/// contents are indeterminate and the driver refuses further work until it
/// is reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Uninitialized,
    Ready,
    Busy,
    Sleeping,
    Faulted,
}

/// Wiring and timing configuration for [`Epd42`].
#[derive(Debug, Clone)]
pub struct Epd42Config {
    /// SPI bus address, platform specific. Empty selects the default bus.
    pub spi_address: String,
    pub reset_pin: String,
    pub dc_pin: String,
    pub busy_pin: String,
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
    /// Interval between BUSY reads while waiting for the panel.
    pub poll_interval: Duration,
    /// Upper bound on a single busy wait; `None` waits forever.
    pub busy_timeout: Option<Duration>,
}

impl Default for Epd42Config {
    fn default() -> Self {
        Epd42Config {
            spi_address: String::new(),
            reset_pin: "RST".to_string(),
            dc_pin: "DC".to_string(),
            busy_pin: "BUSY".to_string(),
            width: EPD42_WIDTH,
            height: EPD42_HEIGHT,
            orientation: Orientation::Landscape,
            poll_interval: Duration::from_millis(200),
            busy_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Driver for the 4.2" tri-color panel.
///
/// Owns the bus exclusively and renders content through an attached
/// [`RenderEngine`]. A show runs synchronously through
/// prepare → transmit → refresh → sleep and leaves the panel in deep sleep;
/// the next show or clear re-runs prepare to wake it.
#[derive(Debug)]
pub struct Epd42<B> {
    interface: PanelInterface<B>,
    engine: Option<RenderEngine>,
    width: u32,
    height: u32,
    orientation: Orientation,
    state: PanelState,
}

impl<B: Bus> Epd42<B> {
    /// Opens the bus, configures the control pins, and returns a ready
    /// driver.
    ///
    /// Rendering content through [`Display::show`] additionally needs a
    /// [`RenderEngine`], attached with [`Epd42::with_engine`];
    /// [`Epd42::show_canvas`] and [`Display::clear`] work without one.
    pub fn open(bus: B, config: Epd42Config) -> Result<Self, Error> {
        if config.width == 0 || config.height == 0 || (config.width * config.height) % 8 != 0 {
            return Err(Error::InvalidDimensions {
                width: config.width,
                height: config.height,
            });
        }

        let interface = PanelInterface::new(
            bus,
            config.reset_pin.clone(),
            config.dc_pin.clone(),
            config.busy_pin.clone(),
            config.poll_interval,
            config.busy_timeout,
        );
        let mut driver = Epd42 {
            interface,
            engine: None,
            width: config.width,
            height: config.height,
            orientation: config.orientation,
            state: PanelState::Uninitialized,
        };

        let bus = driver.interface.bus_mut();
        bus.init(
            &config.spi_address,
            &[&config.reset_pin, &config.dc_pin, &config.busy_pin],
        )?;
        bus.configure(&config.reset_pin, PinMode::Output(Level::Low))?;
        bus.configure(&config.dc_pin, PinMode::Output(Level::Low))?;
        bus.configure(&config.busy_pin, PinMode::InputPullDown)?;

        driver.state = PanelState::Ready;
        Ok(driver)
    }

    /// Attaches the render engine used by [`Display::show`].
    pub fn with_engine(mut self, engine: RenderEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Shared access to the underlying bus, mainly for inspection in tests.
    pub fn bus(&self) -> &B {
        self.interface.bus()
    }

    /// Pushes an already-rendered canvas to the panel.
    ///
    /// The canvas is rotated 90° when its orientation disagrees with the
    /// panel's and Lanczos-resized when the dimensions differ, then packed
    /// into the two bit planes and transmitted.
    pub fn show_canvas(&mut self, canvas: &RgbaImage) -> Result<(), Error> {
        self.guard()?;
        let result = self.show_sequence(canvas);
        if result.is_err() {
            self.state = PanelState::Faulted;
        }
        result
    }

    /// Releases the bus. The panel stays in whatever state it was left in.
    pub fn close(mut self) -> Result<(), Error> {
        self.interface.close()
    }

    fn guard(&self) -> Result<(), Error> {
        match self.state {
            PanelState::Faulted => Err(Error::Faulted),
            PanelState::Uninitialized => {
                Err(Error::BusInit("driver is not open".to_string()))
            }
            _ => Ok(()),
        }
    }

    fn show_sequence(&mut self, canvas: &RgbaImage) -> Result<(), Error> {
        self.prepare()?;
        self.transmit(canvas)?;
        self.sleep()
    }

    /// Reset and power-on sequence; ends with the panel awake and
    /// configured to use its factory waveform table.
    fn prepare(&mut self) -> Result<(), Error> {
        log::debug!("epd42 prepare");
        self.interface.reset()?;
        self.interface
            .cmd_with_data(Cmd::BOOSTER_SOFT_START, &[Flag::BOOSTER_PHASE_DEFAULT; 3])?;
        self.interface.cmd(Cmd::POWER_ON)?;
        self.interface.wait_until_idle()?;
        self.interface
            .cmd_with_data(Cmd::PANEL_SETTING, &[Flag::PANEL_LUT_FROM_OTP])?;
        self.state = PanelState::Ready;
        Ok(())
    }

    fn transmit(&mut self, canvas: &RgbaImage) -> Result<(), Error> {
        log::debug!("epd42 transmit");
        let frame = self.normalize(canvas);
        let planes = pack(&frame)?;
        self.interface.cmd(Cmd::DATA_START_TRANSMISSION_1)?;
        self.interface.data(&planes.black)?;
        self.interface.cmd(Cmd::DATA_START_TRANSMISSION_2)?;
        self.interface.data(&planes.red)?;
        self.refresh()
    }

    fn refresh(&mut self) -> Result<(), Error> {
        self.interface.cmd(Cmd::DISPLAY_REFRESH)?;
        self.state = PanelState::Busy;
        self.interface.wait_until_idle()?;
        self.state = PanelState::Ready;
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), Error> {
        log::debug!("epd42 sleep");
        self.interface
            .cmd_with_data(Cmd::VCOM_AND_DATA_INTERVAL_SETTING, &[Flag::VCOM_BORDER_FLOATING])?;
        self.interface.cmd(Cmd::POWER_OFF)?;
        self.interface.wait_until_idle()?;
        self.interface
            .cmd_with_data(Cmd::DEEP_SLEEP, &[Flag::DEEP_SLEEP_CHECK_CODE])?;
        self.state = PanelState::Sleeping;
        Ok(())
    }

    fn clear_sequence(&mut self) -> Result<(), Error> {
        log::debug!("epd42 clear");
        if self.state == PanelState::Sleeping {
            self.prepare()?;
        }
        let blank = vec![Flag::PLANE_ALL_CLEAR; (self.width * self.height / 8) as usize];
        self.interface.cmd(Cmd::DATA_START_TRANSMISSION_1)?;
        self.interface.data(&blank)?;
        self.interface.cmd(Cmd::DATA_START_TRANSMISSION_2)?;
        self.interface.data(&blank)?;
        self.refresh()
    }

    fn normalize<'a>(&self, canvas: &'a RgbaImage) -> Cow<'a, RgbaImage> {
        let mut frame = Cow::Borrowed(canvas);
        let panel_horizontal = self.width >= self.height;
        let image_horizontal = frame.width() >= frame.height();
        if panel_horizontal != image_horizontal {
            log::debug!("rotating canvas to match panel orientation");
            frame = Cow::Owned(imageops::rotate90(&*frame));
        }
        if frame.width() != self.width || frame.height() != self.height {
            log::debug!(
                "resizing canvas {}x{} to panel {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            );
            frame = Cow::Owned(imageops::resize(
                &*frame,
                self.width,
                self.height,
                FilterType::Lanczos3,
            ));
        }
        frame
    }
}

impl<B: Bus> Display for Epd42<B> {
    fn show(&mut self, content: Content) -> Result<(), Error> {
        self.guard()?;
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| Error::FontLoad("no render engine attached".to_string()))?;
        let (w, h) = self.orientation.frame_size(self.width, self.height);
        let canvas = engine.render(content, w, h, TEMPLATE_AUTO)?;
        self.show_canvas(&canvas)
    }

    fn clear(&mut self) -> Result<(), Error> {
        self.guard()?;
        let result = self.clear_sequence();
        if result.is_err() {
            self.state = PanelState::Faulted;
        }
        result
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
