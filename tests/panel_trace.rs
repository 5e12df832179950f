//! Panel driver scenarios against a scripted, recording bus.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use image::{imageops, Rgba, RgbaImage};

use epdview::render::pack;
use epdview::{Bus, Display, Epd42, Epd42Config, Error, Level, PanelState, PinMode};

/// One observable bus event, in order.
#[derive(Debug, Clone, PartialEq)]
enum Op {
    Command(u8),
    Data(Vec<u8>),
    BusyRead,
}

/// Records framing-visible traffic and plays back scripted BUSY reads.
#[derive(Debug)]
struct MockBus {
    dc_high: bool,
    ops: Vec<Op>,
    reset_edges: Vec<(Level, Instant)>,
    busy_script: VecDeque<Result<bool, ()>>,
    fail_write_at: Option<usize>,
    writes: usize,
}

impl MockBus {
    fn new() -> Self {
        MockBus {
            dc_high: false,
            ops: Vec::new(),
            reset_edges: Vec::new(),
            busy_script: VecDeque::new(),
            fail_write_at: None,
            writes: 0,
        }
    }

    fn commands(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Command(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    fn data_blocks(&self) -> Vec<&Vec<u8>> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Data(d) => Some(d),
                _ => None,
            })
            .collect()
    }
}

impl Bus for MockBus {
    fn init(&mut self, _spi_address: &str, pins: &[&str]) -> Result<(), Error> {
        assert_eq!(pins.len(), 3);
        Ok(())
    }

    fn configure(&mut self, _pin: &str, _mode: PinMode) -> Result<(), Error> {
        Ok(())
    }

    fn digital_read(&mut self, pin: &str) -> Result<bool, Error> {
        assert_eq!(pin, "BUSY");
        self.ops.push(Op::BusyRead);
        match self.busy_script.pop_front() {
            Some(Ok(level)) => Ok(level),
            Some(Err(())) => Err(Error::BusIo("scripted read error".to_string())),
            None => Ok(false),
        }
    }

    fn digital_write(&mut self, pin: &str, level: Level) -> Result<(), Error> {
        match pin {
            "RST" => self.reset_edges.push((level, Instant::now())),
            "DC" => self.dc_high = level == Level::High,
            "CS" | "BUSY" => {}
            other => return Err(Error::PinUnknown(other.to_string())),
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.writes += 1;
        if self.fail_write_at == Some(self.writes) {
            return Err(Error::BusIo("scripted write error".to_string()));
        }
        if self.dc_high {
            self.ops.push(Op::Data(data.to_vec()));
        } else {
            assert_eq!(data.len(), 1, "commands are single bytes");
            self.ops.push(Op::Command(data[0]));
        }
        Ok(())
    }

    fn cs(&self) -> &str {
        "CS"
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

fn fast_config() -> Epd42Config {
    Epd42Config {
        poll_interval: Duration::from_millis(1),
        busy_timeout: Some(Duration::from_secs(1)),
        ..Epd42Config::default()
    }
}

fn white_canvas(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
}

#[test]
fn show_emits_the_exact_command_sequence() {
    let mut driver = Epd42::open(MockBus::new(), fast_config()).unwrap();
    driver.show_canvas(&white_canvas(400, 300)).unwrap();

    let plane = vec![0xFF; 400 * 300 / 8];
    let expected = vec![
        Op::Command(0x06),
        Op::Data(vec![0x17, 0x17, 0x17]),
        Op::Command(0x04),
        Op::BusyRead,
        Op::Command(0x00),
        Op::Data(vec![0x0F]),
        Op::Command(0x10),
        Op::Data(plane.clone()),
        Op::Command(0x13),
        Op::Data(plane),
        Op::Command(0x12),
        Op::BusyRead,
        Op::Command(0x50),
        Op::Data(vec![0xF7]),
        Op::Command(0x02),
        Op::BusyRead,
        Op::Command(0x07),
        Op::Data(vec![0xA5]),
    ];
    assert_eq!(driver.bus().ops, expected);
    assert_eq!(driver.state(), PanelState::Sleeping);
}

#[test]
fn reset_makes_three_timed_edges() {
    let mut driver = Epd42::open(MockBus::new(), fast_config()).unwrap();
    driver.show_canvas(&white_canvas(400, 300)).unwrap();

    let edges = &driver.bus().reset_edges;
    assert_eq!(edges.len(), 3);
    assert_eq!(edges[0].0, Level::High);
    assert_eq!(edges[1].0, Level::Low);
    assert_eq!(edges[2].0, Level::High);
    assert!(edges[1].1 - edges[0].1 >= Duration::from_millis(200));
    assert!(edges[2].1 - edges[1].1 >= Duration::from_millis(200));
}

#[test]
fn clear_on_a_fresh_driver_skips_prepare() {
    let mut driver = Epd42::open(MockBus::new(), fast_config()).unwrap();
    driver.clear().unwrap();

    let plane = vec![0xFF; 400 * 300 / 8];
    let expected = vec![
        Op::Command(0x10),
        Op::Data(plane.clone()),
        Op::Command(0x13),
        Op::Data(plane),
        Op::Command(0x12),
        Op::BusyRead,
    ];
    assert_eq!(driver.bus().ops, expected);
    assert_eq!(driver.state(), PanelState::Ready);
}

#[test]
fn clear_after_sleep_reenters_prepare() {
    let mut driver = Epd42::open(MockBus::new(), fast_config()).unwrap();
    driver.show_canvas(&white_canvas(400, 300)).unwrap();
    assert_eq!(driver.state(), PanelState::Sleeping);

    driver.clear().unwrap();
    let commands = driver.bus().commands();
    // The clear traffic starts after the show's final 0x07.
    let after_sleep = &commands[commands.iter().position(|&c| c == 0x07).unwrap() + 1..];
    assert_eq!(after_sleep, [0x06, 0x04, 0x00, 0x10, 0x13, 0x12]);
    assert_eq!(driver.state(), PanelState::Ready);
}

#[test]
fn bus_error_faults_the_driver_and_absorbs() {
    let mut bus = MockBus::new();
    bus.fail_write_at = Some(7); // the black-plane write inside transmit
    let mut driver = Epd42::open(bus, fast_config()).unwrap();

    let err = driver.show_canvas(&white_canvas(400, 300)).unwrap_err();
    assert!(matches!(err, Error::BusIo(_)));
    assert_eq!(driver.state(), PanelState::Faulted);

    let writes_before = driver.bus().writes;
    let err = driver.show_canvas(&white_canvas(400, 300)).unwrap_err();
    assert!(matches!(err, Error::Faulted));
    assert_eq!(driver.bus().writes, writes_before, "faulted driver touched the bus");

    let err = driver.clear().unwrap_err();
    assert!(matches!(err, Error::Faulted));
}

#[test]
fn busy_read_errors_do_not_stop_the_poll() {
    let mut bus = MockBus::new();
    bus.busy_script = VecDeque::from([Err(()), Ok(true), Ok(false)]);
    let mut driver = Epd42::open(bus, fast_config()).unwrap();
    driver.show_canvas(&white_canvas(400, 300)).unwrap();
    assert_eq!(driver.state(), PanelState::Sleeping);
}

#[test]
fn stuck_busy_times_out_into_faulted() {
    let mut bus = MockBus::new();
    bus.busy_script = VecDeque::from(vec![Ok(true); 10_000]);
    let config = Epd42Config {
        poll_interval: Duration::from_millis(1),
        busy_timeout: Some(Duration::from_millis(10)),
        ..Epd42Config::default()
    };
    let mut driver = Epd42::open(bus, config).unwrap();
    let err = driver.show_canvas(&white_canvas(400, 300)).unwrap_err();
    assert!(matches!(err, Error::PanelTimeout));
    assert_eq!(driver.state(), PanelState::Faulted);
}

#[test]
fn portrait_canvas_is_rotated_for_a_landscape_panel() {
    let mut canvas = white_canvas(300, 400);
    canvas.put_pixel(10, 50, Rgba([0, 0, 0, 255]));
    canvas.put_pixel(299, 399, Rgba([0, 0, 0, 255]));

    let mut driver = Epd42::open(MockBus::new(), fast_config()).unwrap();
    driver.show_canvas(&canvas).unwrap();

    let rotated = imageops::rotate90(&canvas);
    assert_eq!(rotated.dimensions(), (400, 300));
    let expected = pack(&rotated).unwrap();

    let blocks = driver.bus().data_blocks();
    // Blocks: booster, panel setting, black plane, red plane, vcom, sleep code.
    assert_eq!(blocks[2], &expected.black);
    assert_eq!(blocks[3], &expected.red);
}

#[test]
fn red_pixels_reach_the_red_plane_as_ink() {
    let mut canvas = white_canvas(400, 300);
    canvas.put_pixel(10, 20, Rgba([255, 0, 0, 255]));

    let mut driver = Epd42::open(MockBus::new(), fast_config()).unwrap();
    driver.show_canvas(&canvas).unwrap();

    let blocks = driver.bus().data_blocks();
    let black = blocks[2];
    let red = blocks[3];
    let index = 20 * 400 + 10;
    let bit = |plane: &[u8]| (plane[index / 8] >> (7 - index % 8)) & 1;
    assert_eq!(bit(red), 0, "red pixel must be ink on the red plane");
    assert_eq!(bit(black), 0, "red pixel is dark by the luma test");
}

#[test]
fn mismatched_dimensions_are_rejected_at_open() {
    let config = Epd42Config {
        width: 10,
        height: 3,
        ..fast_config()
    };
    let err = Epd42::open(MockBus::new(), config).unwrap_err();
    assert!(matches!(err, Error::InvalidDimensions { .. }));
}
