/// Data bytes that accompany the commands in [`Cmd`](super::cmd::Cmd).
pub struct Flag;

#[allow(dead_code)]
impl Flag {
    // Booster Soft Start (0x06) phase strengths, one byte per phase
    pub const BOOSTER_PHASE_DEFAULT: u8 = 0x17; // 07 0f 17 1f 27 2f 37

    // Panel Setting (0x00) flags
    pub const PANEL_LUT_FROM_OTP: u8 = 0x0F; // factory waveform table
    pub const PANEL_LUT_FROM_REGISTER: u8 = 0x3F;

    // VCOM and Data Interval Setting (0x50) flags
    pub const VCOM_BORDER_FLOATING: u8 = 0xF7;

    // Deep Sleep (0x07) check code, required by the controller
    pub const DEEP_SLEEP_CHECK_CODE: u8 = 0xA5;

    // Plane data: a set bit is "no ink" on both planes
    pub const PLANE_ALL_CLEAR: u8 = 0xFF;
}
