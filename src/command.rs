//! Builders for the fixed-layout command frames sent to the sensor.

use crate::constants::*;

/// An encoded command frame, ready to be written to the serial link.
pub type CommandFrame = [u8; COMMAND_FRAME_LEN];

/// Builds a command frame from a command code, a mode code and a parameter.
///
/// The frame layout is `AA B4 <cmd> <mode> <param> 00x10 FF FF <checksum> AB`,
/// with the checksum computed over the data bytes (positions 2..=16). The
/// caller is trusted to pass a valid command/mode/parameter combination;
/// no validation is performed here.
pub fn build(cmd: u8, mode: u8, param: u8) -> CommandFrame {
    let mut frame = [0u8; COMMAND_FRAME_LEN];
    frame[0] = HEAD;
    frame[1] = COMMAND_ID;
    frame[2] = cmd;
    frame[3] = mode;
    frame[4] = param;
    // Bytes 5..=14 stay zero. Bytes 15..=16 address all sensors.
    frame[15] = 0xFF;
    frame[16] = 0xFF;
    let checksum: u8 = frame[2..=16]
        .iter()
        .fold(0u8, |sum, &b| sum.wrapping_add(b));
    frame[17] = checksum;
    frame[18] = TAIL;
    frame
}

/// Builds the command that requests the latest measurement.
pub fn query() -> CommandFrame {
    build(CMD_QUERY, CMD_GET, 0x00)
}

/// Builds the command that switches the sensor to query reporting mode,
/// so it answers queries instead of streaming measurements continuously.
pub fn set_reporting_mode_query() -> CommandFrame {
    build(CMD_REPORTING_MODE, CMD_SET, 0x01)
}

/// Builds the command that wakes the sensor and resumes sampling.
pub fn wake() -> CommandFrame {
    build(CMD_SLEEP_WAKE, CMD_SET, 0x01)
}

/// Builds the command that puts the sensor to sleep and pauses sampling.
pub fn sleep() -> CommandFrame {
    build(CMD_SLEEP_WAKE, CMD_SET, 0x00)
}
