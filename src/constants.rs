// COMMAND_ID is the byte that identifies a command frame sent to the sensor.
pub const COMMAND_ID: u8 = 0xB4;

// DATA_REPORT_ID is the byte that identifies a measurement frame received
// from the sensor.
pub const DATA_REPORT_ID: u8 = 0xC0;

// HEAD is the byte that marks the beginning of any frame (command or data).
pub const HEAD: u8 = 0xAA;

// TAIL is the byte that marks the end of any frame (command or data).
pub const TAIL: u8 = 0xAB;

// Command codes understood by the sensor.
pub const CMD_GET: u8 = 0x00;
pub const CMD_SET: u8 = 0x01;
pub const CMD_REPORTING_MODE: u8 = 0x02;
pub const CMD_QUERY: u8 = 0x04;
pub const CMD_SLEEP_WAKE: u8 = 0x06;
pub const CMD_DUTY_CYCLE: u8 = 0x08;

// A command frame is 19 bytes: head, command id, command, mode, parameter,
// ten zero bytes, two 0xFF broadcast id bytes, checksum, tail.
pub const COMMAND_FRAME_LEN: usize = 19;

// A measurement frame carries 8 payload bytes after the HEAD/DATA_REPORT_ID
// prefix: PM2.5 lo/hi, PM10 lo/hi, device id 1/2, checksum, tail.
pub const MEASUREMENT_PAYLOAD_LEN: usize = 8;

// Default number of scan iterations spent searching for a frame start
// before giving up on a read.
pub const DEFAULT_SCAN_BUDGET: usize = 512;
