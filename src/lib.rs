//! Async driver for the SDS011 particulate matter sensor.
//!
//! The sensor streams fixed-size binary frames over a UART link. This crate
//! encodes the outgoing command frames, scans the incoming byte stream for
//! measurement frames while tolerating line noise and partial frames, and
//! keeps the most recent decoded reading.
//!
//! The driver works in query mode: it asks the sensor for its latest
//! measurement instead of relying on the sensor's continuous reporting.

#![cfg_attr(not(test), no_std)]

use embedded_io_async::{Read, Write};
use log::debug;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

pub mod command;

mod frame;
pub use frame::*;

use command::CommandFrame;

/// Outcome of a single [`Sds011::read`] round-trip.
///
/// `Ok` means a measurement frame was located and parsed; whether its
/// integrity check passed is reported separately by [`PacketStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// A frame was located within the scan budget and decoded.
    Ok,
    /// No frame was located, or its payload could not be read in full.
    Nok,
}

/// Represents an SDS011 air quality sensor driven in query mode.
///
/// The driver owns its serial interface for its entire lifetime, issues
/// query commands over it and keeps the most recent decoded [`Reading`].
/// A failed read leaves the previous reading in place.
///
/// # Type Parameters
///
/// * `Serial`: The type of the serial interface used to communicate with
///   the sensor. It must implement `embedded_io_async::Read` and
///   `embedded_io_async::Write`.
pub struct Sds011<Serial> {
    serial: Serial,
    config: Config,
    reading: Option<Reading>,
}

impl<S> Sds011<S>
where
    S: Read + Write,
{
    /// Creates a new `Sds011` sensor instance.
    ///
    /// # Arguments
    ///
    /// * `serial`: The serial interface for communication with the sensor.
    /// * `config`: The configuration for the driver.
    ///
    /// # Returns
    ///
    /// A new `Sds011` instance. Call [`Sds011::init`] once before reading.
    pub fn new(serial: S, config: Config) -> Self {
        Self {
            serial,
            config,
            reading: None,
        }
    }

    /// Initializes the sensor for query-driven reads.
    ///
    /// Flushes the serial link and switches the sensor to query reporting
    /// mode, so later [`Sds011::read`] calls receive a response instead of
    /// the sensor's default continuous measurement stream.
    pub async fn init(&mut self) -> Result<(), Error> {
        self.serial.flush().await.map_err(|_| Error::WriteFailure)?;
        self.write_command(&command::set_reporting_mode_query())
            .await?;
        debug!("SDS011 init sequence complete.");
        Ok(())
    }

    /// Queries the sensor and scans for its measurement frame.
    ///
    /// Writes a query command, then scans the incoming byte stream within
    /// the configured budget. If a frame is located and parsed, the cached
    /// reading is replaced and `ReadStatus::Ok` is returned, even when the
    /// frame fails its own integrity check, which is reported through
    /// [`Sds011::packet_status`] instead. `ReadStatus::Nok` means no frame
    /// was located (or its payload was unreadable) and the cached reading
    /// is unchanged.
    ///
    /// # Returns
    ///
    /// * `Ok(ReadStatus)` describing whether a frame was obtained.
    /// * `Err(Error)` if the serial link itself fails.
    pub async fn read(&mut self) -> Result<ReadStatus, Error> {
        self.write_command(&command::query()).await?;

        match scan_frame(&mut self.serial, self.config.scan_budget).await? {
            ScanOutcome::Found(reading) => {
                self.reading = Some(reading);
                Ok(ReadStatus::Ok)
            }
            ScanOutcome::DecodeFailed | ScanOutcome::NotFound => Ok(ReadStatus::Nok),
        }
    }

    /// Wakes the sensor and resumes sampling. Fire-and-forget, no reply is
    /// awaited.
    pub async fn wake(&mut self) -> Result<(), Error> {
        self.write_command(&command::wake()).await
    }

    /// Puts the sensor to sleep, pausing sampling. Fire-and-forget, no
    /// reply is awaited.
    pub async fn sleep(&mut self) -> Result<(), Error> {
        self.write_command(&command::sleep()).await
    }

    /// The last decoded reading, if any read has located a frame yet.
    pub fn last_reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }

    /// PM2.5 concentration in µg/m³ from the last decoded reading.
    pub fn pm2_5(&self) -> Option<f32> {
        self.reading.map(|r| r.pm2_5)
    }

    /// PM10 concentration in µg/m³ from the last decoded reading.
    pub fn pm10(&self) -> Option<f32> {
        self.reading.map(|r| r.pm10)
    }

    /// Integrity status of the last decoded reading.
    pub fn packet_status(&self) -> Option<PacketStatus> {
        self.reading.map(|r| r.status)
    }

    /// Raw payload bytes of the last decoded reading.
    pub fn packet(&self) -> Option<&[u8; MEASUREMENT_PAYLOAD_LEN]> {
        self.reading.as_ref().map(|r| &r.raw)
    }

    // Writes an encoded command frame to the serial port.
    async fn write_command(&mut self, command: &CommandFrame) -> Result<(), Error> {
        debug!("Executing command: {:02X?}", command);
        self.serial.flush().await.map_err(|_| Error::WriteFailure)?;
        self.serial
            .write_all(command)
            .await
            .map_err(|_| Error::WriteFailure)?;
        self.serial.flush().await.map_err(|_| Error::WriteFailure)?;
        Ok(())
    }
}
