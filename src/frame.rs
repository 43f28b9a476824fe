//! Measurement frame scanning and decoding.
//!
//! The sensor shares its serial link with whatever noise the line picks up,
//! so a measurement frame can be preceded by garbage or a partial frame.
//! Scanning walks the stream one byte at a time until the two-byte frame
//! start appears, then decodes the fixed-size payload that follows.

use embedded_io_async::Read;
use log::{debug, error};

use crate::constants::{DATA_REPORT_ID, HEAD, MEASUREMENT_PAYLOAD_LEN, TAIL};
use crate::error::Error;

/// Integrity status of a decoded measurement frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketStatus {
    /// Checksum matched and the tail marker was present.
    Ok,
    /// Checksum or tail marker did not match; values are untrusted.
    Nok,
}

/// A decoded measurement.
///
/// Concentrations are in µg/m³. The raw payload bytes are kept so callers
/// can inspect the frame when `status` is [`PacketStatus::Nok`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// PM2.5 concentration in µg/m³.
    pub pm2_5: f32,
    /// PM10 concentration in µg/m³.
    pub pm10: f32,
    /// Result of the frame's own integrity check.
    pub status: PacketStatus,
    /// The payload bytes the reading was decoded from.
    pub raw: [u8; MEASUREMENT_PAYLOAD_LEN],
}

/// Outcome of a single bounded scan over the byte stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanOutcome {
    /// A frame start was located and its payload decoded. The reading's
    /// `status` says whether the integrity check passed.
    Found(Reading),
    /// A frame start was located but the payload could not be read in full.
    DecodeFailed,
    /// The scan budget ran out before a frame start appeared.
    NotFound,
}

/// Scans the byte stream for the next measurement frame and decodes it.
///
/// Reads one byte per iteration, for at most `budget` iterations. A frame
/// begins only when a `HEAD` byte is immediately followed by a
/// `DATA_REPORT_ID` byte; any other byte is discarded and scanning resumes
/// from the next byte. Bytes are consumed irreversibly, never rewound.
///
/// # Arguments
///
/// * `serial` - The byte source to scan.
/// * `budget` - Maximum number of scan iterations before giving up.
///
/// # Returns
///
/// * `Ok(ScanOutcome)` describing whether a frame was found within budget.
/// * `Err(Error::ReadFailure)` if the byte source itself fails.
pub async fn scan_frame<S: Read>(serial: &mut S, budget: usize) -> Result<ScanOutcome, Error> {
    for _ in 0..budget {
        let mut byte = [0u8; 1];
        let n = serial.read(&mut byte).await.map_err(|_| Error::ReadFailure)?;
        if n == 0 || byte[0] != HEAD {
            continue;
        }

        let n = serial.read(&mut byte).await.map_err(|_| Error::ReadFailure)?;
        if n == 0 || byte[0] != DATA_REPORT_ID {
            continue;
        }

        let mut payload = [0u8; MEASUREMENT_PAYLOAD_LEN];
        return match serial.read_exact(&mut payload).await {
            Ok(()) => Ok(ScanOutcome::Found(decode(&payload))),
            Err(e) => {
                error!("Frame start found but payload unreadable: {:?}", e);
                Ok(ScanOutcome::DecodeFailed)
            }
        };
    }

    debug!("No measurement frame found within {} scan iterations", budget);
    Ok(ScanOutcome::NotFound)
}

/// Decodes an 8-byte measurement payload.
///
/// Layout: PM2.5 low/high, PM10 low/high, device id 1/2, checksum, tail.
/// Concentrations arrive as little-endian tenths of a µg/m³. The status is
/// [`PacketStatus::Ok`] only if the checksum equals the mod-256 sum of the
/// six data bytes and the tail byte equals `TAIL`.
pub fn decode(payload: &[u8; MEASUREMENT_PAYLOAD_LEN]) -> Reading {
    let pm2_5 = (u16::from(payload[0]) | (u16::from(payload[1]) << 8)) as f32 / 10.0;
    let pm10 = (u16::from(payload[2]) | (u16::from(payload[3]) << 8)) as f32 / 10.0;

    let checksum: u8 = payload[..6].iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
    let checksum_ok = checksum == payload[6];
    let tail_ok = payload[7] == TAIL;
    if !checksum_ok {
        error!(
            "Bad checksum: calculated {:02X}, received {:02X}. Payload: {:02X?}",
            checksum, payload[6], payload
        );
    }

    let status = if checksum_ok && tail_ok {
        PacketStatus::Ok
    } else {
        PacketStatus::Nok
    };

    debug!("Processed frame - PM2.5: {}, PM10: {}", pm2_5, pm10);
    Reading {
        pm2_5,
        pm10,
        status,
        raw: *payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // PM2.5 = 120.0 (raw 1200), PM10 = 45.0 (raw 450), device id 0x0201.
    fn valid_payload() -> [u8; MEASUREMENT_PAYLOAD_LEN] {
        payload(1200, 450, [0x01, 0x02])
    }

    fn payload(pm2_5_raw: u16, pm10_raw: u16, id: [u8; 2]) -> [u8; MEASUREMENT_PAYLOAD_LEN] {
        let mut p = [0u8; MEASUREMENT_PAYLOAD_LEN];
        p[..2].copy_from_slice(&pm2_5_raw.to_le_bytes());
        p[2..4].copy_from_slice(&pm10_raw.to_le_bytes());
        p[4] = id[0];
        p[5] = id[1];
        let checksum: u8 = p[..6].iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
        p[6] = checksum;
        p[7] = TAIL;
        p
    }

    #[test]
    fn decode_scales_concentrations() {
        let reading = decode(&valid_payload());
        assert_eq!(reading.pm2_5, 120.0);
        assert_eq!(reading.pm10, 45.0);
        assert_eq!(reading.status, PacketStatus::Ok);
        assert_eq!(reading.raw, valid_payload());
    }

    #[test]
    fn decode_rejects_bad_checksum() {
        let mut p = valid_payload();
        p[6] = p[6].wrapping_add(1);
        let reading = decode(&p);
        assert_eq!(reading.status, PacketStatus::Nok);
        // Values are still parsed so the caller can inspect them.
        assert_eq!(reading.pm2_5, 120.0);
    }

    #[test]
    fn decode_rejects_bad_tail() {
        let mut p = valid_payload();
        p[7] = 0x00;
        assert_eq!(decode(&p).status, PacketStatus::Nok);
    }

    #[tokio::test]
    async fn scan_finds_clean_frame() {
        let mut stream = vec![HEAD, DATA_REPORT_ID];
        stream.extend_from_slice(&valid_payload());

        let mut source: &[u8] = &stream;
        let outcome = scan_frame(&mut source, 512).await.unwrap();
        assert_eq!(outcome, ScanOutcome::Found(decode(&valid_payload())));
    }

    #[tokio::test]
    async fn scan_resynchronizes_past_noise() {
        // 50 noise bytes, none of which can start a frame.
        let mut stream: Vec<u8> = (1u8..=50).collect();
        stream.push(HEAD);
        stream.push(DATA_REPORT_ID);
        stream.extend_from_slice(&valid_payload());

        let mut source: &[u8] = &stream;
        let outcome = scan_frame(&mut source, 60).await.unwrap();
        assert_eq!(outcome, ScanOutcome::Found(decode(&valid_payload())));
    }

    #[tokio::test]
    async fn scan_slips_one_byte_on_false_start() {
        // HEAD followed by a non-frame byte is discarded byte by byte; the
        // genuine frame start after it is still found.
        let mut stream = vec![HEAD, 0x00, HEAD, DATA_REPORT_ID];
        stream.extend_from_slice(&valid_payload());

        let mut source: &[u8] = &stream;
        let outcome = scan_frame(&mut source, 512).await.unwrap();
        assert_eq!(outcome, ScanOutcome::Found(decode(&valid_payload())));
    }

    #[tokio::test]
    async fn scan_gives_up_after_budget() {
        let stream = [0x55u8; 64];
        let mut source: &[u8] = &stream;
        let outcome = scan_frame(&mut source, 512).await.unwrap();
        assert_eq!(outcome, ScanOutcome::NotFound);
    }

    #[tokio::test]
    async fn scan_budget_bounds_noise_tolerance() {
        // The frame start sits beyond the budget, so it is never reached.
        let mut stream = vec![0x55u8; 32];
        stream.push(HEAD);
        stream.push(DATA_REPORT_ID);
        stream.extend_from_slice(&valid_payload());

        let mut source: &[u8] = &stream;
        let outcome = scan_frame(&mut source, 16).await.unwrap();
        assert_eq!(outcome, ScanOutcome::NotFound);
    }

    #[tokio::test]
    async fn scan_reports_truncated_payload() {
        let stream = [HEAD, DATA_REPORT_ID, 0xB0, 0x04, 0xC2];
        let mut source: &[u8] = &stream;
        let outcome = scan_frame(&mut source, 512).await.unwrap();
        assert_eq!(outcome, ScanOutcome::DecodeFailed);
    }
}
