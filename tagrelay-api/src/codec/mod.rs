//! Decoder for RuuviTag BLE advertisements.
//!
//! Supported manufacturer data formats:
//! - 3 (RAWv1): humidity, temperature, pressure, acceleration, battery
//! - 5 (RAWv2): as above plus tx power, movement counter, sequence and MAC

mod error;

pub use error::*;

use crate::models::Measurement;

/// Bluetooth SIG company identifier of Ruuvi Innovations
pub const RUUVI_MANUFACTURER_ID: u16 = 0x0499;

const AD_TYPE_MANUFACTURER_DATA: u8 = 0xFF;

const RAW_V1_LENGTH: usize = 14;
const RAW_V2_LENGTH: usize = 24;

/// Decodes a complete advertisement made of length-type-value AD structures
pub fn decode_advertisement(data: &[u8]) -> Result<Measurement> {
    let mut last_error = DecodeError::MissingManufacturerData;
    let mut offset = 0;

    while offset < data.len() {
        let length = data[offset] as usize;
        if length == 0 {
            break;
        }

        let end = offset + 1 + length;
        if end > data.len() {
            return Err(DecodeError::Malformed(format!(
                "AD structure at offset {} overruns {} bytes",
                offset,
                data.len()
            )));
        }

        if data[offset + 1] == AD_TYPE_MANUFACTURER_DATA {
            match decode_manufacturer_data(&data[offset + 2..end]) {
                Ok(measurement) => return Ok(measurement),
                Err(e) => last_error = e,
            }
        }

        offset = end;
    }

    Err(last_error)
}

/// Decodes manufacturer specific data starting with the little endian company id
pub fn decode_manufacturer_data(data: &[u8]) -> Result<Measurement> {
    if data.len() < 3 {
        return Err(DecodeError::TooShort {
            expected: 3,
            actual: data.len(),
        });
    }

    let manufacturer = u16::from_le_bytes([data[0], data[1]]);
    if manufacturer != RUUVI_MANUFACTURER_ID {
        return Err(DecodeError::UnknownManufacturer(manufacturer));
    }

    decode_payload(&data[2..])
}

/// Decodes a payload starting at its data format byte
pub fn decode_payload(payload: &[u8]) -> Result<Measurement> {
    match payload.first() {
        Some(3) => decode_raw_v1(payload),
        Some(5) => decode_raw_v2(payload),
        Some(format) => Err(DecodeError::UnsupportedFormat(*format)),
        None => Err(DecodeError::TooShort {
            expected: 1,
            actual: 0,
        }),
    }
}

fn decode_raw_v1(payload: &[u8]) -> Result<Measurement> {
    ensure_length(payload, RAW_V1_LENGTH)?;

    // Sign and magnitude integer part, unsigned hundredths
    let integer = (payload[2] & 0x7F) as i32;
    let magnitude = (integer * 100 + payload[3] as i32) as f64 / 100.0;
    let temperature = if payload[2] & 0x80 != 0 { -magnitude } else { magnitude };

    Ok(Measurement {
        device_id: String::new(),
        format_version: 3,
        temperature,
        humidity: payload[1] as f64 / 2.0,
        pressure: u16_at(payload, 4) as u32 + 50_000,
        acceleration_x: milli_g(i16_at(payload, 6)),
        acceleration_y: milli_g(i16_at(payload, 8)),
        acceleration_z: milli_g(i16_at(payload, 10)),
        battery_millivolts: u16_at(payload, 12),
        tx_power: None,
        movement_counter: None,
        sequence: None,
    })
}

fn decode_raw_v2(payload: &[u8]) -> Result<Measurement> {
    ensure_length(payload, RAW_V2_LENGTH)?;

    let temperature = i16_at(payload, 1);
    let humidity = u16_at(payload, 3);
    let pressure = u16_at(payload, 5);
    let acceleration = [i16_at(payload, 7), i16_at(payload, 9), i16_at(payload, 11)];
    // 11 bits of battery above 1600 mV, 5 bits of tx power in 2 dBm steps above -40
    let power = u16_at(payload, 13);
    let battery = power >> 5;
    let tx_power = power & 0x1F;
    let movement_counter = payload[15];
    let sequence = u16_at(payload, 16);

    // All ones (or the minimum for signed fields) marks a reading as not available
    require("temperature", temperature != i16::MIN)?;
    require("humidity", humidity != u16::MAX)?;
    require("pressure", pressure != u16::MAX)?;
    require("acceleration", acceleration.iter().all(|axis| *axis != i16::MIN))?;
    require("battery", battery != 0x7FF)?;

    Ok(Measurement {
        device_id: format_mac(&payload[18..24]),
        format_version: 5,
        temperature: temperature as f64 / 200.0,
        humidity: humidity as f64 / 400.0,
        pressure: pressure as u32 + 50_000,
        acceleration_x: milli_g(acceleration[0]),
        acceleration_y: milli_g(acceleration[1]),
        acceleration_z: milli_g(acceleration[2]),
        battery_millivolts: battery + 1600,
        tx_power: (tx_power != 0x1F).then(|| (tx_power as i8) * 2 - 40),
        movement_counter: (movement_counter != u8::MAX).then_some(movement_counter),
        sequence: (sequence != u16::MAX).then_some(sequence),
    })
}

/// Colon separated upper case hex, e.g. `CB:B8:33:4C:88:4F`
pub fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(":")
}

fn ensure_length(payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() < expected {
        return Err(DecodeError::TooShort {
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

fn require(field: &'static str, available: bool) -> Result<()> {
    if available {
        Ok(())
    } else {
        Err(DecodeError::Unavailable(field))
    }
}

fn u16_at(payload: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([payload[offset], payload[offset + 1]])
}

fn i16_at(payload: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([payload[offset], payload[offset + 1]])
}

fn milli_g(value: i16) -> f64 {
    value as f64 / 1000.0
}
