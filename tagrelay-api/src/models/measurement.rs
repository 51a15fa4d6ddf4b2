use serde::{Deserialize, Serialize};

/// A single decoded beacon reading, as handed over by the scanner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Hardware address of the beacon
    pub device_id: String,
    /// Advertisement data format (3 or 5)
    pub format_version: u8,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity %
    pub humidity: f64,
    /// Air pressure in hundredths of hPa (Pa)
    pub pressure: u32,
    /// Acceleration in g
    pub acceleration_x: f64,
    pub acceleration_y: f64,
    pub acceleration_z: f64,
    /// Battery voltage in mV
    pub battery_millivolts: u16,
    /// Transmit power in dBm, format 5 only
    pub tx_power: Option<i8>,
    /// Movement counter, format 5 only
    pub movement_counter: Option<u8>,
    /// Measurement sequence number, format 5 only
    pub sequence: Option<u16>,
}
