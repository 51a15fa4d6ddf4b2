use serde::{Deserialize, Serialize};

use super::{hundredths_to_hpa, iso_timestamp, millivolts_to_volts, Measurement};

/// Canonical external key of a device: lowercase with `:` separators removed
pub fn normalize_id(id: &str) -> String {
    id.replace(':', "").to_lowercase()
}

/// Static identity of a device as read from the device directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfigEntry {
    /// Hardware address, e.g. `AA:BB:CC:DD:EE:FF`
    pub id: String,
    /// Human readable name
    #[serde(alias = "name")]
    pub display_name: String,
}

/// Enriched device record, published and persisted by the relay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    /// Raw hardware address
    pub id: String,
    /// Derived from `id`, see [`normalize_id`]
    pub normalized_id: String,
    /// Empty when no name is configured
    pub display_name: String,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity %
    pub humidity: f64,
    /// Air pressure in hPa
    pub pressure_hpa: f64,
    /// Battery voltage in V
    pub battery_volts: f64,
    /// Acceleration in g
    pub acceleration_x: f64,
    pub acceleration_y: f64,
    pub acceleration_z: f64,
    /// Processing time in epoch milliseconds
    pub timestamp_millis: i64,
    /// `timestamp_millis` as RFC 3339
    #[serde(rename = "timestampISO")]
    pub timestamp_iso: String,
    /// Milliseconds since the previous reading of this device
    pub ping_millis: i64,
    /// Data format of the source advertisement
    pub format_version: u8,
}

impl DeviceState {
    /// Identity-only record, metrics left at their defaults
    pub fn identity(id: &str, display_name: &str) -> Self {
        Self {
            id: id.to_string(),
            normalized_id: normalize_id(id),
            display_name: display_name.to_string(),
            ..Default::default()
        }
    }

    /// Metric-only record built from a fresh measurement; identity fields stay empty
    pub fn stub(measurement: &Measurement, timestamp_millis: i64, ping_millis: i64) -> Self {
        Self {
            temperature: measurement.temperature,
            humidity: measurement.humidity,
            pressure_hpa: hundredths_to_hpa(measurement.pressure),
            battery_volts: millivolts_to_volts(measurement.battery_millivolts),
            acceleration_x: measurement.acceleration_x,
            acceleration_y: measurement.acceleration_y,
            acceleration_z: measurement.acceleration_z,
            timestamp_millis,
            timestamp_iso: iso_timestamp(timestamp_millis),
            ping_millis,
            format_version: measurement.format_version,
            ..Default::default()
        }
    }

    /// Copies every non-default field of `other` onto `self`.
    ///
    /// Default values (empty strings, zeros) in `other` never overwrite `self`,
    /// so a known display name survives a merge with a stub that has none.
    pub fn merge(&mut self, other: &DeviceState) {
        merge_field(&mut self.id, &other.id);
        merge_field(&mut self.normalized_id, &other.normalized_id);
        merge_field(&mut self.display_name, &other.display_name);
        merge_field(&mut self.temperature, &other.temperature);
        merge_field(&mut self.humidity, &other.humidity);
        merge_field(&mut self.pressure_hpa, &other.pressure_hpa);
        merge_field(&mut self.battery_volts, &other.battery_volts);
        merge_field(&mut self.acceleration_x, &other.acceleration_x);
        merge_field(&mut self.acceleration_y, &other.acceleration_y);
        merge_field(&mut self.acceleration_z, &other.acceleration_z);
        merge_field(&mut self.timestamp_millis, &other.timestamp_millis);
        merge_field(&mut self.timestamp_iso, &other.timestamp_iso);
        merge_field(&mut self.ping_millis, &other.ping_millis);
        merge_field(&mut self.format_version, &other.format_version);
    }

    /// One-line console projection: ping in seconds, name, climate and battery
    pub fn summary(&self) -> String {
        format!(
            "{:9.3}s ago - {:<14} :: {:7.2} °c, {:6.2} %H, {:7.2} hPa, {:5.3} v",
            self.ping_millis as f64 / 1000.0,
            self.display_name,
            self.temperature,
            self.humidity,
            self.pressure_hpa,
            self.battery_volts,
        )
    }
}

fn merge_field<T: Default + PartialEq + Clone>(target: &mut T, source: &T) {
    if *source != T::default() {
        *target = source.clone();
    }
}
