mod channel;
mod device;
mod measurement;

pub use channel::*;
pub use device::*;
pub use measurement::*;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Current wall clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Formats epoch milliseconds as an RFC 3339 UTC timestamp with second precision.
///
/// Returns an empty string when the instant is outside the representable range.
pub fn iso_timestamp(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp(millis.div_euclid(1000))
        .ok()
        .and_then(|time| time.format(&Rfc3339).ok())
        .unwrap_or_default()
}

/// Pressure travels at 100x hPa (Pa) until it leaves the core
pub fn hundredths_to_hpa(pressure: u32) -> f64 {
    pressure as f64 / 100.0
}

pub fn millivolts_to_volts(battery: u16) -> f64 {
    battery as f64 / 1000.0
}
