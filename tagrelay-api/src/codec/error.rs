use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload shorter than its data format requires
    TooShort { expected: usize, actual: usize },
    /// Malformed advertising data structure
    Malformed(String),
    /// No manufacturer data from the expected company id
    UnknownManufacturer(u16),
    /// Manufacturer data missing from the advertisement
    MissingManufacturerData,
    /// Data format not supported by this decoder
    UnsupportedFormat(u8),
    /// The sensor flagged a required reading as not available
    Unavailable(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { expected, actual } => {
                write!(f, "Payload too short: expected {} bytes, got {}", expected, actual)
            }
            Self::Malformed(e) => write!(f, "Malformed advertisement: {}", e),
            Self::UnknownManufacturer(id) => write!(f, "Unknown manufacturer: 0x{:04X}", id),
            Self::MissingManufacturerData => write!(f, "No manufacturer data"),
            Self::UnsupportedFormat(format) => write!(f, "Unsupported data format: {}", format),
            Self::Unavailable(field) => write!(f, "Reading not available: {}", field),
        }
    }
}

impl std::error::Error for DecodeError {}

pub type Result<T> = core::result::Result<T, DecodeError>;
