pub mod codec;
pub mod models;

pub use codec::{decode_advertisement, decode_manufacturer_data, DecodeError};
pub use models::*;
