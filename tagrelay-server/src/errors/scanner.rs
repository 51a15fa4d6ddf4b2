use tagrelay_api::DecodeError;

#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    #[error("Invalid gateway message: {0}")]
    Message(#[from] serde_json::Error),

    #[error("Invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Undecodable advertisement: {0}")]
    Decode(#[from] DecodeError),

    #[error("No device id in topic {0:?} or payload")]
    MissingDeviceId(String),
}
