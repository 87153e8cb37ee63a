use std::io::Error as IoError;

use http::StatusCode;

pub type Result<T, E = MirroringError> = core::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum MirroringError {
    #[error("ID '{0}' is not a mirroring config resource")]
    MalformedIdentifier(String),

    #[error("'{crn}' is not a valid CRN, expected {expected} segments but found {found}")]
    InvalidCrn {
        crn: String,
        expected: usize,
        found: usize,
    },

    #[error("resource_instance_id is required")]
    MissingInstanceId,

    #[error(
        "mirroring config is not supported by the Event Streams {0} plan, enterprise plan is expected"
    )]
    PlanNotSupported(String),

    #[error("instance {0} does not expose a kafka_http_url")]
    MissingAdminUrl(String),

    #[error("Unexpected nil config when getting mirroring topic selection")]
    EmptyTopicSelection,

    #[error("no API key configured, set IC_API_KEY or api_key in the config file")]
    MissingApiKey,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("request to {url} failed with status {status}: {message}")]
    Api {
        url: String,
        status: StatusCode,
        message: String,
    },

    #[error("http transport error: {0}")]
    Transport(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config file {msg}")]
    ConfigFile { msg: String, source: IoError },

    #[error("Failed to deserialize config {msg}")]
    Toml {
        msg: String,
        source: toml::de::Error,
    },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}
