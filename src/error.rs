use thiserror::Error;

/// Construction-time failures. Nothing can render, so these are never downgraded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("timeline target is required")]
    MissingTarget,

    #[error("timeline viewport host is required")]
    MissingHost,

    #[error("timeline data is required")]
    MissingData,

    #[error("target is not a usable drawing surface: {0}")]
    InvalidSurface(String),

    #[error("invalid layout setting `{name}`: {value}")]
    InvalidSetting { name: &'static str, value: f32 },

    #[error("unknown orientation `{0}` (expected auto, horizontal or vertical)")]
    UnknownOrientation(String),
}

/// Failures during a render pass. The previously drawn scene stays current.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("timeline has been torn down")]
    TornDown,

    #[error("viewport size {width}x{height} is not drawable")]
    Viewport { width: f32, height: f32 },

    #[error("non-finite geometry in `{0}`")]
    NonFinite(String),

    #[error("surface error: {0}")]
    Surface(String),
}

/// Failures at the JSON import boundary. The existing model is left untouched.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid JSON: expected an array of tracks")]
    NotAnArray,

    #[error("page carries no embedded timeline data")]
    MissingPayload,

    #[error("track {index} is malformed: {source}")]
    Track {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}
