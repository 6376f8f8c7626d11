/// Error types for the ipgeo-inspect library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No API key was supplied on the command line or in the environment.
    #[error("API key not set; pass --api-key or set IPGEOLOCATION_API_KEY")]
    MissingApiKey,

    /// None of the candidate sources contained an IPv4 address.
    #[error("no valid IP address found")]
    NoAddress,

    /// The geolocation service answered with an error payload.
    #[error("{message}")]
    Service { message: String },

    /// The geolocation service answered with a non-success status and no message.
    #[error("geolocation service returned HTTP {status}")]
    Status { status: u16 },

    /// The request could not be sent or its body could not be read.
    #[error("failed to fetch geolocation data")]
    Request(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("malformed geolocation response")]
    Decode(#[from] serde_json::Error),

    /// A `--cursor` position could not be parsed.
    #[error("invalid cursor position {input:?}, expected LINE:COLUMN")]
    InvalidCursor { input: String },

    /// The address locator could not be built.
    #[error(transparent)]
    Locator(#[from] ip_locate::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results using the library error.
pub type Result<T> = std::result::Result<T, Error>;
