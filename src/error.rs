use derive_more::{Display, From};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, From)]
pub enum Error {
    /// Network or transport failure before an HTTP status was received
    #[from]
    Transport(reqwest::Error),

    /// Non-2xx response; `message` is already extracted from the body
    #[display("{message}")]
    Http { status: u16, message: String },

    /// Client-side validation failure, never sent to the server
    #[display("{msg}")]
    Validation { msg: String },

    #[display("Invalid timestamp: {value}")]
    InvalidTimestamp { value: String },

    #[display("Configuration error: {msg}")]
    Config { msg: String },

    #[display("Invalid URL: {msg}")]
    Url { msg: String },

    #[from]
    Io(std::io::Error),

    #[from]
    Json(serde_json::Error),
}

impl std::error::Error for Error {}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation { msg: msg.into() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// HTTP status of a failed request, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Single-line text for the status area
    pub fn user_message(&self) -> String {
        self.to_string()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
