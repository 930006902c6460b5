use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not fetch grid state from {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not parse response from {url}")]
    Parse {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not deliver webhook to {url}")]
    Notify {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A real transport error, produced without touching the network.
#[cfg(test)]
pub(crate) fn request_error() -> reqwest::Error {
    reqwest::blocking::Client::new()
        .get("not a url")
        .send()
        .unwrap_err()
}
