//! External collaborators behind traits: search, browsing, media, processes

pub mod browser;
pub mod media;
pub mod process;
pub mod search;

pub use browser::{Browser, HttpBrowser, Summarizer, WebPage};
pub use media::{HttpMedia, MediaOps};
pub use process::ProcessRunner;
pub use search::{DuckDuckGoSearch, GoogleCustomSearch, SearchBackend, SearchHit};

use autopilot_provider::ProviderError;
use thiserror::Error;

use crate::workspace::PathValidationError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Path(#[from] PathValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{service} returned {status}: {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{0}")]
    Failed(String),
}

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.5615.49 Safari/537.36";
