use thiserror::Error;
use uuid::Uuid;

use crate::document::DocumentError;

#[derive(Error, Debug)]
pub enum ProofreadError {
    #[error("Cannot reach the checking service: {0}")]
    Network(#[from] reqwest::Error),

    #[error("The checking service responded with status {status}")]
    ServiceStatus { status: u16 },

    #[error("Cannot decode the checking service's response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Ignore store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Cannot migrate the ignore store: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(
        "Match at offset {offset} with length {length} cannot be mapped onto a text of \
         {text_length} characters"
    )]
    Unmapped {
        offset: usize,
        length: usize,
        text_length: usize,
    },

    #[error("Annotation {uuid} has no replacement with index {index}")]
    NoSuchReplacement { uuid: Uuid, index: usize },

    #[error(transparent)]
    Document(#[from] DocumentError),
}
