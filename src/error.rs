//! Error types for the request client and the assignment controller.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  /// Transport failure: connection refused, timeout, broken body stream.
  #[error("request to {url} failed: {source}")]
  Network {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  /// The backend answered with a non-2xx status.
  #[error("{url} responded with HTTP {status}: {body}")]
  HttpStatus {
    url: String,
    status: StatusCode,
    body: String,
  },

  #[error("lecturer {id_dosen} is already assigned to course {id_mk_genap}")]
  Duplicate { id_dosen: i64, id_mk_genap: i64 },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("course {id_mk_genap} has used every class label from A to Z")]
  CapacityExceeded { id_mk_genap: i64 },

  #[error("invalid input: {0}")]
  Validation(String),

  #[error("failed to decode payload: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),
}

impl Error {
  /// True for the transport and non-2xx failures the UI reports as "backend unreachable".
  pub fn is_network(&self) -> bool {
    matches!(self, Error::Network { .. } | Error::HttpStatus { .. })
  }

  /// HTTP status carried by the error, if the backend answered at all.
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Error::HttpStatus { status, .. } => Some(*status),
      Error::Network { source, .. } => source.status(),
      _ => None,
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
