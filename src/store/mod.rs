//! Object store access. [`ObjectStore`] is the seam between the controller's
//! tasks and the backing service: [`s3::S3Store`] in production,
//! `memory::MemoryStore` in tests.

pub mod s3;

#[cfg(test)]
pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to list objects under {prefix:?}: {message}")]
  List { prefix: String, message: String },

  #[error("failed to get {key}: {message}")]
  Get { key: String, message: String },

  #[error("failed to read body of {key}: {message}")]
  Body { key: String, message: String },

  #[error("failed to upload {key}: {message}")]
  Put { key: String, message: String },

  #[error("failed to inspect {key}: {message}")]
  Head { key: String, message: String },

  #[error("object store configuration: {0}")]
  Config(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
  pub prefix: String,
  pub continuation_token: Option<String>,
  pub max_keys: i32,
}

/// A listing exactly as the store returns it, before projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawListing {
  pub common_prefixes: Vec<String>,
  pub contents: Vec<RawObject>,
  pub is_truncated: bool,
  pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
  pub key: String,
  pub size: u64,
  pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectBody {
  pub bytes: Vec<u8>,
  pub metadata: BTreeMap<String, String>,
  pub modified: Option<DateTime<Utc>>,
}

/// Operations against a single bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
  /// Lists one level under `request.prefix` using `/` as the delimiter.
  async fn list(&self, request: &ListRequest) -> Result<RawListing, StoreError>;

  /// Returns the object's content type, if the store recorded one.
  async fn head(&self, key: &str) -> Result<Option<String>, StoreError>;

  async fn get(&self, key: &str) -> Result<ObjectBody, StoreError>;

  /// Overwrites `key` with `body`.
  async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError>;
}
