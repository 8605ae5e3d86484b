use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::{ByteStream, DateTime as SmithyDateTime};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{ListRequest, ObjectBody, ObjectStore, RawListing, RawObject, StoreError};
use crate::bucket::DELIMITER;
use crate::config::StoreConfig;

pub struct S3Store {
  client: Client,
  bucket: String,
}

impl S3Store {
  /// Builds a client from the ambient AWS configuration chain, with the
  /// overrides from `[store]` applied on top.
  pub async fn connect(bucket: &str, config: &StoreConfig) -> Result<Self, StoreError> {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(ref region) = config.region {
      loader = loader.region(Region::new(region.clone()));
    }
    let shared = loader.load().await;

    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(ref url) = config.endpoint_url {
      builder = builder.endpoint_url(url);
    }
    if config.force_path_style {
      builder = builder.force_path_style(true);
    }
    let s3_config = builder.build();
    if s3_config.region().is_none() {
      return Err(StoreError::Config(
        "no region configured (set AWS_REGION or [store] region)".to_string(),
      ));
    }

    info!(bucket, endpoint = ?config.endpoint_url, "s3 client configured");
    Ok(Self {
      client: Client::from_conf(s3_config),
      bucket: bucket.to_string(),
    })
  }
}

fn to_chrono(time: Option<&SmithyDateTime>) -> Option<DateTime<Utc>> {
  time.and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))
}

#[async_trait]
impl ObjectStore for S3Store {
  async fn list(&self, request: &ListRequest) -> Result<RawListing, StoreError> {
    debug!(prefix = %request.prefix, token = ?request.continuation_token, "list_objects_v2");
    let output = self
      .client
      .list_objects_v2()
      .bucket(&self.bucket)
      .prefix(&request.prefix)
      .delimiter(DELIMITER.to_string())
      .max_keys(request.max_keys)
      .set_continuation_token(request.continuation_token.clone())
      .send()
      .await
      .map_err(|e| StoreError::List {
        prefix: request.prefix.clone(),
        message: DisplayErrorContext(&e).to_string(),
      })?;

    let common_prefixes = output
      .common_prefixes()
      .iter()
      .filter_map(|p| p.prefix().map(str::to_string))
      .collect();

    let contents = output
      .contents()
      .iter()
      .filter_map(|obj| {
        let key = obj.key()?;
        Some(RawObject {
          key: key.to_string(),
          size: obj.size().unwrap_or(0).max(0) as u64,
          modified: to_chrono(obj.last_modified()),
        })
      })
      .collect();

    Ok(RawListing {
      common_prefixes,
      contents,
      is_truncated: output.is_truncated().unwrap_or(false),
      next_token: output.next_continuation_token().map(str::to_string),
    })
  }

  async fn head(&self, key: &str) -> Result<Option<String>, StoreError> {
    let output = self
      .client
      .head_object()
      .bucket(&self.bucket)
      .key(key)
      .send()
      .await
      .map_err(|e| StoreError::Head {
        key: key.to_string(),
        message: DisplayErrorContext(&e).to_string(),
      })?;
    Ok(output.content_type().map(str::to_string))
  }

  async fn get(&self, key: &str) -> Result<ObjectBody, StoreError> {
    debug!(key, "get_object");
    let output = self
      .client
      .get_object()
      .bucket(&self.bucket)
      .key(key)
      .send()
      .await
      .map_err(|e| StoreError::Get {
        key: key.to_string(),
        message: DisplayErrorContext(&e).to_string(),
      })?;

    let metadata: BTreeMap<String, String> = output
      .metadata()
      .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
      .unwrap_or_default();
    let modified = to_chrono(output.last_modified());

    let bytes = output
      .body
      .collect()
      .await
      .map_err(|e| StoreError::Body {
        key: key.to_string(),
        message: e.to_string(),
      })?
      .into_bytes()
      .to_vec();

    Ok(ObjectBody {
      bytes,
      metadata,
      modified,
    })
  }

  async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
    debug!(key, len = body.len(), "put_object");
    self
      .client
      .put_object()
      .bucket(&self.bucket)
      .key(key)
      .body(ByteStream::from(body))
      .send()
      .await
      .map_err(|e| StoreError::Put {
        key: key.to_string(),
        message: DisplayErrorContext(&e).to_string(),
      })?;
    Ok(())
  }
}
