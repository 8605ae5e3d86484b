use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ListRequest, ObjectBody, ObjectStore, RawListing, RawObject, StoreError};
use crate::bucket::DELIMITER;

/// In-memory bucket with S3 listing semantics and switchable failures.
#[derive(Default)]
pub struct MemoryStore {
  objects: Mutex<BTreeMap<String, Vec<u8>>>,
  content_types: Mutex<BTreeMap<String, String>>,
  requests: Mutex<Vec<ListRequest>>,
  pub fail_list: bool,
  pub fail_get: bool,
  pub fail_put: bool,
}

enum Item {
  Prefix(String),
  Object(String),
}

impl Item {
  fn name(&self) -> &str {
    match self {
      Item::Prefix(p) => p,
      Item::Object(k) => k,
    }
  }
}

impl MemoryStore {
  pub fn with_keys(keys: &[&str]) -> Self {
    let store = Self::default();
    for key in keys {
      store.insert(key, key.as_bytes());
    }
    store
  }

  pub fn insert(&self, key: &str, body: &[u8]) {
    self.objects.lock().unwrap().insert(key.to_string(), body.to_vec());
  }

  pub fn set_content_type(&self, key: &str, content_type: &str) {
    self
      .content_types
      .lock()
      .unwrap()
      .insert(key.to_string(), content_type.to_string());
  }

  pub fn body(&self, key: &str) -> Option<Vec<u8>> {
    self.objects.lock().unwrap().get(key).cloned()
  }

  pub fn requests(&self) -> Vec<ListRequest> {
    self.requests.lock().unwrap().clone()
  }

  fn items(&self, prefix: &str) -> Vec<Item> {
    let objects = self.objects.lock().unwrap();
    let mut items: Vec<Item> = Vec::new();
    for key in objects.keys().filter(|k| k.starts_with(prefix)) {
      let rel = &key[prefix.len()..];
      match rel.find(DELIMITER) {
        Some(idx) => {
          let common = format!("{prefix}{}", &rel[..=idx]);
          if !matches!(items.last(), Some(Item::Prefix(p)) if *p == common) {
            items.push(Item::Prefix(common));
          }
        }
        None => items.push(Item::Object(key.clone())),
      }
    }
    items.sort_by(|a, b| a.name().cmp(b.name()));
    items
  }
}

#[async_trait]
impl ObjectStore for MemoryStore {
  async fn list(&self, request: &ListRequest) -> Result<RawListing, StoreError> {
    self.requests.lock().unwrap().push(request.clone());
    if self.fail_list {
      return Err(StoreError::List {
        prefix: request.prefix.clone(),
        message: "simulated outage".to_string(),
      });
    }

    let items = self.items(&request.prefix);
    let start = match request.continuation_token {
      Some(ref token) => items.iter().position(|i| i.name() > token.as_str()).unwrap_or(items.len()),
      None => 0,
    };
    let max = request.max_keys.max(1) as usize;
    let end = (start + max).min(items.len());
    let is_truncated = end < items.len();

    let objects = self.objects.lock().unwrap();
    let mut listing = RawListing {
      is_truncated,
      next_token: if is_truncated { Some(items[end - 1].name().to_string()) } else { None },
      ..RawListing::default()
    };
    for item in &items[start..end] {
      match item {
        Item::Prefix(p) => listing.common_prefixes.push(p.clone()),
        Item::Object(k) => listing.contents.push(RawObject {
          key: k.clone(),
          size: objects.get(k).map_or(0, |b| b.len() as u64),
          modified: None,
        }),
      }
    }
    Ok(listing)
  }

  async fn head(&self, key: &str) -> Result<Option<String>, StoreError> {
    Ok(self.content_types.lock().unwrap().get(key).cloned())
  }

  async fn get(&self, key: &str) -> Result<ObjectBody, StoreError> {
    if self.fail_get {
      return Err(StoreError::Get {
        key: key.to_string(),
        message: "simulated outage".to_string(),
      });
    }
    let bytes = self.body(key).ok_or_else(|| StoreError::Get {
      key: key.to_string(),
      message: "NoSuchKey".to_string(),
    })?;
    Ok(ObjectBody {
      bytes,
      ..ObjectBody::default()
    })
  }

  async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), StoreError> {
    if self.fail_put {
      return Err(StoreError::Put {
        key: key.to_string(),
        message: "simulated outage".to_string(),
      });
    }
    self.objects.lock().unwrap().insert(key.to_string(), body);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn request(prefix: &str, token: Option<&str>, max_keys: i32) -> ListRequest {
    ListRequest {
      prefix: prefix.to_string(),
      continuation_token: token.map(str::to_string),
      max_keys,
    }
  }

  #[tokio::test]
  async fn test_groups_common_prefixes() {
    let store = MemoryStore::with_keys(&["a/1", "a/2", "b/c/d", "root.txt"]);
    let listing = store.list(&request("", None, 100)).await.unwrap();
    assert_eq!(listing.common_prefixes, vec!["a/", "b/"]);
    let keys: Vec<&str> = listing.contents.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["root.txt"]);
    assert!(!listing.is_truncated);
  }

  #[tokio::test]
  async fn test_pages_with_tokens() {
    let store = MemoryStore::with_keys(&["a", "b", "c"]);
    let first = store.list(&request("", None, 2)).await.unwrap();
    assert_eq!(first.contents.len(), 2);
    assert!(first.is_truncated);

    let second = store.list(&request("", first.next_token.as_deref(), 2)).await.unwrap();
    let keys: Vec<&str> = second.contents.iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["c"]);
    assert!(!second.is_truncated);
    assert_eq!(store.requests().len(), 2);
  }
}
