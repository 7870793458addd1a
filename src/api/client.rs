//! Backend REST client.
//! Caches GET responses per endpoint and invalidates them after mutations.

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::cache::{CacheSource, RequestCache};
use crate::config::ApiConfig;
use crate::error::{Error, Result};

use super::endpoint::{normalize, resource_segment};

/// REST client with a read-through response cache.
///
/// The cache belongs to this instance (and its clones). Failed requests are
/// never retried and never touch the cache.
#[derive(Clone)]
pub struct ApiClient {
  http: Client,
  base_url: Url,
  cache: RequestCache,
}

impl ApiClient {
  /// Create a client for the configured base URL, with caching per `config.cache`.
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let cache = if config.cache {
      RequestCache::in_memory()
    } else {
      RequestCache::disabled()
    };
    Self::with_cache(config, cache)
  }

  /// Create a client that uses the given cache.
  pub fn with_cache(config: &ApiConfig, cache: RequestCache) -> Result<Self> {
    let base_url = Url::parse(&config.base_url).map_err(|e| {
      Error::Validation(format!("invalid base URL '{}': {}", config.base_url, e))
    })?;

    let http = Client::builder()
      .timeout(config.timeout())
      .user_agent(concat!("jadwal/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|source| Error::Network {
        url: base_url.to_string(),
        source,
      })?;

    Ok(Self {
      http,
      base_url,
      cache,
    })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  pub fn cache(&self) -> &RequestCache {
    &self.cache
  }

  /// GET `{base_url}/{endpoint}`, served from the cache when possible.
  pub async fn fetch_data(&self, endpoint: &str) -> Result<Value> {
    let key = normalize(endpoint);

    match self
      .cache
      .fetch(key, || self.execute(Method::GET, key, None))
      .await
    {
      Ok(result) => {
        if result.source == CacheSource::Network {
          debug!(endpoint = key, "fetched from network");
        }
        Ok(result.data)
      }
      Err(e) => {
        warn!(endpoint = key, error = %e, "fetch failed");
        Err(e)
      }
    }
  }

  /// GET and decode into `T`.
  pub async fn fetch_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
    let value = self.fetch_data(endpoint).await?;
    Ok(serde_json::from_value(value)?)
  }

  /// GET that reports failure as JSON `null` instead of an error.
  ///
  /// For views that would rather render nothing than fail. The failure is
  /// still logged by `fetch_data`.
  pub async fn fetch_or_empty(&self, endpoint: &str) -> Value {
    self.fetch_data(endpoint).await.unwrap_or(Value::Null)
  }

  /// Send a mutating request and invalidate the endpoint's resource segment.
  ///
  /// Only POST, PUT, PATCH and DELETE are accepted.
  pub async fn send_data(
    &self,
    endpoint: &str,
    method: Method,
    body: Option<&Value>,
  ) -> Result<Value> {
    if !is_mutating(&method) {
      return Err(Error::Validation(format!(
        "{} is not a mutating method",
        method
      )));
    }

    let endpoint = normalize(endpoint);
    let response = match self.execute(method.clone(), endpoint, body).await {
      Ok(response) => response,
      Err(e) => {
        error!(%method, endpoint, error = %e, "send failed");
        return Err(e);
      }
    };

    self.cache.invalidate_prefix(resource_segment(endpoint));
    info!(%method, endpoint, "request sent");

    Ok(response)
  }

  /// Remove every cached response whose endpoint starts with `prefix`.
  pub fn invalidate_cache(&self, prefix: &str) -> usize {
    self.cache.invalidate_prefix(normalize(prefix))
  }

  fn url_for(&self, endpoint: &str) -> Result<Url> {
    let raw = format!(
      "{}/{}",
      self.base_url.as_str().trim_end_matches('/'),
      endpoint
    );
    Url::parse(&raw)
      .map_err(|e| Error::Validation(format!("invalid endpoint '{}': {}", endpoint, e)))
  }

  async fn execute(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
    let url = self.url_for(endpoint)?;

    let mut request = self.http.request(method, url.clone());
    if let Some(body) = body {
      request = request.json(body);
    }

    let response = request.send().await.map_err(|source| Error::Network {
      url: url.to_string(),
      source,
    })?;

    let status = response.status();
    let text = response.text().await.map_err(|source| Error::Network {
      url: url.to_string(),
      source,
    })?;

    if !status.is_success() {
      return Err(Error::HttpStatus {
        url: url.to_string(),
        status,
        body: text,
      });
    }

    Ok(decode_body(&text))
  }
}

fn is_mutating(method: &Method) -> bool {
  matches!(
    *method,
    Method::POST | Method::PUT | Method::PATCH | Method::DELETE
  )
}

/// Empty bodies become `null`; anything that isn't JSON is kept as a string.
fn decode_body(text: &str) -> Value {
  if text.trim().is_empty() {
    return Value::Null;
  }
  serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
