//! Assignment store backed by the REST API.

use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::api::endpoint::resource_segment;
use crate::api::ApiClient;
use crate::config::Endpoints;
use crate::error::{Error, Result};

use super::label::ClassLabel;
use super::store::AssignmentStore;
use super::types::{Assignment, AssignmentKey};

/// REST store: reads go through the client's cache, writes invalidate it.
///
/// Every successful write drops the list segment explicitly, since a
/// configured create endpoint may sit under a different segment than the
/// list.
#[derive(Clone)]
pub struct RestStore {
  api: ApiClient,
  endpoints: Endpoints,
}

impl RestStore {
  pub fn new(api: ApiClient, endpoints: Endpoints) -> Self {
    Self { api, endpoints }
  }

  pub fn api(&self) -> &ApiClient {
    &self.api
  }

  fn invalidate_list(&self) {
    let removed = self
      .api
      .invalidate_cache(resource_segment(&self.endpoints.list));
    debug!(endpoint = %self.endpoints.list, removed, "list cache dropped");
  }
}

impl AssignmentStore for RestStore {
  fn discard_cached(&self) {
    self.invalidate_list();
  }

  async fn list(&self) -> Result<Vec<Assignment>> {
    self.api.fetch_json(&self.endpoints.list).await
  }

  async fn exists(&self, key: AssignmentKey) -> Result<bool> {
    let assignments = self.list().await?;
    Ok(assignments.iter().any(|a| a.key() == key))
  }

  async fn last_label(&self, id_mk_genap: i64) -> Result<Option<ClassLabel>> {
    let labels = self
      .list()
      .await?
      .iter()
      .filter(|a| a.id_mk_genap == id_mk_genap)
      .map(Assignment::label)
      .collect::<Result<Vec<_>>>()?;

    Ok(labels.into_iter().max())
  }

  async fn insert(&self, assignment: &Assignment) -> Result<()> {
    let body = serde_json::to_value(assignment)?;

    match self
      .api
      .send_data(&self.endpoints.create, Method::POST, Some(&body))
      .await
    {
      Ok(_) => {}
      Err(e) if e.status() == Some(StatusCode::CONFLICT) => {
        return Err(Error::Duplicate {
          id_dosen: assignment.id_dosen,
          id_mk_genap: assignment.id_mk_genap,
        });
      }
      Err(e) => return Err(e),
    }

    self.invalidate_list();
    Ok(())
  }

  async fn delete(&self, key: AssignmentKey) -> Result<()> {
    let endpoint = self
      .endpoints
      .delete_path(key.id_dosen, key.id_mk_genap);

    match self.api.send_data(&endpoint, Method::DELETE, None).await {
      Ok(_) => {}
      Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => {
        return Err(Error::NotFound(key.to_string()));
      }
      Err(e) => return Err(e),
    }

    self.invalidate_list();
    Ok(())
  }
}
