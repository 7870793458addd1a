//! Lecturer/course assignment controller.
//!
//! Holds a mirror of every assignment on the backend and refreshes it after
//! each successful write. Class labels are assigned here, not by callers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

use super::label::next_label;
use super::store::AssignmentStore;
use super::types::{Assignment, AssignmentKey};

/// Assignment controller over any [`AssignmentStore`].
///
/// `add` runs check-duplicate, compute-label and insert under a per-course
/// lock. The lock only covers callers sharing this controller; another
/// client writing to the same backend can still produce a label clash.
pub struct AssignmentController<S: AssignmentStore> {
  store: S,
  mirror: RwLock<Vec<Assignment>>,
  course_locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl<S: AssignmentStore> AssignmentController<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      mirror: RwLock::new(Vec::new()),
      course_locks: Mutex::new(HashMap::new()),
    }
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  /// Snapshot of the mirrored list.
  pub fn assignments(&self) -> Vec<Assignment> {
    self
      .mirror
      .read()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .clone()
  }

  pub fn len(&self) -> usize {
    self
      .mirror
      .read()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
      .len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Replace the mirror with the backend's current list.
  ///
  /// On failure the previous mirror is kept and the error returned.
  pub async fn fetch_all(&self) -> Result<()> {
    match self.store.list().await {
      Ok(assignments) => {
        let count = assignments.len();
        *self
          .mirror
          .write()
          .unwrap_or_else(|poisoned| poisoned.into_inner()) = assignments;
        debug!(count, "assignments refreshed");
        Ok(())
      }
      Err(e) => {
        warn!(error = %e, "failed to refresh assignments, keeping previous list");
        Err(e)
      }
    }
  }

  /// Assign a lecturer to a course with the next free class label.
  ///
  /// Returns the stored assignment. The mirror is refreshed afterwards; if
  /// that refresh fails the error is returned even though the insert landed.
  pub async fn add(&self, id_dosen: i64, id_mk_genap: i64) -> Result<Assignment> {
    let key = AssignmentKey::new(id_dosen, id_mk_genap);
    if !key.is_well_formed() {
      return Err(Error::Validation(format!(
        "lecturer and course ids must be positive, got {}",
        key
      )));
    }

    let lock = self.course_lock(id_mk_genap);
    let result = {
      let _guard = lock.lock().await;
      self.insert_next_label(key).await
    };
    self.release_course_lock(id_mk_genap, lock);
    let assignment = result?;

    info!(id_dosen, id_mk_genap, kelas = %assignment.kelas, "assignment added");
    self.fetch_all().await?;

    Ok(assignment)
  }

  /// Duplicate check, label pick and insert. Callers hold the course lock.
  async fn insert_next_label(&self, key: AssignmentKey) -> Result<Assignment> {
    let AssignmentKey {
      id_dosen,
      id_mk_genap,
    } = key;

    // Both checks below read the same fresh list
    self.store.discard_cached();

    if self.store.exists(key).await? {
      warn!(id_dosen, id_mk_genap, "assignment already exists");
      return Err(Error::Duplicate {
        id_dosen,
        id_mk_genap,
      });
    }

    let last = self.store.last_label(id_mk_genap).await?;
    let label = match next_label(last, id_mk_genap) {
      Ok(label) => label,
      Err(e) => {
        warn!(id_mk_genap, "no class label left");
        return Err(e);
      }
    };

    let assignment = Assignment {
      id_dosen,
      id_mk_genap,
      kelas: label.to_string(),
    };
    self.store.insert(&assignment).await?;
    Ok(assignment)
  }

  /// Remove a lecturer from a course.
  pub async fn remove(&self, id_dosen: i64, id_mk_genap: i64) -> Result<()> {
    let key = AssignmentKey::new(id_dosen, id_mk_genap);
    if !key.is_well_formed() {
      return Err(Error::NotFound(format!("invalid identifiers: {}", key)));
    }

    self.store.discard_cached();
    if !self.store.exists(key).await? {
      return Err(Error::NotFound(key.to_string()));
    }

    self.store.delete(key).await?;
    info!(id_dosen, id_mk_genap, "assignment removed");

    self.fetch_all().await
  }

  fn course_lock(&self, id_mk_genap: i64) -> Arc<AsyncMutex<()>> {
    let mut locks = self
      .course_locks
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    Arc::clone(locks.entry(id_mk_genap).or_default())
  }

  /// Drop the caller's handle and forget the lock once no other add holds it.
  fn release_course_lock(&self, id_mk_genap: i64, lock: Arc<AsyncMutex<()>>) {
    let mut locks = self
      .course_locks
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    drop(lock);
    if locks
      .get(&id_mk_genap)
      .is_some_and(|entry| Arc::strong_count(entry) == 1)
    {
      locks.remove(&id_mk_genap);
    }
  }
}
