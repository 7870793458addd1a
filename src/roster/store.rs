//! Backend seam for the assignment controller.

use crate::error::Result;

use super::label::ClassLabel;
use super::types::{Assignment, AssignmentKey};

/// Persistence operations the controller needs from a backend.
///
/// Each call is independent; nothing here makes a check followed by an
/// insert atomic.
#[allow(async_fn_in_trait)]
pub trait AssignmentStore {
  /// Drop any locally cached reads so the next check sees the backend's
  /// current rows. Stores without a cache do nothing.
  fn discard_cached(&self) {}

  /// Every assignment, in backend order.
  async fn list(&self) -> Result<Vec<Assignment>>;

  /// Whether the lecturer already teaches this course.
  async fn exists(&self, key: AssignmentKey) -> Result<bool>;

  /// Highest class label in use for a course.
  async fn last_label(&self, id_mk_genap: i64) -> Result<Option<ClassLabel>>;

  async fn insert(&self, assignment: &Assignment) -> Result<()>;

  /// Delete by key. Fails with `NotFound` when nothing matched.
  async fn delete(&self, key: AssignmentKey) -> Result<()>;
}
