use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

use super::label::ClassLabel;

/// A lecturer teaching one section of a course (`tbl_data_dosen` row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
  pub id_dosen: i64,
  pub id_mk_genap: i64,
  pub kelas: String,
}

impl Assignment {
  pub fn key(&self) -> AssignmentKey {
    AssignmentKey::new(self.id_dosen, self.id_mk_genap)
  }

  pub fn label(&self) -> Result<ClassLabel> {
    ClassLabel::parse(&self.kelas)
  }
}

/// Composite identity of an assignment: lecturer + course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssignmentKey {
  pub id_dosen: i64,
  pub id_mk_genap: i64,
}

impl AssignmentKey {
  pub fn new(id_dosen: i64, id_mk_genap: i64) -> Self {
    Self {
      id_dosen,
      id_mk_genap,
    }
  }

  /// Database ids start at 1; zero or negative means "not selected".
  pub fn is_well_formed(&self) -> bool {
    self.id_dosen > 0 && self.id_mk_genap > 0
  }
}

impl fmt::Display for AssignmentKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "lecturer {} / course {}", self.id_dosen, self.id_mk_genap)
  }
}

/// Lecturer row (`tbl_dosen`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecturer {
  pub id_dosen: i64,
  pub nama_dosen: String,
}

/// Even-semester course row (`tbl_mk_genap`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
  pub id_mk_genap: i64,
  pub nama_mk_genap: String,
  pub smt: i64,
  pub sks: i64,
  pub sifat: String,
  pub kategori: String,
  pub metode: String,
}

/// Lecturer joined with the sections they teach, for overview screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LecturerLoad {
  pub id_dosen: i64,
  pub nama_dosen: String,
  pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
  pub id_mk_genap: i64,
  pub nama_mk_genap: String,
  pub kelas: String,
}
