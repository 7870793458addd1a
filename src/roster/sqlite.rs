//! Assignment store backed by a SQLite database with the scheduling schema.

use rusqlite::{ffi, params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};

use super::label::ClassLabel;
use super::store::AssignmentStore;
use super::types::{Assignment, AssignmentKey, Course, Lecturer, LecturerLoad, Section};

/// Schema for the scheduling tables.
const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS tbl_dosen (
    id_dosen INTEGER PRIMARY KEY,
    nama_dosen TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tbl_mk_genap (
    id_mk_genap INTEGER PRIMARY KEY,
    nama_mk_genap TEXT NOT NULL,
    smt INTEGER NOT NULL,
    sks INTEGER NOT NULL,
    sifat TEXT NOT NULL,
    kategori TEXT NOT NULL,
    metode TEXT NOT NULL
);

-- One row per lecturer teaching a section of a course
CREATE TABLE IF NOT EXISTS tbl_data_dosen (
    id_dosen INTEGER NOT NULL REFERENCES tbl_dosen(id_dosen),
    id_mk_genap INTEGER NOT NULL REFERENCES tbl_mk_genap(id_mk_genap),
    kelas TEXT NOT NULL,
    PRIMARY KEY (id_dosen, id_mk_genap)
);

CREATE INDEX IF NOT EXISTS idx_data_dosen_course
    ON tbl_data_dosen(id_mk_genap, kelas);
"#;

/// SQLite-based assignment store.
pub struct SqliteStore {
  conn: Mutex<Connection>,
}

impl SqliteStore {
  /// Open or create the database at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).map_err(|e| {
        Error::Validation(format!(
          "cannot create database directory {}: {}",
          parent.display(),
          e
        ))
      })?;
    }

    Self::from_connection(Connection::open(path)?)
  }

  /// A private database that lives as long as the store.
  pub fn open_in_memory() -> Result<Self> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self> {
    conn.execute_batch(SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  // Statements run one at a time with no open transaction between them,
  // so a poisoned connection is still consistent.
  fn conn(&self) -> MutexGuard<'_, Connection> {
    self
      .conn
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn insert_lecturer(&self, lecturer: &Lecturer) -> Result<()> {
    self.conn().execute(
      "INSERT INTO tbl_dosen (id_dosen, nama_dosen) VALUES (?1, ?2)",
      params![lecturer.id_dosen, lecturer.nama_dosen],
    )?;
    Ok(())
  }

  pub fn insert_course(&self, course: &Course) -> Result<()> {
    self.conn().execute(
      "INSERT INTO tbl_mk_genap (id_mk_genap, nama_mk_genap, smt, sks, sifat, kategori, metode)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
      params![
        course.id_mk_genap,
        course.nama_mk_genap,
        course.smt,
        course.sks,
        course.sifat,
        course.kategori,
        course.metode
      ],
    )?;
    Ok(())
  }

  /// Lecturers with the sections they teach, ordered by lecturer id.
  ///
  /// Lecturers without any section are included with an empty list.
  pub fn lecturers(&self) -> Result<Vec<LecturerLoad>> {
    let conn = self.conn();
    let mut stmt = conn.prepare(
      "SELECT d.id_dosen, d.nama_dosen, dd.id_mk_genap, mk.nama_mk_genap, dd.kelas
       FROM tbl_dosen d
       LEFT JOIN tbl_data_dosen dd ON dd.id_dosen = d.id_dosen
       LEFT JOIN tbl_mk_genap mk ON mk.id_mk_genap = dd.id_mk_genap
       ORDER BY d.id_dosen ASC, dd.id_mk_genap ASC",
    )?;

    let rows = stmt.query_map([], |row| {
      Ok((
        row.get::<_, i64>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, Option<i64>>(2)?,
        row.get::<_, Option<String>>(3)?,
        row.get::<_, Option<String>>(4)?,
      ))
    })?;

    let mut loads: Vec<LecturerLoad> = Vec::new();
    for row in rows {
      let (id_dosen, nama_dosen, id_mk_genap, nama_mk_genap, kelas) = row?;

      if loads.last().map(|l| l.id_dosen) != Some(id_dosen) {
        loads.push(LecturerLoad {
          id_dosen,
          nama_dosen,
          sections: Vec::new(),
        });
      }

      if let (Some(id_mk_genap), Some(kelas), Some(load)) = (id_mk_genap, kelas, loads.last_mut()) {
        load.sections.push(Section {
          id_mk_genap,
          nama_mk_genap: nama_mk_genap.unwrap_or_default(),
          kelas,
        });
      }
    }

    Ok(loads)
  }
}

impl AssignmentStore for SqliteStore {
  async fn list(&self) -> Result<Vec<Assignment>> {
    let conn = self.conn();
    let mut stmt = conn.prepare(
      "SELECT id_dosen, id_mk_genap, kelas FROM tbl_data_dosen
       ORDER BY id_dosen ASC, id_mk_genap ASC",
    )?;

    let assignments = stmt
      .query_map([], |row| {
        Ok(Assignment {
          id_dosen: row.get(0)?,
          id_mk_genap: row.get(1)?,
          kelas: row.get(2)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(assignments)
  }

  async fn exists(&self, key: AssignmentKey) -> Result<bool> {
    let exists = self.conn().query_row(
      "SELECT EXISTS(SELECT 1 FROM tbl_data_dosen WHERE id_dosen = ?1 AND id_mk_genap = ?2)",
      params![key.id_dosen, key.id_mk_genap],
      |row| row.get(0),
    )?;
    Ok(exists)
  }

  async fn last_label(&self, id_mk_genap: i64) -> Result<Option<ClassLabel>> {
    let kelas: Option<String> = self
      .conn()
      .query_row(
        "SELECT kelas FROM tbl_data_dosen WHERE id_mk_genap = ?1
         ORDER BY kelas DESC LIMIT 1",
        params![id_mk_genap],
        |row| row.get(0),
      )
      .optional()?;

    kelas.as_deref().map(ClassLabel::parse).transpose()
  }

  async fn insert(&self, assignment: &Assignment) -> Result<()> {
    let result = self.conn().execute(
      "INSERT INTO tbl_data_dosen (id_dosen, id_mk_genap, kelas) VALUES (?1, ?2, ?3)",
      params![assignment.id_dosen, assignment.id_mk_genap, assignment.kelas],
    );

    match result {
      Ok(_) => Ok(()),
      Err(rusqlite::Error::SqliteFailure(err, _))
        if err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
      {
        Err(Error::Duplicate {
          id_dosen: assignment.id_dosen,
          id_mk_genap: assignment.id_mk_genap,
        })
      }
      Err(rusqlite::Error::SqliteFailure(err, _))
        if err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
      {
        Err(Error::Validation(format!(
          "unknown {}",
          assignment.key()
        )))
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn delete(&self, key: AssignmentKey) -> Result<()> {
    let deleted = self.conn().execute(
      "DELETE FROM tbl_data_dosen WHERE id_dosen = ?1 AND id_mk_genap = ?2",
      params![key.id_dosen, key.id_mk_genap],
    )?;

    if deleted == 0 {
      return Err(Error::NotFound(key.to_string()));
    }
    Ok(())
  }
}
