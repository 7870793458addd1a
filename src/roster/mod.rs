//! Lecturer/course assignments ("data dosen").
//!
//! The controller keeps a client-side mirror of the assignment list and
//! derives the class label of each new section. Backends plug in through
//! [`AssignmentStore`]: the REST API or a local SQLite database.

mod controller;
mod label;
mod rest;
mod sqlite;
mod store;
mod types;

pub use controller::AssignmentController;
pub use label::{next_label, ClassLabel};
pub use rest::RestStore;
pub use sqlite::SqliteStore;
pub use store::AssignmentStore;
pub use types::{Assignment, AssignmentKey, Course, Lecturer, LecturerLoad, Section};
