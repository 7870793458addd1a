use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A course section label: one uppercase ASCII letter, `A` through `Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassLabel(u8);

impl ClassLabel {
  pub const FIRST: ClassLabel = ClassLabel(b'A');
  pub const LAST: ClassLabel = ClassLabel(b'Z');

  pub fn parse(s: &str) -> Result<Self> {
    match s.as_bytes() {
      [b] if b.is_ascii_uppercase() => Ok(ClassLabel(*b)),
      _ => Err(Error::Validation(format!(
        "class label must be a single letter A-Z, got '{}'",
        s
      ))),
    }
  }

  /// The following letter, or `None` after `Z`.
  pub fn next(self) -> Option<Self> {
    (self < Self::LAST).then(|| ClassLabel(self.0 + 1))
  }

  pub fn as_char(self) -> char {
    self.0 as char
  }
}

impl fmt::Display for ClassLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_char())
  }
}

impl FromStr for ClassLabel {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::parse(s)
  }
}

/// Label for the next section of a course, given the highest label in use.
pub fn next_label(last: Option<ClassLabel>, id_mk_genap: i64) -> Result<ClassLabel> {
  match last {
    None => Ok(ClassLabel::FIRST),
    Some(label) => label
      .next()
      .ok_or(Error::CapacityExceeded { id_mk_genap }),
  }
}
