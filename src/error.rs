use anyhow::Error as AnyhowError;
use std::{error::Error, fmt};

/// Convenience type for a result that may contain an `IpxactError`.
pub type IpxactResult<T> = std::result::Result<T, IpxactError>;

/// Error struct for all errors thrown by this crate or the crates on which it depends.
#[derive(Debug)]
pub struct IpxactError {
  /// Description of the error that occurred.
  pub details: String,
}
impl IpxactError {
  pub(crate) fn new(msg: &str) -> IpxactError {
    Self {
      details: msg.to_string(),
    }
  }
}
impl fmt::Display for IpxactError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.details)
  }
}
impl Error for IpxactError {
  fn description(&self) -> &str {
    &self.details
  }
}
impl From<std::io::Error> for IpxactError {
  fn from(err: std::io::Error) -> Self {
    IpxactError::new(&format!("std::io::Error {}", &err.to_string()))
  }
}
impl From<std::num::ParseIntError> for IpxactError {
  fn from(err: std::num::ParseIntError) -> Self {
    IpxactError::new(&format!("std::num::ParseIntError {}", &err.to_string()))
  }
}
impl From<xmltree::ParseError> for IpxactError {
  fn from(err: xmltree::ParseError) -> Self {
    IpxactError::new(&format!("xmltree::ParseError {}", &err.to_string()))
  }
}
impl From<AnyhowError> for IpxactError {
  fn from(err: AnyhowError) -> Self {
    IpxactError::new(&format!("anyhow::Error {:?}", err))
  }
}
impl From<regex::Error> for IpxactError {
  fn from(err: regex::Error) -> Self {
    IpxactError::new(&format!("regex::Error {:?}", err))
  }
}
