mod component;
mod enumerated_value_validator;
mod error;
mod expression;
mod field;
mod field_validator;
mod format;
mod parameter;
mod value;
mod xml;

pub use component::{ComponentSpec, RegisterSpec, ResetTypeSpec};
pub use enumerated_value_validator::EnumeratedValueValidator;
pub use error::{IpxactError, IpxactResult};
pub use expression::{
  evaluate, try_evaluate, EvaluationFailure, ExpressionParser, NoSymbols, SymbolTable,
  MAX_NESTING_DEPTH, MAX_REFERENCE_DEPTH, UNKNOWN_VALUE,
};
pub use field::{FieldResetSpec, FieldSpec};
pub use field_validator::FieldValidator;
pub use format::{ExpressionFormatter, ValueFormatter};
pub use parameter::{ParameterSpec, ParameterTable, ParameterValidator};
pub use value::{
  EnumeratedValueSpec, EnumeratedValueUsageSpec, ModifiedWriteValueSpec, ReadActionSpec,
  WriteValueConstraintSpec, WriteValueConstraintType,
};

/// A validator for one kind of document element.
pub trait Validator<T> {
  /// Whether `item` satisfies every rule.
  fn validate(&self, item: &T) -> bool;

  /// Appends a message to `errors` for every rule `item` violates. `context` describes where
  /// the item is located in the document.
  fn find_errors_in(&self, errors: &mut Vec<String>, item: &T, context: &str);
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AccessSpec {
  ReadOnly,
  ReadWrite,
  ReadWriteOnce,
  WriteOnce,
  WriteOnly,
  Unspecified,
}
impl AccessSpec {
  /// Reads an IP-XACT access keyword. Unknown keywords leave the access unspecified.
  pub fn new(access: &str) -> AccessSpec {
    match access.trim() {
      "read-only" => AccessSpec::ReadOnly,
      "read-write" => AccessSpec::ReadWrite,
      "read-writeOnce" => AccessSpec::ReadWriteOnce,
      "writeOnce" => AccessSpec::WriteOnce,
      "write-only" => AccessSpec::WriteOnly,
      "" => AccessSpec::Unspecified,
      other => {
        log::warn!("Unknown access type '{}'", other);
        AccessSpec::Unspecified
      }
    }
  }

  /// Whether the field may be read. Unspecified access places no restriction.
  pub fn can_read(&self) -> bool {
    match self {
      AccessSpec::WriteOnce | AccessSpec::WriteOnly => false,
      _ => true,
    }
  }

  /// Whether the field may be written. Unspecified access places no restriction.
  pub fn can_write(&self) -> bool {
    *self != AccessSpec::ReadOnly
  }
}
impl Default for AccessSpec {
  fn default() -> Self {
    AccessSpec::Unspecified
  }
}

/// Whether `name` is usable as an element name: not empty and not only whitespace.
pub(crate) fn is_valid_name(name: &str) -> bool {
  !name.trim().is_empty()
}

/// Whether an expression evaluates to 0 or 1. Empty expressions are valid.
pub(crate) fn is_valid_is_present(parser: &ExpressionParser, is_present: &str) -> bool {
  if is_present.is_empty() {
    return true;
  }

  let (solved, _) = parser.parse_expression(is_present);
  match solved.parse::<i32>() {
    Ok(value) => value == 0 || value == 1,
    Err(_) => false,
  }
}
