use log::debug;
use regex::Regex;
use std::{collections::HashSet, sync::Arc};

use crate::{
  component::ComponentSpec,
  enumerated_value_validator::EnumeratedValueValidator,
  error::IpxactResult,
  expression::ExpressionParser,
  field::{FieldResetSpec, FieldSpec},
  is_valid_is_present, is_valid_name,
  parameter::{ParameterSpec, ParameterValidator},
  value::{
    EnumeratedValueSpec, ModifiedWriteValueSpec, ReadActionSpec, WriteValueConstraintType,
  },
  AccessSpec, Validator,
};

/// Plain decimal digits, or a sized binary or hexadecimal literal such as `8'hFF`.
const BIT_EXPRESSION: &str = r"^([0-9]+|[1-9]+[0-9]*'([bB][01_]+|[hH][0-9a-fA-F_]+))$";

/// Validates fields against the rules of IP-XACT.
///
/// Expressions are evaluated with the given `ExpressionParser`, and each enumerated value and
/// parameter of a field is handed to its own validator. Reset type references are checked
/// against the reset types of the component most recently passed to `component_change`.
pub struct FieldValidator {
  expression_parser: ExpressionParser,
  enumerated_value_validator: Arc<dyn Validator<EnumeratedValueSpec> + Send + Sync>,
  parameter_validator: Arc<dyn Validator<ParameterSpec> + Send + Sync>,
  available_reset_types: Vec<String>,
  bit_expression: Regex,
}
impl FieldValidator {
  pub fn new(
    expression_parser: ExpressionParser,
    enumerated_value_validator: Arc<dyn Validator<EnumeratedValueSpec> + Send + Sync>,
    parameter_validator: Arc<dyn Validator<ParameterSpec> + Send + Sync>,
  ) -> IpxactResult<Self> {
    Ok(Self {
      expression_parser,
      enumerated_value_validator,
      parameter_validator,
      available_reset_types: Vec::new(),
      bit_expression: Regex::new(BIT_EXPRESSION)?,
    })
  }

  /// A validator that checks enumerated values and parameters with the validators of this
  /// crate, sharing `expression_parser` with them.
  pub fn with_default_validators(expression_parser: ExpressionParser) -> IpxactResult<Self> {
    let enumerated_value_validator =
      Arc::new(EnumeratedValueValidator::new(expression_parser.clone()));
    let parameter_validator = Arc::new(ParameterValidator::new(expression_parser.clone()));

    Self::new(
      expression_parser,
      enumerated_value_validator,
      parameter_validator,
    )
  }

  /// Replaces the available reset types with those of `component`. Passing `None` leaves no
  /// reset types available.
  pub fn component_change(&mut self, component: Option<&ComponentSpec>) {
    self.available_reset_types = match component {
      Some(c) => c.reset_type_names(),
      None => Vec::new(),
    };
  }

  pub fn enumerated_value_validator(
    &self,
  ) -> Arc<dyn Validator<EnumeratedValueSpec> + Send + Sync> {
    self.enumerated_value_validator.clone()
  }

  pub fn has_valid_name(&self, field: &FieldSpec) -> bool {
    is_valid_name(&field.name)
  }

  pub fn has_valid_is_present(&self, field: &FieldSpec) -> bool {
    is_valid_is_present(&self.expression_parser, &field.is_present)
  }

  pub fn has_valid_bit_offset(&self, field: &FieldSpec) -> bool {
    let (solved, _) = self.expression_parser.parse_expression(&field.bit_offset);
    solved.parse::<u64>().is_ok()
  }

  pub fn has_valid_resets(&self, field: &FieldSpec) -> bool {
    self.has_single_default_reset(field)
      && field.resets.iter().all(|reset| {
        self.has_valid_reset_value(reset)
          && self.has_valid_reset_mask(reset)
          && self.has_valid_reset_type_reference(reset)
      })
  }

  /// At most one reset may apply to the default reset type.
  pub fn has_single_default_reset(&self, field: &FieldSpec) -> bool {
    field.resets.iter().filter(|r| r.is_default()).count() <= 1
  }

  pub fn has_valid_reset_type_reference(&self, reset: &FieldResetSpec) -> bool {
    reset.is_default()
      || self
        .available_reset_types
        .iter()
        .any(|name| *name == reset.reset_type_reference)
  }

  /// A reset without a value may not refer to a reset type or have a mask.
  pub fn has_valid_reset_value(&self, reset: &FieldResetSpec) -> bool {
    if !reset.reset_value.is_empty() {
      self.is_bit_expression_valid(&reset.reset_value)
    } else {
      reset.reset_type_reference.is_empty() && reset.reset_mask.is_empty()
    }
  }

  pub fn has_valid_reset_mask(&self, reset: &FieldResetSpec) -> bool {
    reset.reset_mask.is_empty() || self.is_bit_expression_valid(&reset.reset_mask)
  }

  pub fn has_valid_write_value_constraint(&self, field: &FieldSpec) -> bool {
    let constraint = match field.write_constraint {
      Some(ref c) => c,
      None => return true,
    };

    match constraint.kind {
      WriteValueConstraintType::Unset => false,
      WriteValueConstraintType::MinMax => {
        !constraint.minimum.is_empty()
          && !constraint.maximum.is_empty()
          && self.is_bit_expression_valid(&constraint.minimum)
          && self.is_bit_expression_valid(&constraint.maximum)
          && self.bound_value(&constraint.minimum) <= self.bound_value(&constraint.maximum)
      }
      _ => true,
    }
  }

  /// An empty reserved expression is valid. Otherwise the evaluation must succeed and result
  /// in 0 or 1.
  pub fn has_valid_reserved(&self, field: &FieldSpec) -> bool {
    if field.reserved.is_empty() {
      return true;
    }

    let (solved, evaluated) = self.expression_parser.parse_expression(&field.reserved);
    match solved.parse::<i32>() {
      Ok(value) => evaluated && (value == 0 || value == 1),
      Err(_) => false,
    }
  }

  pub fn has_valid_bit_width(&self, field: &FieldSpec) -> bool {
    let (solved, _) = self.expression_parser.parse_expression(&field.bit_width);
    match solved.parse::<u64>() {
      Ok(width) => width > 0,
      Err(_) => false,
    }
  }

  pub fn has_valid_enumerated_values(&self, field: &FieldSpec) -> bool {
    let mut names = HashSet::new();
    for enumerated_value in field.enumerated_values.iter() {
      if !self.enumerated_value_validator.validate(enumerated_value)
        || !names.insert(enumerated_value.name.as_str())
      {
        return false;
      }
    }

    !uses_enumerated_values(field) || field.writable_enumerated_values().next().is_some()
  }

  pub fn has_valid_parameters(&self, field: &FieldSpec) -> bool {
    let mut names = HashSet::new();
    field
      .parameters
      .iter()
      .all(|p| names.insert(p.name.as_str()) && self.parameter_validator.validate(p))
  }

  /// Read-only fields may not modify written values, and write-only or write-once fields may
  /// not have a read action.
  pub fn has_valid_access(&self, field: &FieldSpec) -> bool {
    (field.access.can_write() || field.modified_write == ModifiedWriteValueSpec::Unset)
      && (field.access.can_read() || field.read_action == ReadActionSpec::Unset)
  }

  /// Whether `expression`, or the value it evaluates to, is a plain decimal or a sized binary
  /// or hexadecimal literal.
  pub fn is_bit_expression_valid(&self, expression: &str) -> bool {
    let (solved, _) = self.expression_parser.parse_expression(expression);
    self.bit_expression.is_match(expression) || self.bit_expression.is_match(&solved)
  }

  fn bound_value(&self, expression: &str) -> u64 {
    self.expression_parser.value_of(expression).unwrap_or(0)
  }

  fn find_errors_in_resets(&self, errors: &mut Vec<String>, field: &FieldSpec, context: &str) {
    let reset_context = format!("field {} in {}", field.name, context);

    if !self.has_single_default_reset(field) {
      errors.push(format!(
        "Multiple references to default reset type in {}.",
        reset_context
      ));
    }

    for reset in field.resets.iter() {
      if !self.has_valid_reset_type_reference(reset) {
        errors.push(format!(
          "Reset type '{}' referenced in {} does not exist.",
          reset.reset_type_reference, reset_context
        ));
      }

      if !self.has_valid_reset_value(reset) {
        errors.push(format!("Invalid reset value set within {}", reset_context));
      }

      if !self.has_valid_reset_mask(reset) {
        errors.push(format!("Invalid reset mask set within {}", reset_context));
      }
    }
  }

  fn find_errors_in_write_value_constraint(
    &self,
    errors: &mut Vec<String>,
    field: &FieldSpec,
    context: &str,
  ) {
    if self.has_valid_write_value_constraint(field) {
      return;
    }

    let constraint = match field.write_constraint {
      Some(ref c) => c,
      None => return,
    };

    if constraint.kind == WriteValueConstraintType::Unset {
      errors.push(format!(
        "Invalid write value constraint set for field {} within {}",
        field.name, context
      ));
      return;
    }

    let minimum_is_valid = self.is_bit_expression_valid(&constraint.minimum);
    let maximum_is_valid = self.is_bit_expression_valid(&constraint.maximum);

    if !minimum_is_valid {
      errors.push(format!(
        "Invalid minimum value set for write value constraint in field {} within {}",
        field.name, context
      ));
    }

    if !maximum_is_valid {
      errors.push(format!(
        "Invalid maximum value set for write value constraint in field {} within {}",
        field.name, context
      ));
    }

    if minimum_is_valid
      && maximum_is_valid
      && self.bound_value(&constraint.minimum) > self.bound_value(&constraint.maximum)
    {
      errors.push(format!(
        "Maximum value must be greater than or equal to the minimum value in write value constraint set for field {} within {}",
        field.name, context
      ));
    }
  }

  fn find_errors_in_enumerated_values(
    &self,
    errors: &mut Vec<String>,
    field: &FieldSpec,
    context: &str,
  ) {
    let enumeration_context = format!("field {} within {}", field.name, context);

    let mut names = HashSet::new();
    for enumerated_value in field.enumerated_values.iter() {
      self
        .enumerated_value_validator
        .find_errors_in(errors, enumerated_value, &enumeration_context);

      if !names.insert(enumerated_value.name.as_str()) {
        errors.push(format!(
          "Name {} of enumerated values in {} is not unique.",
          enumerated_value.name, enumeration_context
        ));
      }
    }

    if uses_enumerated_values(field) && field.writable_enumerated_values().next().is_none() {
      errors.push(format!(
        "Write value constraint of Use enumerated values needs an enumerated value with usage of write or read-write. Such an enumerated value was not found in {}",
        enumeration_context
      ));
    }
  }

  fn find_errors_in_parameters(&self, errors: &mut Vec<String>, field: &FieldSpec, context: &str) {
    if self.has_valid_parameters(field) {
      return;
    }

    let parameter_context = format!("field {} within {}", field.name, context);

    let mut names = HashSet::new();
    for parameter in field.parameters.iter() {
      self
        .parameter_validator
        .find_errors_in(errors, parameter, &parameter_context);

      if !names.insert(parameter.name.as_str()) {
        errors.push(format!(
          "Name {} of parameters in {} is not unique.",
          parameter.name, parameter_context
        ));
      }
    }
  }

  fn find_errors_in_access(&self, errors: &mut Vec<String>, field: &FieldSpec, context: &str) {
    if self.has_valid_access(field) {
      return;
    }

    if field.access == AccessSpec::ReadOnly {
      errors.push(format!(
        "In field {} within {}, access type readOnly does not allow a field to include a modified write value.",
        field.name, context
      ));
    } else {
      errors.push(format!(
        "In field {} within {}, access type write only and write once do not allow a field to include a read action value.",
        field.name, context
      ));
    }
  }
}
impl Validator<FieldSpec> for FieldValidator {
  fn validate(&self, field: &FieldSpec) -> bool {
    let checks = [
      ("name", self.has_valid_name(field)),
      ("isPresent", self.has_valid_is_present(field)),
      ("bit offset", self.has_valid_bit_offset(field)),
      ("resets", self.has_valid_resets(field)),
      ("write value constraint", self.has_valid_write_value_constraint(field)),
      ("reserved", self.has_valid_reserved(field)),
      ("bit width", self.has_valid_bit_width(field)),
      ("enumerated values", self.has_valid_enumerated_values(field)),
      ("parameters", self.has_valid_parameters(field)),
      ("access", self.has_valid_access(field)),
    ];

    for (rule, _) in checks.iter().filter(|(_, valid)| !valid) {
      debug!("Field '{}' failed the {} check", field.name, rule);
    }

    checks.iter().all(|(_, valid)| *valid)
  }

  fn find_errors_in(&self, errors: &mut Vec<String>, field: &FieldSpec, context: &str) {
    if !self.has_valid_name(field) {
      errors.push(format!(
        "Invalid name specified for {} within {}",
        field.name, context
      ));
    }

    if !self.has_valid_is_present(field) {
      errors.push(format!(
        "Invalid isPresent value specified for {} within {}. Value should evaluate to 0 or 1.",
        field.name, context
      ));
    }

    if !self.has_valid_bit_offset(field) {
      errors.push(format!(
        "Invalid bit offset set for field {} within {}",
        field.name, context
      ));
    }

    self.find_errors_in_resets(errors, field, context);
    self.find_errors_in_write_value_constraint(errors, field, context);

    if !self.has_valid_reserved(field) {
      errors.push(format!(
        "Invalid reserved set for field {} within {}",
        field.name, context
      ));
    }

    if !self.has_valid_bit_width(field) {
      errors.push(format!(
        "Invalid bit width set for field {} within {}",
        field.name, context
      ));
    }

    self.find_errors_in_enumerated_values(errors, field, context);
    self.find_errors_in_parameters(errors, field, context);
    self.find_errors_in_access(errors, field, context);
  }
}

fn uses_enumerated_values(field: &FieldSpec) -> bool {
  match field.write_constraint {
    Some(ref c) => c.kind == WriteValueConstraintType::UseEnumeratedValues,
    None => false,
  }
}
