use crate::{
  expression::ExpressionParser, is_valid_is_present, is_valid_name, value::EnumeratedValueSpec,
  Validator,
};

/// Checks the enumerated values of a field.
#[derive(Clone)]
pub struct EnumeratedValueValidator {
  expression_parser: ExpressionParser,
}
impl EnumeratedValueValidator {
  pub fn new(expression_parser: ExpressionParser) -> Self {
    Self { expression_parser }
  }

  pub fn has_valid_name(&self, enumerated_value: &EnumeratedValueSpec) -> bool {
    is_valid_name(&enumerated_value.name)
  }

  pub fn has_valid_is_present(&self, enumerated_value: &EnumeratedValueSpec) -> bool {
    is_valid_is_present(&self.expression_parser, &enumerated_value.is_present)
  }

  /// The value is required and must evaluate.
  pub fn has_valid_value(&self, enumerated_value: &EnumeratedValueSpec) -> bool {
    self
      .expression_parser
      .is_valid_expression(&enumerated_value.value)
  }
}
impl Validator<EnumeratedValueSpec> for EnumeratedValueValidator {
  fn validate(&self, enumerated_value: &EnumeratedValueSpec) -> bool {
    self.has_valid_name(enumerated_value)
      && self.has_valid_is_present(enumerated_value)
      && self.has_valid_value(enumerated_value)
  }

  fn find_errors_in(
    &self,
    errors: &mut Vec<String>,
    enumerated_value: &EnumeratedValueSpec,
    context: &str,
  ) {
    if !self.has_valid_name(enumerated_value) {
      errors.push(format!(
        "Invalid name specified for enumerated value {} within {}",
        enumerated_value.name, context
      ));
    }

    if !self.has_valid_is_present(enumerated_value) {
      errors.push(format!(
        "Invalid isPresent value specified for enumerated value {} within {}. Value should evaluate to 0 or 1.",
        enumerated_value.name, context
      ));
    }

    if !self.has_valid_value(enumerated_value) {
      errors.push(format!(
        "Invalid value specified for enumerated value {} within {}",
        enumerated_value.name, context
      ));
    }
  }
}
