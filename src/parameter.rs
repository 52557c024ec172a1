use std::collections::HashMap;
use xmltree::Element;

use crate::{
  expression::{ExpressionParser, SymbolTable},
  is_valid_is_present, is_valid_name,
  xml::{attribute, child, child_text},
  Validator,
};

/// Value types a parameter may declare.
const VALUE_TYPES: [&str; 8] = [
  "bit", "byte", "shortint", "int", "longint", "shortreal", "real", "string",
];

/// A named value that expressions elsewhere in the document may refer to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSpec {
  /// Unique identifier used by expressions to refer to the parameter. If empty, expressions
  /// refer to the parameter by name.
  pub id: String,

  pub name: String,

  pub display_name: Option<String>,

  pub description: Option<String>,

  /// The value expression.
  pub value: String,

  /// Smallest allowed value, if bounded.
  pub minimum: String,

  /// Largest allowed value, if bounded.
  pub maximum: String,

  pub value_type: String,

  pub is_present: String,
}
impl ParameterSpec {
  pub fn new(name: &str, value: &str) -> Self {
    Self {
      name: name.to_owned(),
      value: value.to_owned(),
      ..Default::default()
    }
  }

  pub(crate) fn from_element(el: &Element) -> Self {
    Self {
      id: attribute(el, "parameterId").unwrap_or_default(),
      name: child_text(el, "name"),
      display_name: child(el, "displayName").map(|_| child_text(el, "displayName")),
      description: child(el, "description").map(|_| child_text(el, "description")),
      value: child_text(el, "value"),
      minimum: attribute(el, "minimum").unwrap_or_default(),
      maximum: attribute(el, "maximum").unwrap_or_default(),
      value_type: attribute(el, "type").unwrap_or_default(),
      is_present: child_text(el, "isPresent"),
    }
  }
}

/// Resolves parameter references by ID or by name.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
  values: HashMap<String, String>,
  names: HashMap<String, String>,
}
impl ParameterTable {
  pub fn new<'a, I>(parameters: I) -> Self
  where
    I: IntoIterator<Item = &'a ParameterSpec>,
  {
    let mut table = Self::default();
    for p in parameters {
      table.insert(p);
    }
    table
  }

  /// Adds `parameter`, replacing any parameter with the same ID or name.
  pub fn insert(&mut self, parameter: &ParameterSpec) {
    if !parameter.id.is_empty() {
      self
        .values
        .insert(parameter.id.clone(), parameter.value.clone());
      self
        .names
        .insert(parameter.id.clone(), parameter.name.clone());
    }
    self
      .values
      .insert(parameter.name.clone(), parameter.value.clone());
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}
impl SymbolTable for ParameterTable {
  fn value_of(&self, reference: &str) -> Option<String> {
    self.values.get(reference).cloned()
  }

  fn display_name_of(&self, reference: &str) -> Option<String> {
    self.names.get(reference).cloned()
  }
}

/// Checks parameters for a usable name, a value that evaluates, and a value within bounds.
#[derive(Clone)]
pub struct ParameterValidator {
  expression_parser: ExpressionParser,
}
impl ParameterValidator {
  pub fn new(expression_parser: ExpressionParser) -> Self {
    Self { expression_parser }
  }

  pub fn has_valid_name(&self, parameter: &ParameterSpec) -> bool {
    is_valid_name(&parameter.name)
  }

  pub fn has_valid_value(&self, parameter: &ParameterSpec) -> bool {
    self.expression_parser.is_valid_expression(&parameter.value)
  }

  pub fn has_valid_is_present(&self, parameter: &ParameterSpec) -> bool {
    is_valid_is_present(&self.expression_parser, &parameter.is_present)
  }

  pub fn has_valid_type(&self, parameter: &ParameterSpec) -> bool {
    parameter.value_type.is_empty() || VALUE_TYPES.contains(&parameter.value_type.as_str())
  }

  /// Whether the bounds evaluate. Absent bounds are valid.
  pub fn has_valid_bounds(&self, parameter: &ParameterSpec) -> bool {
    (parameter.minimum.is_empty() || self.expression_parser.is_valid_expression(&parameter.minimum))
      && (parameter.maximum.is_empty()
        || self.expression_parser.is_valid_expression(&parameter.maximum))
  }

  /// Whether the value lies within the bounds. Bounds or values that do not evaluate are
  /// reported by the other checks, so they do not fail this one.
  pub fn value_is_within_bounds(&self, parameter: &ParameterSpec) -> bool {
    let value = match self.expression_parser.value_of(&parameter.value) {
      Some(v) => v,
      None => return true,
    };

    let above_minimum = self
      .expression_parser
      .value_of(&parameter.minimum)
      .map_or(true, |minimum| value >= minimum);
    let below_maximum = self
      .expression_parser
      .value_of(&parameter.maximum)
      .map_or(true, |maximum| value <= maximum);

    above_minimum && below_maximum
  }
}
impl Validator<ParameterSpec> for ParameterValidator {
  fn validate(&self, parameter: &ParameterSpec) -> bool {
    self.has_valid_name(parameter)
      && self.has_valid_value(parameter)
      && self.has_valid_is_present(parameter)
      && self.has_valid_type(parameter)
      && self.has_valid_bounds(parameter)
      && self.value_is_within_bounds(parameter)
  }

  fn find_errors_in(&self, errors: &mut Vec<String>, parameter: &ParameterSpec, context: &str) {
    if !self.has_valid_name(parameter) {
      errors.push(format!(
        "No valid name specified for parameter {} within {}",
        parameter.name, context
      ));
    }

    if !self.has_valid_value(parameter) {
      errors.push(format!(
        "Invalid value '{}' set for parameter {} within {}",
        parameter.value, parameter.name, context
      ));
    }

    if !self.has_valid_is_present(parameter) {
      errors.push(format!(
        "Invalid isPresent value specified for parameter {} within {}. Value should evaluate to 0 or 1.",
        parameter.name, context
      ));
    }

    if !self.has_valid_type(parameter) {
      errors.push(format!(
        "Invalid type '{}' set for parameter {} within {}",
        parameter.value_type, parameter.name, context
      ));
    }

    if !self.has_valid_bounds(parameter) {
      errors.push(format!(
        "Invalid minimum or maximum set for parameter {} within {}",
        parameter.name, context
      ));
    }

    if !self.value_is_within_bounds(parameter) {
      errors.push(format!(
        "Value of parameter {} within {} is outside its minimum and maximum",
        parameter.name, context
      ));
    }
  }
}
