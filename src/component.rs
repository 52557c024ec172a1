use xmltree::Element;

use super::field::FieldSpec;
use crate::{
  error::IpxactResult,
  parameter::{ParameterSpec, ParameterTable},
  xml::{child, child_text, children, elements, parse_root},
};

/// A named category of reset that field reset values may refer to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResetTypeSpec {
  pub name: String,
  pub display_name: Option<String>,
  pub description: Option<String>,
}
impl ResetTypeSpec {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_owned(),
      ..Default::default()
    }
  }

  pub(crate) fn from_element(el: &Element) -> Self {
    Self {
      name: child_text(el, "name"),
      display_name: child(el, "displayName").map(|_| child_text(el, "displayName")),
      description: child(el, "description").map(|_| child_text(el, "description")),
    }
  }
}

/// Describes a register and the fields that exist on it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegisterSpec {
  /// Name that identifies the register. Must be unique within its address block.
  pub name: String,

  /// The fields that exist on the register.
  pub fields: Vec<FieldSpec>,
}
impl RegisterSpec {
  pub(crate) fn from_element(el: &Element) -> Self {
    Self {
      name: child_text(el, "name"),
      fields: elements(el)
        .filter(|c| c.name == "field")
        .map(FieldSpec::from_element)
        .collect(),
    }
  }
}

/// The parts of a component that fields depend on: its reset types, its parameters, and its
/// registers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentSpec {
  pub name: String,
  pub reset_types: Vec<ResetTypeSpec>,
  pub parameters: Vec<ParameterSpec>,
  pub registers: Vec<RegisterSpec>,
}
impl ComponentSpec {
  /// Reads a component from an `ipxact:component` element. Registers are collected from every
  /// address block of every memory map.
  pub fn from_xml(xml: &str) -> IpxactResult<Self> {
    let el = parse_root(xml, "component")?;

    let registers = children(&el, "memoryMaps", "memoryMap")
      .into_iter()
      .flat_map(|mm| elements(mm).filter(|c| c.name == "addressBlock"))
      .flat_map(|ab| elements(ab).filter(|c| c.name == "register"))
      .map(RegisterSpec::from_element)
      .collect();

    Ok(Self {
      name: child_text(&el, "name"),
      reset_types: children(&el, "resetTypes", "resetType")
        .into_iter()
        .map(ResetTypeSpec::from_element)
        .collect(),
      parameters: children(&el, "parameters", "parameter")
        .into_iter()
        .map(ParameterSpec::from_element)
        .collect(),
      registers,
    })
  }

  /// Names of the reset types defined on this component.
  pub fn reset_type_names(&self) -> Vec<String> {
    self.reset_types.iter().map(|rt| rt.name.clone()).collect()
  }

  /// A symbol table holding this component's parameters.
  pub fn parameter_table(&self) -> ParameterTable {
    ParameterTable::new(&self.parameters)
  }

  /// Iterates all the fields of all the registers in this component, together with the name
  /// of the register holding them.
  pub fn iter_fields(&self) -> impl Iterator<Item = (&RegisterSpec, &FieldSpec)> {
    self
      .registers
      .iter()
      .flat_map(|r| r.fields.iter().map(move |f| (r, f)))
  }
}
