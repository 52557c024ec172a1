use xmltree::Element;

use super::AccessSpec;
use crate::{
  error::IpxactResult,
  parameter::ParameterSpec,
  value::{
    EnumeratedValueSpec, ModifiedWriteValueSpec, ReadActionSpec, WriteValueConstraintSpec,
  },
  xml::{attribute, child, child_text, children, parse_root},
};

/// The value a field takes on a reset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldResetSpec {
  /// Name of the reset type this value applies to. Empty means the default reset type.
  pub reset_type_reference: String,

  /// The value of the field after the reset.
  pub reset_value: String,

  /// The bits of the field that have a defined reset value.
  pub reset_mask: String,
}
impl FieldResetSpec {
  pub fn new(reset_type_reference: &str, reset_value: &str, reset_mask: &str) -> Self {
    Self {
      reset_type_reference: reset_type_reference.to_owned(),
      reset_value: reset_value.to_owned(),
      reset_mask: reset_mask.to_owned(),
    }
  }

  /// Whether this reset applies to the default reset type.
  pub fn is_default(&self) -> bool {
    self.reset_type_reference.is_empty()
  }

  pub(crate) fn from_element(el: &Element) -> Self {
    Self {
      reset_type_reference: attribute(el, "resetTypeRef").unwrap_or_default(),
      reset_value: child_text(el, "value"),
      reset_mask: child_text(el, "mask"),
    }
  }
}

/// Describes a field on a register.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldSpec {
  /// A name that identfies the field. Must be unique within the parent register.
  pub name: String,

  /// Description of the field's usage, purpose, and/or operation.
  pub description: Option<String>,

  /// Expression deciding whether the field exists. Empty means it does.
  pub is_present: String,

  /// Expression for the position of the least-significant bit of this field within its register.
  pub bit_offset: String,

  /// Expression for the bit width of the field.
  pub bit_width: String,

  /// Expression flagging the field as reserved. Empty means not specified.
  pub reserved: String,

  /// The access rights to the field.
  pub access: AccessSpec,

  /// Describes the manipulation of data written to this field.
  pub modified_write: ModifiedWriteValueSpec,

  /// Describes the side effect of reading this field.
  pub read_action: ReadActionSpec,

  pub resets: Vec<FieldResetSpec>,

  pub enumerated_values: Vec<EnumeratedValueSpec>,

  pub parameters: Vec<ParameterSpec>,

  /// Constraints for writing values to the field.
  pub write_constraint: Option<WriteValueConstraintSpec>,
}
impl FieldSpec {
  pub fn new(name: &str, bit_offset: &str, bit_width: &str) -> Self {
    Self {
      name: name.to_owned(),
      bit_offset: bit_offset.to_owned(),
      bit_width: bit_width.to_owned(),
      ..Default::default()
    }
  }

  /// Reads a field from an `ipxact:field` element.
  pub fn from_xml(xml: &str) -> IpxactResult<Self> {
    Ok(Self::from_element(&parse_root(xml, "field")?))
  }

  pub(crate) fn from_element(el: &Element) -> Self {
    Self {
      name: child_text(el, "name"),
      description: child(el, "description").map(|_| child_text(el, "description")),
      is_present: child_text(el, "isPresent"),
      bit_offset: child_text(el, "bitOffset"),
      bit_width: child_text(el, "bitWidth"),
      reserved: child_text(el, "reserved"),
      access: AccessSpec::new(&child_text(el, "access")),
      modified_write: ModifiedWriteValueSpec::new(&child_text(el, "modifiedWriteValue")),
      read_action: ReadActionSpec::new(&child_text(el, "readAction")),
      resets: children(el, "resets", "reset")
        .into_iter()
        .map(FieldResetSpec::from_element)
        .collect(),
      enumerated_values: children(el, "enumeratedValues", "enumeratedValue")
        .into_iter()
        .map(EnumeratedValueSpec::from_element)
        .collect(),
      parameters: children(el, "parameters", "parameter")
        .into_iter()
        .map(ParameterSpec::from_element)
        .collect(),
      write_constraint: child(el, "writeValueConstraint")
        .map(WriteValueConstraintSpec::from_element),
    }
  }

  /// The enumerated values that software may write, if any.
  pub fn writable_enumerated_values(&self) -> impl Iterator<Item = &EnumeratedValueSpec> {
    self
      .enumerated_values
      .iter()
      .filter(|ev| ev.usage.can_write())
  }
}

#[cfg(test)]
mod tests {
  use super::{FieldResetSpec, FieldSpec};
  use crate::{
    value::{
      EnumeratedValueUsageSpec, ModifiedWriteValueSpec, ReadActionSpec, WriteValueConstraintSpec,
    },
    AccessSpec,
  };

  #[test]
  fn can_create_from_xml() {
    let fs = FieldSpec::from_xml(
      r##"
      <ipxact:field xmlns:ipxact="http://www.accellera.org/XMLSchema/IPXACT/1685-2014">
        <ipxact:name>FOO</ipxact:name>
        <ipxact:description>Bar</ipxact:description>
        <ipxact:isPresent>1</ipxact:isPresent>
        <ipxact:bitOffset>2</ipxact:bitOffset>
        <ipxact:resets>
          <ipxact:reset>
            <ipxact:value>4'b0000</ipxact:value>
          </ipxact:reset>
          <ipxact:reset resetTypeRef="soft">
            <ipxact:value>4'b0101</ipxact:value>
            <ipxact:mask>4'b1111</ipxact:mask>
          </ipxact:reset>
        </ipxact:resets>
        <ipxact:bitWidth>4</ipxact:bitWidth>
        <ipxact:access>write-only</ipxact:access>
        <ipxact:enumeratedValues>
          <ipxact:enumeratedValue usage="read">
            <ipxact:name>IDLE</ipxact:name>
            <ipxact:value>0</ipxact:value>
          </ipxact:enumeratedValue>
          <ipxact:enumeratedValue>
            <ipxact:name>BUSY</ipxact:name>
            <ipxact:value>1</ipxact:value>
          </ipxact:enumeratedValue>
        </ipxact:enumeratedValues>
        <ipxact:modifiedWriteValue>zeroToToggle</ipxact:modifiedWriteValue>
        <ipxact:writeValueConstraint>
          <ipxact:minimum>2</ipxact:minimum>
          <ipxact:maximum>4</ipxact:maximum>
        </ipxact:writeValueConstraint>
        <ipxact:readAction>clear</ipxact:readAction>
        <ipxact:reserved>0</ipxact:reserved>
        <ipxact:parameters>
          <ipxact:parameter parameterId="ID_mode">
            <ipxact:name>MODE</ipxact:name>
            <ipxact:value>3</ipxact:value>
          </ipxact:parameter>
        </ipxact:parameters>
      </ipxact:field>
      "##,
    )
    .unwrap();

    assert_eq!("FOO", fs.name);
    assert_eq!("Bar", fs.description.clone().unwrap());
    assert_eq!("1", fs.is_present);
    assert_eq!("2", fs.bit_offset);
    assert_eq!("4", fs.bit_width);
    assert_eq!("0", fs.reserved);
    assert_eq!(AccessSpec::WriteOnly, fs.access);
    assert_eq!(ModifiedWriteValueSpec::ZeroToToggle, fs.modified_write);
    assert_eq!(ReadActionSpec::Clear, fs.read_action);
    assert_eq!(
      vec![
        FieldResetSpec::new("", "4'b0000", ""),
        FieldResetSpec::new("soft", "4'b0101", "4'b1111"),
      ],
      fs.resets
    );
    assert_eq!(2, fs.enumerated_values.len());
    assert_eq!(EnumeratedValueUsageSpec::Read, fs.enumerated_values[0].usage);
    assert_eq!(EnumeratedValueUsageSpec::ReadWrite, fs.enumerated_values[1].usage);
    assert_eq!("ID_mode", fs.parameters[0].id);
    assert_eq!(
      WriteValueConstraintSpec::min_max("2", "4"),
      fs.write_constraint.clone().unwrap()
    );
  }

  #[test]
  fn missing_elements_are_left_unspecified() {
    let fs = FieldSpec::from_xml("<field><name>FOO</name></field>").unwrap();

    assert_eq!("FOO", fs.name);
    assert_eq!("", fs.bit_width);
    assert_eq!(AccessSpec::Unspecified, fs.access);
    assert_eq!(ModifiedWriteValueSpec::Unset, fs.modified_write);
    assert!(fs.resets.is_empty());
    assert!(fs.write_constraint.is_none());
  }

  #[test]
  fn rejects_non_field_xml() {
    assert!(FieldSpec::from_xml("<register><name>FOO</name></register>").is_err());
  }

  #[test]
  fn finds_writable_values() {
    let fs = FieldSpec::from_xml(
      r##"
      <field>
        <name>FOO</name>
        <enumeratedValues>
          <enumeratedValue usage="read"><name>A</name><value>0</value></enumeratedValue>
          <enumeratedValue usage="write"><name>B</name><value>1</value></enumeratedValue>
        </enumeratedValues>
      </field>
      "##,
    )
    .unwrap();

    assert_eq!(
      vec!["B"],
      fs.writable_enumerated_values()
        .map(|ev| ev.name.as_str())
        .collect::<Vec<&str>>()
    );
  }
}
