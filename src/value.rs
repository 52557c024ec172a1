use log::warn;
use xmltree::Element;

use crate::xml::{attribute, child, child_text};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModifiedWriteValueSpec {
  OneToClear,
  OneToSet,
  OneToToggle,
  ZeroToClear,
  ZeroToSet,
  ZeroToToggle,
  Clear,
  Set,
  Modify,
  Unset,
}
impl ModifiedWriteValueSpec {
  /// Reads an IP-XACT modified write value keyword. Unknown keywords leave the value unset.
  pub fn new(mwv: &str) -> Self {
    match mwv.trim() {
      "oneToClear" => ModifiedWriteValueSpec::OneToClear,
      "oneToSet" => ModifiedWriteValueSpec::OneToSet,
      "oneToToggle" => ModifiedWriteValueSpec::OneToToggle,

      "zeroToClear" => ModifiedWriteValueSpec::ZeroToClear,
      "zeroToSet" => ModifiedWriteValueSpec::ZeroToSet,
      "zeroToToggle" => ModifiedWriteValueSpec::ZeroToToggle,

      "clear" => ModifiedWriteValueSpec::Clear,
      "set" => ModifiedWriteValueSpec::Set,
      "modify" => ModifiedWriteValueSpec::Modify,

      "" => ModifiedWriteValueSpec::Unset,
      other => {
        warn!("Unknown modified write value '{}'", other);
        ModifiedWriteValueSpec::Unset
      }
    }
  }
}
impl Default for ModifiedWriteValueSpec {
  fn default() -> Self {
    ModifiedWriteValueSpec::Unset
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadActionSpec {
  Clear,
  Set,
  Modify,
  Unset,
}
impl ReadActionSpec {
  /// Reads an IP-XACT read action keyword. Unknown keywords leave the action unset.
  pub fn new(ra: &str) -> Self {
    match ra.trim() {
      "clear" => ReadActionSpec::Clear,
      "set" => ReadActionSpec::Set,
      "modify" => ReadActionSpec::Modify,
      "" => ReadActionSpec::Unset,
      other => {
        warn!("Unknown read action '{}'", other);
        ReadActionSpec::Unset
      }
    }
  }
}
impl Default for ReadActionSpec {
  fn default() -> Self {
    ReadActionSpec::Unset
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WriteValueConstraintType {
  WriteAsRead,
  UseEnumeratedValues,
  MinMax,
  Unset,
}

/// Restricts the values software may write to a field.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteValueConstraintSpec {
  pub kind: WriteValueConstraintType,

  /// Smallest writable value. Only meaningful for `MinMax` constraints.
  pub minimum: String,

  /// Largest writable value. Only meaningful for `MinMax` constraints.
  pub maximum: String,
}
impl WriteValueConstraintSpec {
  pub fn new(kind: WriteValueConstraintType) -> Self {
    Self {
      kind,
      minimum: String::new(),
      maximum: String::new(),
    }
  }

  pub fn min_max(minimum: &str, maximum: &str) -> Self {
    Self {
      kind: WriteValueConstraintType::MinMax,
      minimum: minimum.to_owned(),
      maximum: maximum.to_owned(),
    }
  }

  pub(crate) fn from_element(el: &Element) -> Self {
    let is_true = |name: &str| child_text(el, name).trim() == "true";

    if is_true("writeAsRead") {
      Self::new(WriteValueConstraintType::WriteAsRead)
    } else if is_true("useEnumeratedValues") {
      Self::new(WriteValueConstraintType::UseEnumeratedValues)
    } else if child(el, "minimum").is_some() || child(el, "maximum").is_some() {
      Self::min_max(&child_text(el, "minimum"), &child_text(el, "maximum"))
    } else {
      Self::new(WriteValueConstraintType::Unset)
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnumeratedValueUsageSpec {
  Read,
  Write,
  ReadWrite,
}
impl EnumeratedValueUsageSpec {
  pub fn new(u: &str) -> Self {
    match u.trim() {
      "read" => EnumeratedValueUsageSpec::Read,
      "write" => EnumeratedValueUsageSpec::Write,
      _ => EnumeratedValueUsageSpec::ReadWrite,
    }
  }

  pub fn can_write(&self) -> bool {
    match self {
      EnumeratedValueUsageSpec::Write | EnumeratedValueUsageSpec::ReadWrite => true,
      _ => false,
    }
  }
}
impl Default for EnumeratedValueUsageSpec {
  fn default() -> Self {
    EnumeratedValueUsageSpec::ReadWrite
  }
}

/// A named value of a field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumeratedValueSpec {
  pub name: String,
  pub display_name: Option<String>,
  pub description: Option<String>,
  pub is_present: String,
  pub value: String,
  pub usage: EnumeratedValueUsageSpec,
}
impl EnumeratedValueSpec {
  pub fn new(name: &str, value: &str, usage: EnumeratedValueUsageSpec) -> Self {
    Self {
      name: name.to_owned(),
      value: value.to_owned(),
      usage,
      ..Default::default()
    }
  }

  pub(crate) fn from_element(el: &Element) -> Self {
    Self {
      name: child_text(el, "name"),
      display_name: child(el, "displayName").map(|_| child_text(el, "displayName")),
      description: child(el, "description").map(|_| child_text(el, "description")),
      is_present: child_text(el, "isPresent"),
      value: child_text(el, "value"),
      usage: EnumeratedValueUsageSpec::new(&attribute(el, "usage").unwrap_or_default()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::{
    EnumeratedValueSpec, EnumeratedValueUsageSpec, ModifiedWriteValueSpec, ReadActionSpec,
    WriteValueConstraintSpec, WriteValueConstraintType,
  };
  use xmltree::Element;

  #[test]
  fn reads_keywords() {
    assert_eq!(
      ModifiedWriteValueSpec::ZeroToToggle,
      ModifiedWriteValueSpec::new("zeroToToggle")
    );
    assert_eq!(ModifiedWriteValueSpec::Unset, ModifiedWriteValueSpec::new(""));
    assert_eq!(ReadActionSpec::Modify, ReadActionSpec::new("modify"));
    assert_eq!(ReadActionSpec::Unset, ReadActionSpec::new("explode"));
    assert_eq!(EnumeratedValueUsageSpec::Write, EnumeratedValueUsageSpec::new("write"));
    assert_eq!(EnumeratedValueUsageSpec::ReadWrite, EnumeratedValueUsageSpec::new(""));
  }

  #[test]
  fn can_create_write_constraints_from_xml() {
    let el = Element::parse(
      r##"
      <writeValueConstraint>
        <minimum>2</minimum>
        <maximum>4</maximum>
      </writeValueConstraint>
      "##
        .as_bytes(),
    )
    .unwrap();

    assert_eq!(
      WriteValueConstraintSpec::min_max("2", "4"),
      WriteValueConstraintSpec::from_element(&el)
    );

    let el = Element::parse(
      "<writeValueConstraint><useEnumeratedValues>true</useEnumeratedValues></writeValueConstraint>"
        .as_bytes(),
    )
    .unwrap();

    assert_eq!(
      WriteValueConstraintType::UseEnumeratedValues,
      WriteValueConstraintSpec::from_element(&el).kind
    );

    let el = Element::parse("<writeValueConstraint/>".as_bytes()).unwrap();

    assert_eq!(
      WriteValueConstraintType::Unset,
      WriteValueConstraintSpec::from_element(&el).kind
    );
  }

  #[test]
  fn can_create_enumerated_value_from_xml() {
    let el = Element::parse(
      r##"
      <enumeratedValue usage="write">
        <name>ENABLE</name>
        <description>Turns it on</description>
        <value>1'b1</value>
      </enumeratedValue>
      "##
        .as_bytes(),
    )
    .unwrap();

    let ev = EnumeratedValueSpec::from_element(&el);

    assert_eq!("ENABLE", ev.name);
    assert_eq!("Turns it on", ev.description.unwrap());
    assert!(ev.display_name.is_none());
    assert_eq!("1'b1", ev.value);
    assert_eq!(EnumeratedValueUsageSpec::Write, ev.usage);
  }
}
