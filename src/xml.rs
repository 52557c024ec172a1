use xmltree::Element;

use crate::error::{IpxactError, IpxactResult};

/// Parses `xml` and checks that its root is a `root` element. Namespace prefixes are ignored.
pub(crate) fn parse_root(xml: &str, root: &str) -> IpxactResult<Element> {
  let el = Element::parse(xml.as_bytes())?;
  if el.name != root {
    return Err(IpxactError::new(&format!(
      "Expected a '{}' element, found '{}'",
      root, el.name
    )));
  }
  Ok(el)
}

/// The child elements of `el`, skipping text and comments.
pub(crate) fn elements<'a>(el: &'a Element) -> impl Iterator<Item = &'a Element> {
  el.children.iter().filter_map(|node| node.as_element())
}

/// The first child element named `name`.
pub(crate) fn child<'a>(el: &'a Element, name: &str) -> Option<&'a Element> {
  elements(el).find(|c| c.name == name)
}

/// The trimmed text of the first child element named `name`, or an empty string.
pub(crate) fn child_text(el: &Element, name: &str) -> String {
  child(el, name)
    .and_then(|c| c.get_text())
    .map(|t| t.trim().to_owned())
    .unwrap_or_default()
}

/// The `item` elements inside the `container` child of `el`, such as every `reset` in `resets`.
pub(crate) fn children<'a>(el: &'a Element, container: &str, item: &str) -> Vec<&'a Element> {
  match child(el, container) {
    Some(c) => elements(c).filter(|i| i.name == item).collect(),
    None => Vec::new(),
  }
}

/// The value of attribute `name`, with or without a namespace prefix.
pub(crate) fn attribute(el: &Element, name: &str) -> Option<String> {
  el.attributes
    .iter()
    .find(|(key, _)| *key == name || key.rsplit(':').next() == Some(name))
    .map(|(_, value)| value.clone())
}

#[cfg(test)]
mod tests {
  use super::{attribute, child_text, children, parse_root};

  #[test]
  fn reads_namespaced_elements() {
    let el = parse_root(
      r##"
      <ipxact:field xmlns:ipxact="http://www.accellera.org/XMLSchema/IPXACT/1685-2014">
        <ipxact:name> FOO </ipxact:name>
        <ipxact:resets>
          <ipxact:reset resetTypeRef="soft"><ipxact:value>0</ipxact:value></ipxact:reset>
          <ipxact:reset><ipxact:value>1</ipxact:value></ipxact:reset>
        </ipxact:resets>
      </ipxact:field>
      "##,
      "field",
    )
    .unwrap();

    assert_eq!("FOO", child_text(&el, "name"));
    assert_eq!("", child_text(&el, "bitWidth"));

    let resets = children(&el, "resets", "reset");
    assert_eq!(2, resets.len());
    assert_eq!(Some("soft".to_owned()), attribute(resets[0], "resetTypeRef"));
    assert_eq!(None, attribute(resets[1], "resetTypeRef"));
  }

  #[test]
  fn rejects_unexpected_root() {
    assert!(parse_root("<register/>", "field").is_err());
    assert!(parse_root("<field>", "field").is_err());
  }
}
