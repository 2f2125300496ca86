//! Decoding XML-projected composite payloads
//!
//! Ref-cursor queries project nested composites as concatenated XML
//! elements with no single document root. The parser wraps the payload
//! in a synthetic root and builds a lightweight node tree; element names
//! are attribute names, leaf text is the scalar payload, and an empty
//! element stands for a null attribute.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{UdtError, UdtResult};

/// One decoded XML element
#[derive(Debug, Clone, Default)]
pub struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn child_named(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Parse a rootless element sequence into the nodes at its top level
pub fn parse_fragment(payload: &str) -> UdtResult<Vec<XmlNode>> {
    let wrapped = format!("<x>{payload}</x>");
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = vec![XmlNode::default()];
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                stack.push(XmlNode {
                    name,
                    ..XmlNode::default()
                });
            }
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode {
                        name,
                        ..XmlNode::default()
                    });
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape()?;
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text);
                }
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| UdtError::Xml("unbalanced element nesting".to_string()))?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(node);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(UdtError::from(e)),
            _ => {}
        }
    }

    let root = stack
        .pop()
        .ok_or_else(|| UdtError::Xml("unbalanced element nesting".to_string()))?;
    if !stack.is_empty() {
        return Err(UdtError::Xml("unbalanced element nesting".to_string()));
    }
    // The synthetic wrapper ends up as the root's only child.
    Ok(root
        .children
        .into_iter()
        .next()
        .map(|wrapper| wrapper.children)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_concatenated_elements() {
        let nodes = parse_fragment("<A>1</A><A>2</A><B/>").unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].name, "A");
        assert_eq!(nodes[0].text, "1");
        assert_eq!(nodes[1].text, "2");
        assert_eq!(nodes[2].name, "B");
        assert!(nodes[2].text.is_empty());
    }

    #[test]
    fn test_parses_nesting() {
        let nodes = parse_fragment("<ADDR><STREET>Main</STREET><ZIP/></ADDR>").unwrap();
        assert_eq!(nodes.len(), 1);
        let addr = &nodes[0];
        assert_eq!(addr.name, "ADDR");
        assert_eq!(addr.child_named("STREET").unwrap().text, "Main");
        assert!(addr.child_named("ZIP").unwrap().text.is_empty());
        assert!(addr.child_named("CITY").is_none());
    }

    #[test]
    fn test_empty_payload() {
        assert!(parse_fragment("").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payload_fails() {
        assert!(parse_fragment("<A><B></A>").is_err());
    }
}
