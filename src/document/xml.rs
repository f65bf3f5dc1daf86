//! Immutable XML tree built from provider bytes.
//!
//! quick-xml is used as a pull parser only; the tree itself is a plain owned value
//! (`XmlNode`) so it is `Send + Sync` and can be traversed from the rayon pool.
//! Namespace prefixes are dropped, attributes are ignored (the provider carries all
//! data in element text), and text is trimmed.

use quick_xml::Reader;
use quick_xml::events::Event;
use thiserror::Error;

use super::DocNode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("document has no root element")]
    Empty,

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),

    #[error("invalid UTF-8 in document: {0}")]
    Encoding(String),
}

/// One element: local name, direct text, children in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlNode {
    tag: String,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Parse a complete document and return its root element.
    pub fn parse(bytes: &[u8]) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(start)) => {
                    stack.push(XmlNode::element(decode_name(start.local_name().as_ref())?));
                }
                Ok(Event::Empty(start)) => {
                    let node = XmlNode::element(decode_name(start.local_name().as_ref())?);
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::End(end)) => {
                    let name = decode_name(end.local_name().as_ref())?;
                    let mut node = stack
                        .pop()
                        .ok_or_else(|| DocumentError::UnexpectedClose(name.clone()))?;
                    if node.tag != name {
                        return Err(DocumentError::UnexpectedClose(name));
                    }
                    node.text = node.text.trim().to_string();
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::Text(text)) => {
                    let text = text
                        .unescape()
                        .map_err(|e| DocumentError::Malformed(e.to_string()))?;
                    if let Some(open) = stack.last_mut() {
                        open.text.push_str(&text);
                    }
                }
                Ok(Event::CData(data)) => {
                    let text = std::str::from_utf8(&data)
                        .map_err(|e| DocumentError::Encoding(e.to_string()))?;
                    if let Some(open) = stack.last_mut() {
                        open.text.push_str(text);
                    }
                }
                Ok(Event::Eof) => break,
                // Declarations, comments, processing instructions, doctype.
                Ok(_) => {}
                Err(e) => return Err(DocumentError::Malformed(e.to_string())),
            }
            buf.clear();
        }

        if let Some(open) = stack.pop() {
            return Err(DocumentError::Unclosed(open.tag));
        }
        root.ok_or(DocumentError::Empty)
    }
}

impl DocNode for XmlNode {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn children_named(&self, tag: &str) -> Vec<&Self> {
        self.children.iter().filter(|c| c.tag == tag).collect()
    }
}

fn decode_name(raw: &[u8]) -> Result<String, DocumentError> {
    String::from_utf8(raw.to_vec()).map_err(|e| DocumentError::Encoding(e.to_string()))
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), DocumentError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_some() => {
            return Err(DocumentError::Malformed(format!(
                "second root element <{}>",
                node.tag
            )));
        }
        None => *root = Some(node),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GL_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-6:generationloaddocument:3:0">
  <mRID>abc</mRID>
  <!-- one series -->
  <TimeSeries>
    <Period>
      <timeInterval>
        <start>2015-01-01T00:00Z</start>
        <end>2015-01-01T01:00Z</end>
      </timeInterval>
      <resolution>PT15M</resolution>
      <Point><position>1</position><quantity>10</quantity></Point>
      <Point><position>2</position><quantity>11.5</quantity></Point>
    </Period>
  </TimeSeries>
</GL_MarketDocument>"#;

    #[test]
    fn builds_tree_with_local_names_and_trimmed_text() {
        let root = XmlNode::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(root.tag(), "GL_MarketDocument");
        assert_eq!(root.first_child("mRID").unwrap().text(), "abc");

        let series = root.children_named("TimeSeries");
        assert_eq!(series.len(), 1);
        let period = series[0].first_child("Period").unwrap();
        let start = period
            .first_child("timeInterval")
            .and_then(|n| n.first_child("start"))
            .unwrap();
        assert_eq!(start.text(), "2015-01-01T00:00Z");

        let quantities: Vec<&str> = period
            .children_named("Point")
            .into_iter()
            .filter_map(|p| p.first_child("quantity"))
            .map(|q| q.text())
            .collect();
        assert_eq!(quantities, vec!["10", "11.5"]);
    }

    #[test]
    fn prefixed_names_lose_their_prefix() {
        let xml = r#"<ns:Doc xmlns:ns="urn:x"><ns:TimeSeries/><ns:TimeSeries/></ns:Doc>"#;
        let root = XmlNode::parse(xml.as_bytes()).unwrap();
        assert_eq!(root.tag(), "Doc");
        assert_eq!(root.children_named("TimeSeries").len(), 2);
    }

    #[test]
    fn entities_and_cdata_become_text() {
        let xml = "<a><b>1 &amp; 2</b><c><![CDATA[<raw>]]></c></a>";
        let root = XmlNode::parse(xml.as_bytes()).unwrap();
        assert_eq!(root.first_child("b").unwrap().text(), "1 & 2");
        assert_eq!(root.first_child("c").unwrap().text(), "<raw>");
    }

    #[test]
    fn empty_input_has_no_root() {
        assert_eq!(XmlNode::parse(b"").unwrap_err(), DocumentError::Empty);
        assert_eq!(
            XmlNode::parse(b"<?xml version=\"1.0\"?>").unwrap_err(),
            DocumentError::Empty
        );
    }

    #[test]
    fn broken_structure_is_an_error() {
        assert!(XmlNode::parse(b"<a><b></a>").is_err());
        assert!(XmlNode::parse(b"<a><b>").is_err());
        assert!(XmlNode::parse(b"<a/><b/>").is_err());
    }
}
