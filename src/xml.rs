use std::collections::BTreeMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use thiserror::Error;

/// Errors that can occur while parsing a report into an [`XmlNode`] tree.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid UTF-8 in XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("failed to decode XML text: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("malformed XML: {0}")]
    Malformed(String),
}

/// An element of the report document.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlNode {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<XmlNode>,
    /// Text directly inside the element. Whitespace-only runs are dropped.
    pub text: Option<String>,
}

impl XmlNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// All descendants named `tag`, in document order. The node itself is
    /// not included.
    pub fn elements_by_tag<'a>(&'a self, tag: &str) -> Vec<&'a XmlNode> {
        let mut found = Vec::new();
        for child in &self.children {
            child.collect_by_tag(tag, &mut found);
        }
        found
    }

    /// Like [`XmlNode::elements_by_tag`], but also considers the node itself.
    /// Used at the document root, where the root may be the match.
    pub fn self_and_elements_by_tag<'a>(&'a self, tag: &str) -> Vec<&'a XmlNode> {
        let mut found = Vec::new();
        self.collect_by_tag(tag, &mut found);
        found
    }

    /// First descendant named `tag` in document order.
    pub fn first_by_tag(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find_map(|child| {
            if child.tag == tag {
                Some(child)
            } else {
                child.first_by_tag(tag)
            }
        })
    }

    /// Non-empty text of the node, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }

    fn collect_by_tag<'a>(&'a self, tag: &str, found: &mut Vec<&'a XmlNode>) {
        if self.tag == tag {
            found.push(self);
        }
        for child in &self.children {
            child.collect_by_tag(tag, found);
        }
    }
}

/// Concatenate the text of the requested tags found under the first node.
///
/// Each value is followed by a single space. Lookup stops at the first tag
/// that is missing or carries no text, so later tags are never consulted.
pub fn extract(nodes: &[&XmlNode], tags: &[&str]) -> String {
    let mut out = String::new();
    let Some(parent) = nodes.first() else {
        return out;
    };

    for tag in tags {
        let Some(value) = parent.first_by_tag(tag).and_then(XmlNode::text) else {
            break;
        };
        out.push_str(value);
        out.push(' ');
    }
    out
}

/// Drop the separator [`extract`] leaves after a single value.
pub fn bare(value: &str) -> &str {
    value.strip_suffix(' ').unwrap_or(value)
}

/// Parse a report body into an [`XmlNode`] tree.
pub fn parse(xml: &[u8]) -> Result<XmlNode, ParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(open_node(&e, &reader)?),
            Event::Empty(e) => {
                let node = open_node(&e, &reader)?;
                attach(node, &mut stack, &mut root)?;
            }
            Event::Text(e) => {
                let text = e.unescape()?.into_owned();
                push_text(&mut stack, text);
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(e.as_ref())?.to_string();
                push_text(&mut stack, text);
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| {
                    ParseError::Malformed("closing tag without open tag".to_string())
                })?;
                attach(node, &mut stack, &mut root)?;
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ParseError::Malformed(
            "unclosed element(s) at end of document".to_string(),
        ));
    }

    root.ok_or_else(|| ParseError::Malformed("no root element found".to_string()))
}

fn push_text(stack: &mut [XmlNode], text: String) {
    let Some(current) = stack.last_mut() else {
        return;
    };
    if text.trim().is_empty() {
        return;
    }
    match &mut current.text {
        Some(existing) => existing.push_str(&text),
        None => current.text = Some(text),
    }
}

fn attach(
    node: XmlNode,
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_none() {
        *root = Some(node);
    } else {
        return Err(ParseError::Malformed(
            "multiple top-level elements found".to_string(),
        ));
    }
    Ok(())
}

fn open_node(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<XmlNode, ParseError> {
    let mut node = XmlNode::new(qname_to_string(e.name())?);
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = qname_to_string(attr.key)?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())?
            .into_owned();
        node.attributes.insert(key, value);
    }
    Ok(node)
}

fn qname_to_string(name: QName<'_>) -> Result<String, ParseError> {
    Ok(std::str::from_utf8(name.as_ref())?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WEATHER: &str = r#"<weather>
        <brief>Fine</brief>
        <wind>NW 20km/h</wind>
        <temperature></temperature>
        <visibility>Good</visibility>
    </weather>"#;

    fn weather() -> XmlNode {
        parse(WEATHER.as_bytes()).unwrap()
    }

    #[test]
    fn extract_joins_values_with_trailing_space() {
        let weather = weather();
        assert_eq!(extract(&[&weather], &["brief", "wind"]), "Fine NW 20km/h ");
    }

    #[test]
    fn extract_without_nodes_is_empty() {
        assert_eq!(extract(&[], &["brief"]), "");
    }

    #[test]
    fn extract_missing_first_tag_is_empty() {
        let weather = weather();
        assert_eq!(extract(&[&weather], &["snowline", "brief"]), "");
    }

    #[test]
    fn extract_stops_at_first_empty_tag() {
        let weather = weather();
        // visibility is present but must not be reached
        assert_eq!(
            extract(&[&weather], &["brief", "temperature", "visibility"]),
            "Fine "
        );
        assert_eq!(
            extract(&[&weather], &["wind", "rain", "visibility"]),
            "NW 20km/h "
        );
    }

    #[test]
    fn extract_uses_first_node_and_first_match_only() {
        let first = parse(b"<road><brief>Open</brief><brief>Closed</brief></road>").unwrap();
        let second = parse(b"<road><brief>Shuttle Bus only</brief></road>").unwrap();
        assert_eq!(extract(&[&first, &second], &["brief"]), "Open ");
    }

    #[test]
    fn lookup_walks_descendants_in_document_order() {
        let doc = parse(
            b"<report><skiarea><status><code>2</code></status>\
              <facilities><facility><status><code>3</code></status></facility></facilities>\
              </skiarea></report>",
        )
        .unwrap();
        let codes: Vec<_> = doc
            .elements_by_tag("code")
            .iter()
            .filter_map(|n| n.text())
            .collect();
        assert_eq!(codes, vec!["2", "3"]);
        assert_eq!(doc.self_and_elements_by_tag("report").len(), 1);
        assert!(doc.elements_by_tag("report").is_empty());
    }

    #[test]
    fn parse_keeps_attributes() {
        let doc = parse(br#"<report version="1.2"><skiarea id='tukino'/></report>"#).unwrap();
        assert_eq!(doc.attributes.get("version").map(String::as_str), Some("1.2"));
        assert_eq!(doc.children[0].attributes["id"], "tukino");
    }

    #[test]
    fn parse_unescapes_text_and_keeps_cdata() {
        let doc = parse(b"<detail>Snow &amp; ice<![CDATA[ <b>care</b>]]></detail>").unwrap();
        assert_eq!(doc.text(), Some("Snow & ice <b>care</b>"));
    }

    #[test]
    fn parse_rejects_unclosed_elements() {
        assert!(matches!(
            parse(b"<report><skiarea>"),
            Err(ParseError::Malformed(_)) | Err(ParseError::Xml(_))
        ));
    }

    #[test]
    fn bare_strips_one_separator() {
        assert_eq!(bare("Closed "), "Closed");
        assert_eq!(bare("Closed"), "Closed");
        assert_eq!(bare(""), "");
    }
}
