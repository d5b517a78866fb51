use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::core::BackofficeError;

/// A parsed XML document with namespace-agnostic element lookup.
///
/// Elements are stored in document order, so the descendants of an
/// element always occupy the contiguous range directly after it.
#[derive(Debug)]
pub struct XmlDocument {
    nodes: Vec<ElementData>,
}

#[derive(Debug)]
struct ElementData {
    local_name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Child>,
    /// One past the index of the last descendant.
    end: usize,
}

#[derive(Debug)]
enum Child {
    Element(usize),
    Text(String),
}

/// Borrowed handle to an element of an [`XmlDocument`].
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    doc: &'a XmlDocument,
    id: usize,
}

fn malformed(detail: impl Into<String>) -> BackofficeError {
    BackofficeError::MalformedXml {
        detail: detail.into(),
    }
}

fn local_name_of(start: &BytesStart<'_>) -> Result<String, BackofficeError> {
    std::str::from_utf8(start.local_name().as_ref())
        .map(str::to_string)
        .map_err(|e| malformed(format!("invalid UTF-8 in element name: {e}")))
}

impl XmlDocument {
    /// Parse `xml`, rejecting anything that is not a well-formed document
    /// with exactly one root element.
    pub fn parse(xml: &str) -> Result<Self, BackofficeError> {
        let mut reader = Reader::from_str(xml);
        let mut nodes: Vec<ElementData> = Vec::new();
        // (node id, qualified name) of every open element
        let mut open: Vec<(usize, Vec<u8>)> = Vec::new();
        let mut root_seen = false;

        loop {
            let event = reader.read_event().map_err(|e| malformed(e.to_string()))?;
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    if open.is_empty() {
                        if root_seen {
                            return Err(malformed("content after the document element"));
                        }
                        root_seen = true;
                    }

                    let mut attributes = Vec::new();
                    for attr in e.attributes() {
                        let attr = attr.map_err(|e| malformed(format!("attribute: {e}")))?;
                        let key = std::str::from_utf8(attr.key.as_ref())
                            .map_err(|e| malformed(format!("attribute name: {e}")))?
                            .to_string();
                        let value = attr
                            .unescape_value()
                            .map_err(|e| malformed(format!("attribute {key}: {e}")))?
                            .into_owned();
                        attributes.push((key, value));
                    }

                    let id = nodes.len();
                    nodes.push(ElementData {
                        local_name: local_name_of(e)?,
                        attributes,
                        children: Vec::new(),
                        end: id + 1,
                    });
                    if let Some((parent, _)) = open.last() {
                        nodes[*parent].children.push(Child::Element(id));
                    }

                    if matches!(event, Event::Start(_)) {
                        open.push((id, e.name().as_ref().to_vec()));
                    }
                }
                Event::End(ref e) => {
                    let Some((id, name)) = open.pop() else {
                        return Err(malformed(format!(
                            "unmatched end tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    };
                    if name != e.name().as_ref() {
                        return Err(malformed(format!(
                            "expected </{}>, found </{}>",
                            String::from_utf8_lossy(&name),
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    }
                    nodes[id].end = nodes.len();
                }
                Event::Text(ref e) => {
                    let text = e
                        .unescape()
                        .map_err(|e| malformed(format!("text: {e}")))?;
                    match open.last() {
                        Some((parent, _)) => {
                            nodes[*parent].children.push(Child::Text(text.into_owned()))
                        }
                        None if text.trim().is_empty() => {}
                        None => return Err(malformed("text outside the document element")),
                    }
                }
                Event::CData(ref e) => {
                    let Some((parent, _)) = open.last() else {
                        return Err(malformed("CDATA outside the document element"));
                    };
                    let text = std::str::from_utf8(e)
                        .map_err(|e| malformed(format!("CDATA: {e}")))?
                        .to_string();
                    nodes[*parent].children.push(Child::Text(text));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some((_, name)) = open.last() {
            return Err(malformed(format!(
                "unclosed element <{}>",
                String::from_utf8_lossy(name)
            )));
        }
        if nodes.is_empty() {
            return Err(malformed("no document element"));
        }

        Ok(Self { nodes })
    }

    /// The document element.
    pub fn root(&self) -> Element<'_> {
        Element { doc: self, id: 0 }
    }

    /// First element named `local_name` in document order, the document
    /// element included.
    pub fn find_first(&self, local_name: &str) -> Option<Element<'_>> {
        self.matching(0..self.nodes.len(), local_name).next()
    }

    /// Every element named `local_name` in document order, the document
    /// element included.
    pub fn find_all(&self, local_name: &str) -> Vec<Element<'_>> {
        self.matching(0..self.nodes.len(), local_name).collect()
    }

    fn matching<'a>(
        &'a self,
        range: std::ops::Range<usize>,
        local_name: &str,
    ) -> impl Iterator<Item = Element<'a>> {
        range
            .filter(move |&id| self.nodes[id].local_name == local_name)
            .map(move |id| Element { doc: self, id })
    }
}

impl<'a> Element<'a> {
    fn data(&self) -> &'a ElementData {
        &self.doc.nodes[self.id]
    }

    /// Tag name without namespace prefix.
    pub fn local_name(&self) -> &'a str {
        &self.data().local_name
    }

    /// Value of the attribute with exactly this (qualified) name.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.data()
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First descendant named `local_name`, depth-first in document order.
    pub fn find_first(&self, local_name: &str) -> Option<Element<'a>> {
        self.doc
            .matching(self.id + 1..self.data().end, local_name)
            .next()
    }

    /// All descendants named `local_name` in document order.
    pub fn find_all(&self, local_name: &str) -> Vec<Element<'a>> {
        self.doc
            .matching(self.id + 1..self.data().end, local_name)
            .collect()
    }

    /// Concatenated text of the element and all its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.data().children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Element(id) => Element {
                    doc: self.doc,
                    id: *id,
                }
                .collect_text(out),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = r#"<?xml version="1.0"?>
<a:Root xmlns:a="urn:a" xmlns:b="urn:b">
  <b:Item id="1"><a:Name> first </a:Name></b:Item>
  <Item id="2"><Name>second</Name><Inner><Name>deep</Name></Inner></Item>
</a:Root>"#;

    #[test]
    fn lookup_ignores_prefixes() {
        let doc = XmlDocument::parse(NESTED).unwrap();
        let items = doc.find_all("Item");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].attribute("id"), Some("1"));
        assert_eq!(items[1].attribute("id"), Some("2"));
        assert_eq!(doc.root().local_name(), "Root");
        assert!(doc.find_first("Root").is_some());
    }

    #[test]
    fn scoped_lookup_only_sees_descendants() {
        let doc = XmlDocument::parse(NESTED).unwrap();
        let second = doc.find_all("Item")[1];
        let names: Vec<String> = second
            .find_all("Name")
            .iter()
            .map(Element::text_content)
            .collect();
        assert_eq!(names, vec!["second", "deep"]);
        assert!(second.find_first("Item").is_none());
    }

    #[test]
    fn text_content_concatenates_descendants_and_cdata() {
        let doc = XmlDocument::parse("<r>a<b>b</b><![CDATA[<c>]]>&amp;</r>").unwrap();
        assert_eq!(doc.root().text_content(), "ab<c>&");
    }

    #[test]
    fn self_closing_root_is_accepted() {
        let doc = XmlDocument::parse("<Invoice/>").unwrap();
        assert_eq!(doc.root().local_name(), "Invoice");
        assert!(doc.root().find_first("Invoice").is_none());
        assert_eq!(doc.root().text_content(), "");
    }

    #[test]
    fn rejects_malformed_documents() {
        for xml in [
            "",
            "   ",
            "<a>",
            "<a><b></a>",
            "<a></b>",
            "</a>",
            "<a/><b/>",
            "text<a/>",
            "<a/>trailing",
            "<a x=\"1\" x=\"2\"/>",
            "<a>&unknown;</a>",
        ] {
            let err = XmlDocument::parse(xml).unwrap_err();
            assert!(
                matches!(err, BackofficeError::MalformedXml { .. }),
                "{xml:?} should be malformed"
            );
        }
    }

    #[test]
    fn internal_subset_entities_are_not_expanded() {
        let err = XmlDocument::parse(r#"<!DOCTYPE x [<!ENTITY a "b">]><x>&a;</x>"#).unwrap_err();
        assert!(matches!(err, BackofficeError::MalformedXml { .. }));
        assert!(XmlDocument::parse(r#"<!DOCTYPE x [<!ENTITY a "b">]><x>b</x>"#).is_ok());
    }
}
