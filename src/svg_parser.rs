use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("element <{0}> is never closed")]
    Unclosed(String),
    #[error("closing tag </{0}> has no matching opening tag")]
    UnmatchedEnd(String),
    #[error("expected exactly one root element, found {0}")]
    RootCount(usize),
    #[error("root element is <{0}>, expected <svg>")]
    NotSvg(String),
}

/// Attribute values filled in by the generated code at render time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Width,
    Height,
    Style,
    Id,
    Class,
}

impl Slot {
    /// Every slot, in the order they are appended to the root element
    pub const ALL: [Slot; 5] = [Slot::Width, Slot::Height, Slot::Style, Slot::Id, Slot::Class];

    pub fn attr_name(self) -> &'static str {
        match self {
            Slot::Width => "width",
            Slot::Height => "height",
            Slot::Style => "style",
            Slot::Id => "id",
            Slot::Class => "class",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Literal(String),
    Slot(Slot),
}

/// A node of an SVG document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, AttrValue)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes
            .push((key.into(), AttrValue::Literal(value.into())));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Append the five render-time slots after the existing attributes.
    ///
    /// Literal attributes sharing a slot's name are dropped first so the
    /// rendered element never carries the same attribute twice.
    pub fn append_slots(&mut self) {
        self.attributes.retain(|(key, _)| {
            !Slot::ALL.iter().any(|slot| slot.attr_name() == key.as_str())
        });
        for slot in Slot::ALL {
            self.attributes
                .push((slot.attr_name().to_string(), AttrValue::Slot(slot)));
        }
    }

    /// Insert `node` before all existing children
    pub fn prepend_child(&mut self, node: impl Into<Node>) {
        self.children.insert(0, node.into());
    }

    pub fn extend_children(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.children.extend(nodes);
    }

    /// Serialize the element, splitting the output at every slot
    pub fn render(&self) -> Template {
        let mut template = Template {
            pieces: Vec::new(),
            slots: Vec::new(),
        };
        let mut current = String::new();
        self.write_to(&mut template, &mut current);
        template.pieces.push(current);
        template
    }

    fn write_to(&self, template: &mut Template, current: &mut String) {
        current.push('<');
        current.push_str(&self.name);

        for (key, value) in &self.attributes {
            current.push(' ');
            current.push_str(key);
            current.push_str("=\"");
            match value {
                AttrValue::Literal(text) => current.push_str(&escape_attr(text)),
                AttrValue::Slot(slot) => {
                    template.pieces.push(std::mem::take(current));
                    template.slots.push(*slot);
                }
            }
            current.push('"');
        }

        if self.children.is_empty() {
            current.push_str("/>");
            return;
        }

        current.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_to(template, current),
                Node::Text(text) => current.push_str(&escape_text(text)),
            }
        }
        current.push_str("</");
        current.push_str(&self.name);
        current.push('>');
    }
}

/// Carriage returns are written as character references so the output
/// never carries a bare CR.
fn escape_attr(value: &str) -> String {
    escape(value).replace('\r', "&#13;")
}

fn escape_text(text: &str) -> String {
    partial_escape(text).replace('\r', "&#13;")
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

/// Serialized markup with holes.
///
/// `pieces` always holds one more entry than `slots`; slot `i` sits between
/// `pieces[i]` and `pieces[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub pieces: Vec<String>,
    pub slots: Vec<Slot>,
}

/// Parse a complete document whose root must be `<svg>`
pub fn parse_svg(markup: &str) -> Result<Element, MarkupError> {
    let mut roots: Vec<Element> = parse_fragment(markup)?
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
        .collect();

    if roots.len() != 1 {
        return Err(MarkupError::RootCount(roots.len()));
    }

    let root = roots.remove(0);
    if root.name != "svg" {
        return Err(MarkupError::NotSvg(root.name));
    }

    Ok(root)
}

/// Parse a sequence of sibling nodes.
///
/// Comments, declarations, processing instructions and whitespace-only text
/// nodes are dropped. Other text is kept as written.
pub fn parse_fragment(markup: &str) -> Result<Vec<Node>, MarkupError> {
    let mut reader = Reader::from_str(markup);

    let mut stack: Vec<Element> = Vec::new();
    let mut roots: Vec<Node> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|source| MarkupError::Xml {
            position: reader.buffer_position() as u64,
            source,
        })?;

        match event {
            Event::Start(start) => {
                let element = element_from(&start).map_err(|source| MarkupError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                })?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = element_from(&start).map_err(|source| MarkupError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                })?;
                attach(&mut stack, &mut roots, Node::Element(element));
            }
            Event::End(end) => {
                let element = stack.pop().ok_or_else(|| {
                    MarkupError::UnmatchedEnd(String::from_utf8_lossy(end.name().as_ref()).into_owned())
                })?;
                attach(&mut stack, &mut roots, Node::Element(element));
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|source| MarkupError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                })?;
                if !text.trim().is_empty() {
                    attach(&mut stack, &mut roots, Node::Text(text.into_owned()));
                }
            }
            Event::CData(cdata) => {
                let text = String::from_utf8_lossy(&cdata).into_owned();
                attach(&mut stack, &mut roots, Node::Text(text));
            }
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = stack.pop() {
        return Err(MarkupError::Unclosed(open.name));
    }

    Ok(roots)
}

fn attach(stack: &mut [Element], roots: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element, quick_xml::Error> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());

    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, AttrValue::Literal(value)));
    }

    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 576 512"><path d="M280.37 148.26L96 300.11"/></svg>"#;

    #[test]
    fn test_parse_svg() {
        let root = parse_svg(HOME).unwrap();
        assert_eq!(root.name, "svg");
        assert_eq!(root.attributes.len(), 2);
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_roundtrip_without_slots() {
        let root = parse_svg(HOME).unwrap();
        let template = root.render();
        assert!(template.slots.is_empty());
        assert_eq!(template.pieces, vec![HOME.to_string()]);
    }

    #[test]
    fn test_append_slots() {
        let mut root = parse_svg(HOME).unwrap();
        root.append_slots();
        let template = root.render();

        assert_eq!(template.slots, Slot::ALL.to_vec());
        assert_eq!(template.pieces.len(), 6);
        assert!(template.pieces[0].ends_with(r#"viewBox="0 0 576 512" width=""#));
        assert_eq!(template.pieces[1], r#"" height=""#);
        assert_eq!(template.pieces[2], r#"" style=""#);
        assert_eq!(template.pieces[3], r#"" id=""#);
        assert_eq!(template.pieces[4], r#"" class=""#);
        assert!(template.pieces[5].starts_with(r#""><path"#));
    }

    #[test]
    fn test_append_slots_replaces_existing() {
        let mut root = parse_svg(r#"<svg width="10" viewBox="0 0 1 1" class="x"/>"#).unwrap();
        root.append_slots();
        let keys: Vec<&str> = root.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["viewBox", "width", "height", "style", "id", "class"]);
    }

    #[test]
    fn test_prepend_title() {
        let mut root = parse_svg(HOME).unwrap();
        root.prepend_child(Element::new("title").with_text("home"));
        let rendered = root.render().pieces.concat();
        assert!(rendered.contains(r#"viewBox="0 0 576 512"><title>home</title><path"#));
    }

    #[test]
    fn test_escaping() {
        let element = Element::new("svg")
            .with_attr("data-x", r#"a"b<c"#)
            .with_text("1 < 2 & 3");
        assert_eq!(
            element.render().pieces.concat(),
            r#"<svg data-x="a&quot;b&lt;c">1 &lt; 2 &amp; 3</svg>"#
        );
    }

    #[test]
    fn test_malformed_markup() {
        assert!(matches!(
            parse_svg(r#"<svg><path d="M0"></svg>"#),
            Err(MarkupError::Xml { .. })
        ));
        assert!(matches!(
            parse_svg(r#"<svg><path d="M0"/>"#),
            Err(MarkupError::Unclosed(_) | MarkupError::Xml { .. })
        ));
        assert!(matches!(
            parse_svg(r#"<g/>"#),
            Err(MarkupError::NotSvg(name)) if name == "g"
        ));
        assert!(matches!(parse_svg(""), Err(MarkupError::RootCount(0))));
    }

    #[test]
    fn test_carriage_return_is_escaped() {
        let root = parse_svg("<svg><path d=\"M0\rL1\"/><text>a\r\nb</text></svg>").unwrap();
        let rendered = root.render().pieces.concat();
        assert!(!rendered.contains('\r'));
        assert_eq!(
            rendered,
            "<svg><path d=\"M0&#13;L1\"/><text>a&#13;\nb</text></svg>"
        );
    }

    #[test]
    fn test_text_whitespace_is_kept() {
        let root = parse_svg("<svg>\n  <text> a </text>\n</svg>").unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.render().pieces.concat(), "<svg><text> a </text></svg>");
    }

    #[test]
    fn test_parse_fragment() {
        let nodes = parse_fragment(r#"<path d="M0"/><!-- x --><circle r="1"></circle>"#).unwrap();
        assert_eq!(nodes.len(), 2);
    }
}
