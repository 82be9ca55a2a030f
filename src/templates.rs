//! Fixed text of the generated module.
//!
//! Bump `TEMPLATE_VERSION` whenever any of these change so regenerated
//! files show why their boilerplate moved.

pub const TEMPLATE_VERSION: u32 = 1;

pub fn header() -> String {
    format!(
        "// Code generated by fa-codegen from Font Awesome icon metadata. DO NOT EDIT.\n\
         // Template version: {TEMPLATE_VERSION}\n\
         \n\
         #![allow(non_snake_case)]\n\
         \n\
         use std::borrow::Cow;\n\
         use std::fmt;\n"
    )
}

pub const ICONS_HEAD: &str = "
/// Every Font Awesome icon name with at least one generated style
pub const ICONS: &[&str] = &[
";

pub const ICONS_TAIL: &str = "];
";

pub const PREAMBLE: &str = r##"
/// An SVG node for one Font Awesome icon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontAwesome {
    pieces: [&'static str; 6],
    width: u32,
    height: u32,
    style: String,
    id: String,
    class: String,
}

impl FontAwesome {
    fn new(pieces: [&'static str; 6]) -> Self {
        FontAwesome {
            pieces,
            width: 16,
            height: 16,
            style: String::from("display: inline-block; vertical-align: text-top; fill: currentColor;"),
            id: String::new(),
            class: String::new(),
        }
    }

    /// Returns the SVG node as an XML string
    pub fn xml(&self) -> String {
        let [p0, p1, p2, p3, p4, p5] = self.pieces;
        format!(
            "{p0}{}{p1}{}{p2}{}{p3}{}{p4}{}{p5}",
            self.width,
            self.height,
            escape_attr(&self.style),
            escape_attr(&self.id),
            escape_attr(&self.class),
        )
    }

    /// Sets the width and height of the icon to the same value
    pub fn size(&mut self, size: u32) -> &mut Self {
        self.width(size).height(size)
    }

    /// Sets the width of the icon
    pub fn width(&mut self, width: u32) -> &mut Self {
        self.width = width;
        self
    }

    /// Sets the height of the icon
    pub fn height(&mut self, height: u32) -> &mut Self {
        self.height = height;
        self
    }

    /// Sets the inline style of the icon
    pub fn style(&mut self, style: impl Into<String>) -> &mut Self {
        self.style = style.into();
        self
    }

    /// Sets the id of the icon
    pub fn id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = id.into();
        self
    }

    /// Sets the class of the icon
    pub fn class(&mut self, class: impl Into<String>) -> &mut Self {
        self.class = class.into();
        self
    }
}

impl fmt::Display for FontAwesome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.xml())
    }
}

fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
"##;

pub const DISPATCH_HEAD: &str = "
/// Returns the icon for an `<icon>-<style>` key such as `\"home-solid\"`,
/// or `None` if there is no such icon.
pub fn icon(name: &str) -> Option<FontAwesome> {
    match name {
";

pub const DISPATCH_TAIL: &str = "        _ => None,
    }
}
";
