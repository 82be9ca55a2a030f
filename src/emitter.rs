use crate::manifest::{IconManifest, IconMetadata, StyleData};
use crate::naming::{compound_key, constructor_name, validate_name, NameError};
use crate::svg_parser::{parse_fragment, parse_svg, Element, MarkupError, Node, Slot};
use crate::templates;
use std::borrow::Cow;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Path markup prefix that is rewritten to a plain `<path `
const EVENODD_PREFIX: &str = r#"<path fill-rule="evenodd" "#;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Why an icon or one of its styles was left out of the output
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error("icon declares no styles")]
    NoStyles,
    #[error("style name {0:?} is not [a-z0-9]+")]
    InvalidStyle(String),
    #[error("style is listed more than once")]
    DuplicateStyle,
    #[error("style is listed but has no svg data")]
    MissingStyle,
    #[error("constructor {0} is already generated for another icon")]
    DuplicateIdentifier(String),
    #[error("invalid svg markup: {0}")]
    Markup(#[from] MarkupError),
}

/// An icon name or `<icon>-<style>` key that was not generated
#[derive(Debug)]
pub struct Skipped {
    pub key: String,
    pub reason: SkipReason,
}

/// Result of a generation pass
#[derive(Debug)]
pub struct Generated {
    /// The complete generated module
    pub source: String,
    /// Number of constructors in `source`
    pub constructors: usize,
    pub skipped: Vec<Skipped>,
}

/// One generated constructor
#[derive(Debug)]
struct Constructor {
    key: String,
    function: String,
    pieces: Vec<String>,
}

/// Generate the module for every icon in the manifest.
///
/// Icons come out in ascending name order with styles in declared order.
/// Anything that cannot be generated is left out of both the dispatcher and
/// the constructors and listed in `Generated::skipped`.
pub fn generate(manifest: &IconManifest) -> Generated {
    let mut skipped = Vec::new();
    let mut functions = HashSet::new();
    let mut icons: Vec<(&str, Vec<Constructor>)> = Vec::new();

    for (name, icon) in manifest.iter() {
        match render_icon(name, icon, &mut functions, &mut skipped) {
            Ok(constructors) if constructors.is_empty() => {}
            Ok(constructors) => icons.push((name, constructors)),
            Err(reason) => skip(&mut skipped, name.to_string(), reason),
        }
    }

    let constructors: usize = icons.iter().map(|(_, c)| c.len()).sum();
    debug!(icons = icons.len(), constructors, "Assembling module");

    Generated {
        source: assemble(&icons),
        constructors,
        skipped,
    }
}

fn skip(skipped: &mut Vec<Skipped>, key: String, reason: SkipReason) {
    debug!(%key, "Skipping: {reason}");
    skipped.push(Skipped { key, reason });
}

/// Render every style of one icon. Icon-level problems are returned as an
/// error; style-level problems are recorded and the other styles continue.
fn render_icon(
    name: &str,
    icon: &IconMetadata,
    functions: &mut HashSet<String>,
    skipped: &mut Vec<Skipped>,
) -> Result<Vec<Constructor>, SkipReason> {
    validate_name(name)?;

    if icon.styles.is_empty() {
        return Err(SkipReason::NoStyles);
    }

    let mut constructors = Vec::with_capacity(icon.styles.len());
    let mut seen_styles = HashSet::new();

    for style in &icon.styles {
        let key = compound_key(name, style);

        if !seen_styles.insert(style.as_str()) {
            skip(skipped, key, SkipReason::DuplicateStyle);
            continue;
        }

        match render_style(name, style, icon.svg.get(style), functions) {
            Ok(constructor) => constructors.push(constructor),
            Err(reason) => skip(skipped, key, reason),
        }
    }

    Ok(constructors)
}

fn render_style(
    name: &str,
    style: &str,
    data: Option<&StyleData>,
    functions: &mut HashSet<String>,
) -> Result<Constructor, SkipReason> {
    if style.is_empty()
        || !style
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(SkipReason::InvalidStyle(style.to_string()));
    }

    let data = data.ok_or(SkipReason::MissingStyle)?;
    let function = constructor_name(name, style);
    if functions.contains(&function) {
        return Err(SkipReason::DuplicateIdentifier(function));
    }

    let mut root = match data {
        StyleData::Raw { raw } => parse_svg(raw)?,
        StyleData::Path { view_box, path } => path_svg(view_box, path)?,
    };
    decorate(&mut root, name);

    let template = root.render();
    debug_assert_eq!(template.slots, Slot::ALL);

    functions.insert(function.clone());
    Ok(Constructor {
        key: compound_key(name, style),
        function,
        pieces: template.pieces,
    })
}

/// Append the five render-time attributes and a `<title>` naming the icon
fn decorate(root: &mut Element, name: &str) {
    root.append_slots();
    root.prepend_child(Element::new("title").with_text(name));
}

/// Build the fixed `<svg>` node around path data from the second manifest
/// shape
fn path_svg(view_box: &[f64; 4], path: &str) -> Result<Element, MarkupError> {
    let [x, y, width, height] = view_box;
    let mut root = Element::new("svg")
        .with_attr("xmlns", SVG_NAMESPACE)
        .with_attr("viewBox", format!("{x} {y} {width} {height}"));
    root.extend_children(path_nodes(path)?);
    Ok(root)
}

fn path_nodes(path: &str) -> Result<Vec<Node>, MarkupError> {
    let path = normalize_path(path);
    if path.trim_start().starts_with('<') {
        parse_fragment(&path)
    } else {
        Ok(vec![Element::new("path").with_attr("d", path.trim()).into()])
    }
}

/// Drop the `fill-rule="evenodd"` attribute when it leads the path markup
fn normalize_path(path: &str) -> Cow<'_, str> {
    match path.strip_prefix(EVENODD_PREFIX) {
        Some(rest) => Cow::Owned(format!("<path {rest}")),
        None => Cow::Borrowed(path),
    }
}

fn assemble(icons: &[(&str, Vec<Constructor>)]) -> String {
    let mut out = templates::header();

    out.push_str(templates::ICONS_HEAD);
    for (name, _) in icons {
        out.push_str(&format!("    {name:?},\n"));
    }
    out.push_str(templates::ICONS_TAIL);

    out.push_str(templates::PREAMBLE);

    out.push_str(templates::DISPATCH_HEAD);
    for constructor in icons.iter().flat_map(|(_, c)| c) {
        out.push_str(&format!(
            "        {:?} => Some({}()),\n",
            constructor.key, constructor.function
        ));
    }
    out.push_str(templates::DISPATCH_TAIL);

    for constructor in icons.iter().flat_map(|(_, c)| c) {
        out.push_str(&format!(
            "\n/// {function} returns the {key:?} Font Awesome icon.\n\
             pub fn {function}() -> FontAwesome {{\n    FontAwesome::new([\n",
            function = constructor.function,
            key = constructor.key,
        ));
        for piece in &constructor.pieces {
            out.push_str(&format!("        {},\n", raw_literal(piece)));
        }
        out.push_str("    ])\n}\n");
    }

    out
}

/// Quote `text` as a raw string literal with as few `#` as it needs.
///
/// Raw literals cannot hold a bare CR, so such text falls back to an
/// escaped literal.
fn raw_literal(text: &str) -> String {
    if text.contains('\r') {
        return format!("{text:?}");
    }

    let mut hashes = 0;
    while text.contains(&format!("\"{}", "#".repeat(hashes))) {
        hashes += 1;
    }
    let fence = "#".repeat(hashes);
    format!("r{fence}\"{text}\"{fence}")
}
