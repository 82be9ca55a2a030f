use thiserror::Error;

/// Prefix for names that would otherwise start with a digit
const DIGIT_PREFIX: &str = "fa";

/// Why an icon name cannot be turned into an identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("icon name is empty")]
    Empty,
    #[error("icon name {0:?} has an empty hyphen segment")]
    EmptySegment(String),
    #[error("icon name {name:?} contains {found:?}, expected [a-z0-9-]")]
    InvalidChar { name: String, found: char },
}

/// Check that `name` derives to a usable identifier.
///
/// `derive` never fails, but an empty segment silently disappears from its
/// output, so two different names could collide. Those are rejected here.
pub fn validate_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    if let Some(found) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(NameError::InvalidChar {
            name: name.to_string(),
            found,
        });
    }

    if name.split('-').any(str::is_empty) {
        return Err(NameError::EmptySegment(name.to_string()));
    }

    Ok(())
}

/// Convert a hyphenated icon name to an exported identifier fragment
/// (e.g. "chevron-left" -> "ChevronLeft", "500px" -> "Fa500Px")
pub fn derive(name: &str) -> String {
    let prefixed;
    let input = if name.starts_with(|c: char| c.is_ascii_digit()) {
        prefixed = format!("{DIGIT_PREFIX}{name}");
        prefixed.as_str()
    } else {
        name
    };

    input.split('-').map(title_case).collect()
}

/// Uppercase the first letter of a word and any letter that directly
/// follows a digit. Everything else is left alone.
pub fn title_case(word: &str) -> String {
    let mut result = String::with_capacity(word.len());
    let mut boundary = true;

    for c in word.chars() {
        if boundary && c.is_alphabetic() {
            result.extend(c.to_uppercase());
        } else {
            result.push(c);
        }
        boundary = c.is_ascii_digit();
    }

    result
}

/// Name of the generated constructor for one icon-style pair
pub fn constructor_name(name: &str, style: &str) -> String {
    format!("{}{}", derive(name), title_case(style))
}

/// Dispatch key for one icon-style pair
pub fn compound_key(name: &str, style: &str) -> String {
    format!("{name}-{style}")
}
