//! Placeholders in format literals, `f"Hello {name}"`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();

    chars
        .next()
        .map_or(false, |c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Splits a format literal into text and `{name}` placeholders. Braces that
/// do not enclose a name are kept as text.
pub(crate) fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) if is_identifier(after[..close].trim()) => {
                if open > 0 {
                    segments.push(Segment::Text(&rest[..open]));
                }

                segments.push(Segment::Placeholder(after[..close].trim()));
                rest = &after[close + 1..];
            }
            _ => {
                segments.push(Segment::Text(&rest[..=open]));
                rest = after;
            }
        }
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }

    segments
}

pub(crate) fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    segments(template).into_iter().filter_map(|s| match s {
        Segment::Placeholder(name) => Some(name),
        Segment::Text(_) => None,
    })
}
