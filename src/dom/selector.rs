//! Simple CSS selector parsing and matching
//!
//! Covers exactly the structural vocabulary the kit uses: `*`, `tag`,
//! `.class`, `#id`, `[attr]`, `[attr="value"]`, compounds of those
//! (`a.cl-show`, `[data-cl-toggle="tab"]`), and comma-separated lists.
//! No combinators. Malformed input parses to a selector that matches
//! nothing; parsing never fails loudly.

use crate::dom::node::NodeData;

/// One simple component of a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SimplePart {
    Universal,
    Tag(String),
    Class(String),
    Id(String),
    Attr { name: String, value: Option<String> },
}

/// A compound selector: all parts must match one element
#[derive(Debug, Clone, Default)]
pub(crate) struct Compound {
    parts: Vec<SimplePart>,
}

impl Compound {
    pub fn matches(&self, node: &NodeData) -> bool {
        !self.parts.is_empty() && self.parts.iter().all(|part| part_matches(part, node))
    }
}

fn part_matches(part: &SimplePart, node: &NodeData) -> bool {
    match part {
        SimplePart::Universal => true,
        SimplePart::Tag(tag) => node.tag.eq_ignore_ascii_case(tag),
        SimplePart::Class(class) => node.has_class(class),
        SimplePart::Id(id) => node.id_attr() == Some(id.as_str()),
        SimplePart::Attr { name, value } => match node.attributes.get(name) {
            Some(actual) => value.as_ref().is_none_or(|expected| actual == expected),
            None => false,
        },
    }
}

/// A parsed selector list
#[derive(Debug, Clone, Default)]
pub struct Selector {
    branches: Vec<Compound>,
}

impl Selector {
    /// Parse a selector list; malformed branches are dropped
    pub fn parse(input: &str) -> Self {
        let branches = split_branches(input)
            .into_iter()
            .filter_map(|branch| parse_compound(branch.trim()))
            .collect();
        Self { branches }
    }

    /// True if no branch survived parsing
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub(crate) fn matches_node(&self, node: &NodeData) -> bool {
        self.branches.iter().any(|branch| branch.matches(node))
    }
}

impl From<&str> for Selector {
    fn from(input: &str) -> Self {
        Selector::parse(input)
    }
}

/// Split on commas that are not inside an attribute bracket
fn split_branches(input: &str) -> Vec<&str> {
    let mut branches = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in input.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                branches.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    branches.push(&input[start..]);
    branches
}

fn parse_compound(input: &str) -> Option<Compound> {
    if input.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        match ch {
            '*' => parts.push(SimplePart::Universal),
            '.' | '#' => {
                let name = take_name(input, &mut chars, i + 1, i + 1)?;
                if ch == '.' {
                    parts.push(SimplePart::Class(name));
                } else {
                    parts.push(SimplePart::Id(name));
                }
            }
            '[' => {
                let close = input[i..].find(']').map(|off| i + off)?;
                parts.push(parse_attr(&input[i + 1..close])?);
                while let Some(&(j, _)) = chars.peek() {
                    if j > close {
                        break;
                    }
                    chars.next();
                }
            }
            c if is_name_char(c) => {
                let name = take_name(input, &mut chars, i, i + c.len_utf8())?;
                parts.push(SimplePart::Tag(name.to_ascii_lowercase()));
            }
            _ => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(Compound { parts })
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Consume the rest of a name run; `start..end` already covers any consumed
/// leading character
fn take_name(
    input: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
    mut end: usize,
) -> Option<String> {
    while let Some(&(i, c)) = chars.peek() {
        if i == end && is_name_char(c) {
            end = i + c.len_utf8();
            chars.next();
        } else {
            break;
        }
    }
    if end > start {
        Some(input[start..end].to_string())
    } else {
        None
    }
}

fn parse_attr(body: &str) -> Option<SimplePart> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match body.split_once('=') {
        None => Some(SimplePart::Attr {
            name: body.to_string(),
            value: None,
        }),
        Some((name, raw)) => {
            let value = raw.trim().trim_matches('"').trim_matches('\'');
            Some(SimplePart::Attr {
                name: name.trim().to_string(),
                value: Some(value.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(tag: &str, id: Option<&str>, classes: &[&str]) -> NodeData {
        let mut data = NodeData::new(tag);
        if let Some(id) = id {
            data.attributes.insert("id".into(), id.into());
        }
        for class in classes {
            data.add_class(class);
        }
        data
    }

    #[test]
    fn tag_class_and_id_selectors() {
        let button = node("button", Some("save"), &["cl-btn"]);

        assert!(Selector::parse("button").matches_node(&button));
        assert!(Selector::parse(".cl-btn").matches_node(&button));
        assert!(Selector::parse("#save").matches_node(&button));
        assert!(Selector::parse("*").matches_node(&button));
        assert!(!Selector::parse(".cl-card").matches_node(&button));
    }

    #[test]
    fn compound_selectors_require_every_part() {
        let panel = node("div", Some("pane-1"), &["cl-collapse", "cl-show"]);

        assert!(Selector::parse("div.cl-collapse.cl-show").matches_node(&panel));
        assert!(Selector::parse(".cl-collapse.cl-show").matches_node(&panel));
        assert!(!Selector::parse("span.cl-collapse").matches_node(&panel));
    }

    #[test]
    fn attribute_selectors() {
        let mut trigger = node("a", None, &[]);
        trigger
            .attributes
            .insert("data-cl-toggle".into(), "collapse".into());

        assert!(Selector::parse("[data-cl-toggle]").matches_node(&trigger));
        assert!(Selector::parse("[data-cl-toggle=\"collapse\"]").matches_node(&trigger));
        assert!(!Selector::parse("[data-cl-toggle=\"tab\"]").matches_node(&trigger));
        assert!(!Selector::parse("[data-cl-toggle=\"collapse\"][href=\"#x\"]")
            .matches_node(&trigger));
    }

    #[test]
    fn selector_lists_match_any_branch() {
        let close = node("button", None, &["cl-alert-close"]);
        let list = Selector::parse(".cl-toast-close, .cl-alert-close");
        assert!(list.matches_node(&close));

        // Single-character tags in a list (the menu-item shape).
        let anchor = node("a", None, &[]);
        assert!(Selector::parse("a, button").matches_node(&anchor));
        assert!(!Selector::parse("b, button").matches_node(&anchor));
    }

    #[test]
    fn malformed_input_matches_nothing() {
        let anything = node("div", None, &["cl-show"]);
        assert!(!Selector::parse("").matches_node(&anything));
        assert!(!Selector::parse(">>>").matches_node(&anything));
        assert!(Selector::parse(">>>").is_empty());
    }
}
