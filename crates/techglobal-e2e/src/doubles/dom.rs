//! Minimal virtual DOM with the selector engine the locators need.
//!
//! Supported CSS: type, `*`, `#id`, `.class`, `[attr]`, `[attr=v]`,
//! `[attr^=v]`, `[attr$=v]`, `[attr*=v]`, `[attr~=v]`, descendant and `>`
//! combinators. That covers every selector in the page objects.

use crate::locator::{normalize_whitespace, text_matches, ElementSnapshot, Role, Segment};
use crate::result::{E2eError, E2eResult};

/// Element description used to render a page
#[derive(Debug, Clone, Default)]
pub struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    text: String,
    children: Vec<Node>,
    hidden: bool,
    disabled: bool,
    readonly: bool,
    value: Option<String>,
    handler: Option<String>,
}

impl Node {
    /// Element with a tag name
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Set the `id`
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Add space-separated classes
    #[must_use]
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.retain(|(n, _)| n != name);
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    /// Own text, rendered before the children
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// `display: none`
    #[must_use]
    pub const fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// `disabled`
    #[must_use]
    pub const fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// `readonly`
    #[must_use]
    pub const fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Form control value
    #[must_use]
    pub fn value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Click handler key interpreted by the owning app
    #[must_use]
    pub fn on_click(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }
}

#[derive(Debug)]
struct Element {
    node: Node,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// A rendered page, flattened in document order
#[derive(Debug)]
pub struct Dom {
    elements: Vec<Element>,
}

impl Dom {
    /// Flatten a rendered tree; index 0 is the root
    #[must_use]
    pub fn new(root: Node) -> Self {
        let mut dom = Self {
            elements: Vec::new(),
        };
        dom.push(root, None);
        dom
    }

    fn push(&mut self, mut node: Node, parent: Option<usize>) -> usize {
        let index = self.elements.len();
        let children = std::mem::take(&mut node.children);
        self.elements.push(Element {
            node,
            parent,
            children: Vec::new(),
        });
        for child in children {
            let child_index = self.push(child, Some(index));
            self.elements[index].children.push(child_index);
        }
        index
    }

    fn node(&self, index: usize) -> &Node {
        &self.elements[index].node
    }

    fn ancestors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.elements[index].parent, move |&i| {
            self.elements[i].parent
        })
    }

    fn descendants(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.elements[index].children.iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            out.push(i);
            stack.extend(self.elements[i].children.iter().rev().copied());
        }
        out
    }

    /// Attribute value; `id` and `class` included
    fn attr(&self, index: usize, name: &str) -> Option<String> {
        let node = self.node(index);
        if name == "class" {
            return (!node.classes.is_empty()).then(|| node.classes.join(" "));
        }
        node.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    fn text_content(&self, index: usize, skip_hidden: bool) -> String {
        let node = self.node(index);
        if skip_hidden && node.hidden {
            return String::new();
        }
        let mut parts = vec![node.text.clone()];
        for &child in &self.elements[index].children {
            parts.push(self.text_content(child, skip_hidden));
        }
        normalize_whitespace(&parts.join(" "))
    }

    fn is_visible(&self, index: usize) -> bool {
        !self.node(index).hidden && self.ancestors(index).all(|a| !self.node(a).hidden)
    }

    fn is_enabled(&self, index: usize) -> bool {
        !self.node(index).disabled
    }

    fn is_editable(&self, index: usize) -> bool {
        let node = self.node(index);
        matches!(node.tag.as_str(), "input" | "textarea") && !node.disabled && !node.readonly
    }

    fn role(&self, index: usize) -> Option<Role> {
        let node = self.node(index);
        let input_type = self.attr(index, "type").unwrap_or_else(|| "text".into());
        match node.tag.as_str() {
            "a" if self.attr(index, "href").is_some() => Some(Role::Link),
            "button" => Some(Role::Button),
            "input" if matches!(input_type.as_str(), "button" | "submit" | "reset") => {
                Some(Role::Button)
            }
            "input" if matches!(input_type.as_str(), "text" | "search" | "email" | "tel" | "url") => {
                Some(Role::Textbox)
            }
            "textarea" => Some(Role::Textbox),
            _ => None,
        }
    }

    fn accessible_name(&self, index: usize) -> String {
        if let Some(label) = self.attr(index, "aria-label") {
            return label;
        }
        let text = self.text_content(index, true);
        if text.is_empty() {
            self.attr(index, "placeholder").unwrap_or_default()
        } else {
            text
        }
    }

    /// Snapshot one element
    #[must_use]
    pub fn snapshot(&self, index: usize) -> ElementSnapshot {
        let node = self.node(index);
        ElementSnapshot {
            tag: node.tag.clone(),
            text: self.text_content(index, false),
            inner_text: if self.is_visible(index) {
                self.text_content(index, true)
            } else {
                String::new()
            },
            value: node.value.clone(),
            class_name: self.attr(index, "class").unwrap_or_default(),
            visible: self.is_visible(index),
            enabled: self.is_enabled(index),
            editable: self.is_editable(index),
        }
    }

    /// Click handler of the element or its nearest ancestor that has one
    #[must_use]
    pub fn handler_for(&self, index: usize) -> Option<&str> {
        std::iter::once(index)
            .chain(self.ancestors(index))
            .find_map(|i| self.node(i).handler.as_deref())
    }

    /// `href` of the element or its nearest link ancestor
    #[must_use]
    pub fn link_for(&self, index: usize) -> Option<String> {
        std::iter::once(index)
            .chain(self.ancestors(index))
            .find(|&i| self.node(i).tag == "a")
            .and_then(|i| self.attr(i, "href"))
    }

    /// Value of the `id` attribute
    #[must_use]
    pub fn id_of(&self, index: usize) -> Option<String> {
        self.attr(index, "id")
    }

    /// Resolve a locator chain to element indexes in document order
    ///
    /// # Errors
    ///
    /// Returns error if a CSS selector is outside the supported subset
    pub fn resolve(&self, chain: &[Segment]) -> E2eResult<Vec<usize>> {
        let mut current = vec![0];
        for segment in chain {
            current = match segment {
                Segment::Css { selector } => {
                    let complex = parse_selector(selector)?;
                    self.collect(&current, |i| self.matches_complex(i, &complex))
                }
                Segment::HasText { text } => current
                    .into_iter()
                    .filter(|&i| text_matches(&self.text_content(i, false), text))
                    .collect(),
                Segment::Text { text } => self.collect(&current, |i| {
                    text_matches(&self.text_content(i, false), text)
                        && !self.elements[i]
                            .children
                            .iter()
                            .any(|&c| text_matches(&self.text_content(c, false), text))
                }),
                Segment::Role { role, name } => self.collect(&current, |i| {
                    self.role(i) == Some(*role)
                        && name
                            .as_deref()
                            .map_or(true, |n| text_matches(&self.accessible_name(i), n))
                }),
                Segment::Placeholder { text } => self.collect(&current, |i| {
                    self.attr(i, "placeholder")
                        .is_some_and(|p| text_matches(&p, text))
                }),
                Segment::Nth { index } => {
                    let len = current.len() as i64;
                    let at = if *index < 0 { len + index } else { *index };
                    if (0..len).contains(&at) {
                        vec![current[at as usize]]
                    } else {
                        Vec::new()
                    }
                }
            };
        }
        Ok(current)
    }

    /// Descendants of any scope element that satisfy `keep`, deduplicated
    fn collect(&self, scopes: &[usize], keep: impl Fn(usize) -> bool) -> Vec<usize> {
        let mut found: Vec<usize> = scopes
            .iter()
            .flat_map(|&s| self.descendants(s))
            .filter(|&i| keep(i))
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    fn matches_complex(&self, index: usize, parts: &[Part]) -> bool {
        let Some((last, rest)) = parts.split_last() else {
            return false;
        };
        if !self.matches_compound(index, &last.compound) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }
        match last.combinator {
            Combinator::Child => self.elements[index]
                .parent
                .is_some_and(|p| self.matches_complex(p, rest)),
            Combinator::Descendant => self.ancestors(index).any(|a| self.matches_complex(a, rest)),
        }
    }

    fn matches_compound(&self, index: usize, compound: &Compound) -> bool {
        let node = self.node(index);
        if let Some(tag) = &compound.tag {
            if tag != &node.tag {
                return false;
            }
        }
        compound.conditions.iter().all(|condition| match condition {
            Condition::Id(id) => self.attr(index, "id").as_deref() == Some(id.as_str()),
            Condition::Class(class) => node.classes.iter().any(|c| c == class),
            Condition::Attr { name, op, value } => {
                let Some(actual) = self.attr(index, name) else {
                    return false;
                };
                match op {
                    AttrOp::Exists => true,
                    AttrOp::Equals => &actual == value,
                    AttrOp::Prefix => actual.starts_with(value.as_str()),
                    AttrOp::Suffix => actual.ends_with(value.as_str()),
                    AttrOp::Contains => actual.contains(value.as_str()),
                    AttrOp::Word => actual.split_whitespace().any(|w| w == value),
                }
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Prefix,
    Suffix,
    Contains,
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Id(String),
    Class(String),
    Attr {
        name: String,
        op: AttrOp,
        value: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    /// Relation to the previous part; ignored on the first
    combinator: Combinator,
    compound: Compound,
}

fn unsupported(selector: &str, why: &str) -> E2eError {
    E2eError::Action {
        locator: format!("css={selector}"),
        message: format!("unsupported selector: {why}"),
    }
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_selector(selector: &str) -> E2eResult<Vec<Part>> {
    let chars: Vec<char> = selector.trim().chars().collect();
    let mut parts = Vec::new();
    let mut pos = 0;
    let mut combinator = Combinator::Descendant;

    while pos < chars.len() {
        let mut compound = Compound::default();
        let start = pos;

        if chars[pos] == '*' {
            pos += 1;
        } else if is_ident(chars[pos]) {
            let end = scan_ident(&chars, pos);
            compound.tag = Some(chars[pos..end].iter().collect::<String>().to_ascii_lowercase());
            pos = end;
        }

        while pos < chars.len() {
            match chars[pos] {
                '#' | '.' => {
                    let end = scan_ident(&chars, pos + 1);
                    if end == pos + 1 {
                        return Err(unsupported(selector, "empty name"));
                    }
                    let name: String = chars[pos + 1..end].iter().collect();
                    compound.conditions.push(if chars[pos] == '#' {
                        Condition::Id(name)
                    } else {
                        Condition::Class(name)
                    });
                    pos = end;
                }
                '[' => {
                    let close = chars[pos..]
                        .iter()
                        .position(|&c| c == ']')
                        .map(|offset| pos + offset)
                        .ok_or_else(|| unsupported(selector, "unclosed attribute"))?;
                    let inner: String = chars[pos + 1..close].iter().collect();
                    compound.conditions.push(parse_attr(selector, &inner)?);
                    pos = close + 1;
                }
                _ => break,
            }
        }

        if pos == start {
            return Err(unsupported(selector, "unexpected character"));
        }
        parts.push(Part {
            combinator,
            compound,
        });

        let mut saw_space = false;
        combinator = Combinator::Descendant;
        while pos < chars.len() && (chars[pos].is_whitespace() || chars[pos] == '>') {
            if chars[pos] == '>' {
                combinator = Combinator::Child;
            }
            saw_space = true;
            pos += 1;
        }
        if pos < chars.len() && !saw_space {
            return Err(unsupported(selector, "unexpected character"));
        }
    }

    if parts.is_empty() {
        return Err(unsupported(selector, "empty selector"));
    }
    Ok(parts)
}

fn scan_ident(chars: &[char], mut pos: usize) -> usize {
    while pos < chars.len() && is_ident(chars[pos]) {
        pos += 1;
    }
    pos
}

fn parse_attr(selector: &str, inner: &str) -> E2eResult<Condition> {
    let ops = [
        ("^=", AttrOp::Prefix),
        ("$=", AttrOp::Suffix),
        ("*=", AttrOp::Contains),
        ("~=", AttrOp::Word),
        ("=", AttrOp::Equals),
    ];
    for (token, op) in ops {
        if let Some((name, value)) = inner.split_once(token) {
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            return Ok(Condition::Attr {
                name: name.trim().to_string(),
                op,
                value: value.to_string(),
            });
        }
    }
    let name = inner.trim();
    if name.is_empty() || !name.chars().all(is_ident) {
        return Err(unsupported(selector, "bad attribute"));
    }
    Ok(Condition::Attr {
        name: name.to_string(),
        op: AttrOp::Exists,
        value: String::new(),
    })
}
