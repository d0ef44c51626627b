//! Minimal CSS selector engine for the simulator.
//!
//! Supports type, `*`, `#id`, `.class`, `[attr]`, `[attr=v]`, `[attr*=v]`,
//! `[attr^=v]`, `[attr$=v]`, descendant and child combinators and selector
//! lists. Anything else is rejected so that a typo in a selector catalog
//! fails loudly instead of silently matching nothing.

use super::dom::{Dom, Node};
use crate::result::{TenfootError, TenfootResult};
use crate::selector::split_top_level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Contains,
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSel {
    name: String,
    matcher: Option<(AttrOp, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// `parts[i]` and `parts[i + 1]` are joined by `combinators[i]`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
    combinators: Vec<Combinator>,
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList {
    alternatives: Vec<Complex>,
}

impl SelectorList {
    pub fn parse(selector: &str) -> TenfootResult<Self> {
        let invalid = |message: &str| TenfootError::InvalidSelector {
            selector: selector.to_string(),
            message: message.to_string(),
        };
        let mut alternatives = Vec::new();
        for part in split_top_level(selector, ',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty selector"));
            }
            alternatives.push(Parser::new(part).complex().map_err(|m| invalid(&m))?);
        }
        Ok(Self { alternatives })
    }

    pub fn matches(&self, dom: &Dom, index: usize) -> bool {
        self.alternatives.iter().any(|c| c.matches(dom, index))
    }
}

impl Complex {
    fn matches(&self, dom: &Dom, index: usize) -> bool {
        self.matches_from(dom, index, self.parts.len() - 1)
    }

    fn matches_from(&self, dom: &Dom, index: usize, part: usize) -> bool {
        if !self.parts[part].matches(dom.node(index)) {
            return false;
        }
        if part == 0 {
            return true;
        }
        match self.combinators[part - 1] {
            Combinator::Child => dom
                .parent(index)
                .is_some_and(|p| self.matches_from(dom, p, part - 1)),
            Combinator::Descendant => {
                let mut current = dom.parent(index);
                while let Some(ancestor) = current {
                    if self.matches_from(dom, ancestor, part - 1) {
                        return true;
                    }
                    current = dom.parent(ancestor);
                }
                false
            }
        }
    }
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(&node.tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|wanted| node.classes().any(|c| c == wanted))
        {
            return false;
        }
        self.attrs.iter().all(|sel| match node.attr(&sel.name) {
            None => false,
            Some(value) => match &sel.matcher {
                None => true,
                Some((AttrOp::Equals, wanted)) => value == wanted,
                Some((AttrOp::Contains, wanted)) => value.contains(wanted.as_str()),
                Some((AttrOp::Prefix, wanted)) => value.starts_with(wanted.as_str()),
                Some((AttrOp::Suffix, wanted)) => value.ends_with(wanted.as_str()),
            },
        })
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn complex(&mut self) -> Result<Complex, String> {
        let mut parts = Vec::new();
        let mut combinators = Vec::new();
        let _ = self.skip_whitespace();
        loop {
            parts.push(self.compound()?);
            let had_space = self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    let _ = self.skip_whitespace();
                    combinators.push(Combinator::Child);
                }
                Some('+' | '~') => return Err("sibling combinators are not supported".into()),
                Some(_) if had_space => combinators.push(Combinator::Descendant),
                Some(c) => return Err(format!("unexpected {c:?}")),
            }
        }
        Ok(Complex { parts, combinators })
    }

    fn compound(&mut self) -> Result<Compound, String> {
        let mut compound = Compound::default();
        let mut any = false;
        if self.peek() == Some('*') {
            self.pos += 1;
            compound.tag = Some("*".into());
            any = true;
        } else if self.peek().is_some_and(is_ident_start) {
            compound.tag = Some(self.ident()?);
            any = true;
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attribute()?);
                }
                Some(':') => return Err("pseudo-classes are not supported".into()),
                _ => break,
            }
            any = true;
        }
        if any {
            Ok(compound)
        } else {
            Err(match self.peek() {
                Some(c) => format!("unexpected {c:?}"),
                None => "dangling combinator".into(),
            })
        }
    }

    fn ident(&mut self) -> Result<String, String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err("expected identifier".into());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> Result<AttrSel, String> {
        let _ = self.skip_whitespace();
        let name = self.ident()?;
        let _ = self.skip_whitespace();
        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttrSel {
                    name,
                    matcher: None,
                });
            }
            Some('=') => AttrOp::Equals,
            Some('*') => AttrOp::Contains,
            Some('^') => AttrOp::Prefix,
            Some('$') => AttrOp::Suffix,
            _ => return Err(format!("unsupported attribute operator in [{name}")),
        };
        self.pos += 1;
        if op != AttrOp::Equals {
            if self.peek() != Some('=') {
                return Err(format!("unsupported attribute operator in [{name}"));
            }
            self.pos += 1;
        }
        let _ = self.skip_whitespace();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != q) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err("unterminated string".into());
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                value
            }
            _ => self.ident()?,
        };
        let _ = self.skip_whitespace();
        if self.peek() != Some(']') {
            return Err(format!("expected ']' after [{name}"));
        }
        self.pos += 1;
        Ok(AttrSel {
            name,
            matcher: Some((op, value)),
        })
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-'
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Indices of every node matching `selector` inside the first node
/// matching `scope`
pub(crate) fn query_all(
    dom: &Dom,
    scope: Option<&str>,
    selector: &str,
) -> TenfootResult<Vec<usize>> {
    let selector = SelectorList::parse(selector)?;
    let candidates = match scope {
        Some(scope) => {
            let scope = SelectorList::parse(scope)?;
            match dom.all().into_iter().find(|&i| scope.matches(dom, i)) {
                Some(root) => dom.descendants(root),
                None => return Ok(Vec::new()),
            }
        }
        None => dom.all(),
    };
    Ok(candidates
        .into_iter()
        .filter(|&i| selector.matches(dom, i))
        .collect())
}
