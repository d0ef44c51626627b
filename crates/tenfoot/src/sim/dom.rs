//! Element tree rendered by the simulator.

use crate::driver::ElementSnapshot;
use std::collections::BTreeMap;

/// One element
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub hidden: bool,
    pub opacity: f64,
}

impl Node {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }
}

/// Element builder
#[derive(Debug, Clone)]
pub(crate) struct El {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: String,
    hidden: bool,
    opacity: f64,
}

impl El {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            text: String::new(),
            hidden: false,
            opacity: 1.0,
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(mut self, class: &str) -> Self {
        let joined = match self.attributes.get("class") {
            Some(existing) => format!("{existing} {class}"),
            None => class.to_string(),
        };
        let _ = self.attributes.insert("class".to_string(), joined);
        self
    }

    pub fn class_if(self, condition: bool, class: &str) -> Self {
        if condition {
            self.class(class)
        } else {
            self
        }
    }

    pub fn test_id(self, id: &str) -> Self {
        self.attr("data-testid", id)
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let _ = self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub const fn hidden_if(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub const fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Arena of nodes; index 0 is `<html>`, index 1 is `<body>`
#[derive(Debug, Clone)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    pub const BODY: usize = 1;

    pub fn new() -> Self {
        let mut dom = Self { nodes: Vec::new() };
        let _ = dom.push(None, El::new("html"));
        let _ = dom.push(Some(0), El::new("body"));
        dom
    }

    fn push(&mut self, parent: Option<usize>, el: El) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            tag: el.tag,
            attributes: el.attributes,
            text: el.text,
            parent,
            children: Vec::new(),
            hidden: el.hidden,
            opacity: el.opacity,
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(index);
        }
        index
    }

    /// Append `el` under `parent`, returning its index
    pub fn append(&mut self, parent: usize, el: El) -> usize {
        self.push(Some(parent), el)
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.nodes[index].parent
    }

    /// Every node in document order
    pub fn all(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.walk(0, &mut out);
        out
    }

    /// Descendants of `index` in document order (excluding `index`)
    pub fn descendants(&self, index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for &child in &self.nodes[index].children {
            self.walk(child, &mut out);
        }
        out
    }

    fn walk(&self, index: usize, out: &mut Vec<usize>) {
        out.push(index);
        for &child in &self.nodes[index].children {
            self.walk(child, out);
        }
    }

    /// Whitespace-collapsed text of the node and its descendants
    pub fn text_content(&self, index: usize) -> String {
        let mut parts = Vec::new();
        self.collect_text(index, &mut parts);
        parts
            .iter()
            .flat_map(|p| p.split_whitespace())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn collect_text<'a>(&'a self, index: usize, out: &mut Vec<&'a str>) {
        let node = &self.nodes[index];
        if !node.text.is_empty() {
            out.push(&node.text);
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    fn ancestry(&self, index: usize) -> impl Iterator<Item = &Node> {
        std::iter::successors(Some(index), move |&i| self.nodes[i].parent).map(|i| &self.nodes[i])
    }

    /// Snapshot with inherited visibility and multiplied opacity
    pub fn snapshot(&self, index: usize) -> ElementSnapshot {
        let node = &self.nodes[index];
        ElementSnapshot {
            tag: node.tag.clone(),
            id: node.attr("id").map(str::to_string),
            classes: node.classes().map(str::to_string).collect(),
            attributes: node.attributes.clone(),
            text: self.text_content(index),
            visible: self.ancestry(index).all(|n| !n.hidden),
            opacity: self.ancestry(index).map(|n| n.opacity).product(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Dom, usize, usize) {
        let mut dom = Dom::new();
        let row = dom.append(Dom::BODY, El::new("div").id("row").opacity(0.5));
        let item = dom.append(
            row,
            El::new("div").class("item").class("focused").test_id("netflix"),
        );
        let _ = dom.append(item, El::new("span").text("  Net "));
        let _ = dom.append(item, El::new("span").text("flix"));
        (dom, row, item)
    }

    #[test]
    fn test_document_order() {
        let (dom, row, item) = sample();
        let all = dom.all();
        assert_eq!(&all[..4], &[0, Dom::BODY, row, item]);
        assert_eq!(dom.descendants(row).len(), 3);
    }

    #[test]
    fn test_snapshot_inherits_opacity_and_text() {
        let (dom, _, item) = sample();
        let snap = dom.snapshot(item);
        assert_eq!(snap.text, "Net flix");
        assert!((snap.opacity - 0.5).abs() < f64::EPSILON);
        assert_eq!(snap.classes, vec!["item", "focused"]);
        assert_eq!(snap.test_id(), Some("netflix"));
    }

    #[test]
    fn test_hidden_parent_hides_children() {
        let mut dom = Dom::new();
        let overlay = dom.append(Dom::BODY, El::new("div").hidden_if(true));
        let child = dom.append(overlay, El::new("button"));
        assert!(!dom.snapshot(child).visible);
    }
}
