//! HeadlessPage: an in-memory element tree implementing `RenderTarget`.
//!
//! Fragments are parsed with `scraper` and flattened into an arena indexed by
//! element id. There is no layout, styling, or scripting; the page exists so
//! widgets can be driven and inspected without a browser.

use super::{escape_html, RenderTarget};
use crate::{Error, Result};
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use std::sync::Mutex;

const VOID_ELEMENTS: &[&str] = &["area", "br", "hr", "img", "input", "link", "meta", "source"];

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    children: Vec<usize>,
}

impl Node {
    fn element(tag: &str) -> Self {
        Node {
            kind: NodeKind::Element {
                tag: tag.to_string(),
                attrs: Vec::new(),
            },
            children: Vec::new(),
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }
}

#[derive(Debug)]
struct Dom {
    // index 0 is <body>; detached slots are listed in `free` and reused
    nodes: Vec<Node>,
    free: Vec<usize>,
    by_id: HashMap<String, usize>,
    scripts: Vec<String>,
}

impl Dom {
    fn new() -> Self {
        Dom {
            nodes: vec![Node::element("body")],
            free: Vec::new(),
            by_id: HashMap::new(),
            scripts: Vec::new(),
        }
    }

    fn lookup(&self, id: &str) -> Result<usize> {
        self.by_id
            .get(id)
            .copied()
            .ok_or_else(|| Error::MissingElement(id.to_string()))
    }

    fn push(&mut self, node: Node) -> usize {
        let id = node.attr("id").map(str::to_string);
        let idx = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        if let Some(id) = id {
            self.by_id.insert(id, idx);
        }
        idx
    }

    fn detach_children(&mut self, idx: usize) {
        let children = std::mem::take(&mut self.nodes[idx].children);
        let mut stack = children;
        while let Some(child) = stack.pop() {
            if let Some(id) = self.nodes[child].attr("id").map(|s| s.to_string()) {
                if self.by_id.get(&id) == Some(&child) {
                    self.by_id.remove(&id);
                }
            }
            stack.extend(std::mem::take(&mut self.nodes[child].children));
            self.free.push(child);
        }
    }

    // Copy a parsed scraper subtree into the arena under `parent`.
    fn adopt(&mut self, parent: usize, source: ElementRef<'_>) {
        let mut stack = vec![(source, parent)];
        while let Some((el, into)) = stack.pop() {
            for child in el.children() {
                if let Some(child_el) = ElementRef::wrap(child) {
                    let node = Node {
                        kind: NodeKind::Element {
                            tag: child_el.value().name().to_string(),
                            attrs: child_el
                                .value()
                                .attrs()
                                .map(|(k, v)| (k.to_string(), v.to_string()))
                                .collect(),
                        },
                        children: Vec::new(),
                    };
                    let idx = self.push(node);
                    self.nodes[into].children.push(idx);
                    // sibling order is fixed by the push above
                    stack.push((child_el, idx));
                } else if let Some(text) = child.value().as_text() {
                    let text: &str = text;
                    let idx = self.push(Node {
                        kind: NodeKind::Text(text.to_string()),
                        children: Vec::new(),
                    });
                    self.nodes[into].children.push(idx);
                }
            }
        }
    }

    fn text_of(&self, idx: usize) -> String {
        let mut out = String::new();
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            if let NodeKind::Text(t) = &self.nodes[i].kind {
                out.push_str(t);
            }
            stack.extend(self.nodes[i].children.iter().rev());
        }
        out
    }

    fn serialize(&self, idx: usize, out: &mut String) {
        match &self.nodes[idx].kind {
            NodeKind::Text(t) => out.push_str(&escape_html(t)),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (k, v) in attrs {
                    if v.is_empty() {
                        out.push_str(&format!(" {}", k));
                    } else {
                        out.push_str(&format!(" {}=\"{}\"", k, escape_html(v)));
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for &child in &self.nodes[idx].children {
                    self.serialize(child, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }
}

/// In-memory page used for tests, previews and the CLI.
pub struct HeadlessPage {
    dom: Mutex<Dom>,
}

impl HeadlessPage {
    pub fn new() -> Self {
        HeadlessPage {
            dom: Mutex::new(Dom::new()),
        }
    }

    /// Build a page whose body holds `html`.
    pub fn from_body(html: &str) -> Self {
        let page = Self::new();
        {
            let mut dom = page.dom.lock().unwrap();
            let fragment = Html::parse_fragment(html);
            dom.adopt(0, fragment.root_element());
        }
        page
    }

    pub fn attribute(&self, id: &str, name: &str) -> Option<String> {
        let dom = self.dom.lock().unwrap();
        let idx = dom.lookup(id).ok()?;
        dom.nodes[idx].attr(name).map(|s| s.to_string())
    }

    pub fn has_attribute(&self, id: &str, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Concatenated text content of `id` and its descendants.
    pub fn text(&self, id: &str) -> Option<String> {
        let dom = self.dom.lock().unwrap();
        let idx = dom.lookup(id).ok()?;
        Some(dom.text_of(idx))
    }

    /// Ids of the element children of `id`, in document order.
    pub fn child_ids(&self, id: &str) -> Vec<String> {
        let dom = self.dom.lock().unwrap();
        let Ok(idx) = dom.lookup(id) else {
            return Vec::new();
        };
        dom.nodes[idx]
            .children
            .iter()
            .filter_map(|&c| dom.nodes[c].attr("id").map(|s| s.to_string()))
            .collect()
    }

    /// Ids of every attached element with the given tag, in document order.
    pub fn ids_by_tag(&self, tag_name: &str) -> Vec<String> {
        let dom = self.dom.lock().unwrap();
        let mut out = Vec::new();
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            if let NodeKind::Element { tag, .. } = &dom.nodes[i].kind {
                if tag == tag_name {
                    if let Some(id) = dom.nodes[i].attr("id") {
                        out.push(id.to_string());
                    }
                }
            }
            stack.extend(dom.nodes[i].children.iter().rev());
        }
        out
    }

    pub fn inner_html(&self, id: &str) -> Option<String> {
        let dom = self.dom.lock().unwrap();
        let idx = dom.lookup(id).ok()?;
        let mut out = String::new();
        for &child in &dom.nodes[idx].children {
            dom.serialize(child, &mut out);
        }
        Some(out)
    }

    /// The whole body serialized as HTML.
    pub fn to_html(&self) -> String {
        let dom = self.dom.lock().unwrap();
        let mut out = String::new();
        dom.serialize(0, &mut out);
        out
    }

    /// `src` of every injected script, in injection order.
    pub fn scripts(&self) -> Vec<String> {
        self.dom.lock().unwrap().scripts.clone()
    }
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderTarget for HeadlessPage {
    fn has_element(&self, id: &str) -> bool {
        self.dom.lock().unwrap().by_id.contains_key(id)
    }

    fn ensure_container(&self, id: &str) {
        let mut dom = self.dom.lock().unwrap();
        if dom.by_id.contains_key(id) {
            return;
        }
        let mut div = Node::element("div");
        if let NodeKind::Element { attrs, .. } = &mut div.kind {
            attrs.push(("id".to_string(), id.to_string()));
        }
        let idx = dom.push(div);
        dom.nodes[0].children.push(idx);
    }

    fn set_inner_html(&self, id: &str, html: &str) -> Result<()> {
        let mut dom = self.dom.lock().unwrap();
        let idx = dom.lookup(id)?;
        dom.detach_children(idx);
        let fragment = Html::parse_fragment(html);
        dom.adopt(idx, fragment.root_element());
        Ok(())
    }

    fn set_text(&self, id: &str, text: &str) -> Result<()> {
        let mut dom = self.dom.lock().unwrap();
        let idx = dom.lookup(id)?;
        dom.detach_children(idx);
        let t = dom.push(Node {
            kind: NodeKind::Text(text.to_string()),
            children: Vec::new(),
        });
        dom.nodes[idx].children.push(t);
        Ok(())
    }

    fn set_attribute(&self, id: &str, name: &str, value: &str) -> Result<()> {
        let mut dom = self.dom.lock().unwrap();
        let idx = dom.lookup(id)?;
        if let NodeKind::Element { attrs, .. } = &mut dom.nodes[idx].kind {
            match attrs.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
        Ok(())
    }

    fn remove_attribute(&self, id: &str, name: &str) -> Result<()> {
        let mut dom = self.dom.lock().unwrap();
        let idx = dom.lookup(id)?;
        if let NodeKind::Element { attrs, .. } = &mut dom.nodes[idx].kind {
            attrs.retain(|(k, _)| k != name);
        }
        Ok(())
    }

    fn inject_script(&self, src: &str) {
        let mut dom = self.dom.lock().unwrap();
        let mut script = Node::element("script");
        if let NodeKind::Element { attrs, .. } = &mut script.kind {
            attrs.push(("src".to_string(), src.to_string()));
        }
        let idx = dom.push(script);
        // Scripts go before the first existing child, like inserting ahead of the first <script>.
        dom.nodes[0].children.insert(0, idx);
        dom.scripts.push(src.to_string());
    }
}
