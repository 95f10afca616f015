//! In-memory DOM implementing [`Page`] without a browser.
//!
//! Nodes carry a tag, attributes and their own text. Queries are evaluated
//! structurally against the same [`Query`] steps that render to XPath, so a
//! test exercises exactly the lookups a browser would receive.
//!
//! Timing and widget behavior are scriptable per node:
//! - `appear_after` keeps a node out of query results until a delay passes
//! - `reveal_after` keeps it present but not interactable for a delay
//! - `covered_for` keeps an overlay on top of it for a delay; clicks land on
//!   the overlay
//! - `obscured_for(k)` makes its next `k` clicks fail as intercepted
//! - [`MockPage::on_click`] attaches or detaches another node when clicked

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::locator::{Axis, ElementHandle, Page, Predicate, Query, ScriptArg, SearchContext, Step};
use crate::result::{FormError, FormResult};

/// Index of a node in a [`MockPage`]
pub type NodeId = usize;

/// Description of a node before it is appended
#[derive(Debug, Clone)]
pub struct MockNode {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    enabled: bool,
    attached: bool,
    appear_after: Duration,
    reveal_after: Duration,
    covered_for: Duration,
    obscured_clicks: u32,
}

impl MockNode {
    /// A visible, enabled, attached element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            text: String::new(),
            enabled: true,
            attached: true,
            appear_after: Duration::ZERO,
            reveal_after: Duration::ZERO,
            covered_for: Duration::ZERO,
            obscured_clicks: 0,
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the node's own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Disabled: found by queries but never interactable
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Start outside the tree; attach later via [`MockPage::on_click`]
    #[must_use]
    pub const fn detached(mut self) -> Self {
        self.attached = false;
        self
    }

    /// Absent from query results until `delay` after the page was built
    #[must_use]
    pub const fn appear_after(mut self, delay: Duration) -> Self {
        self.appear_after = delay;
        self
    }

    /// Present but not interactable until `delay` after the page was built
    #[must_use]
    pub const fn reveal_after(mut self, delay: Duration) -> Self {
        self.reveal_after = delay;
        self
    }

    /// Under a closing overlay until `delay` after the page was built
    #[must_use]
    pub const fn covered_for(mut self, delay: Duration) -> Self {
        self.covered_for = delay;
        self
    }

    /// The next `clicks` clicks on this node are intercepted
    #[must_use]
    pub const fn obscured_for(mut self, clicks: u32) -> Self {
        self.obscured_clicks = clicks;
        self
    }
}

/// Side effect of clicking a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickEffect {
    /// Put the node (back) into the tree
    Attach(NodeId),
    /// Take the node out of the tree
    Detach(NodeId),
}

/// Something the code under test did to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// A query was evaluated (page- or element-scoped)
    Query(String),
    /// A click landed
    Click(NodeId),
    /// A click was intercepted
    ObscuredClick(NodeId),
    /// A value was cleared
    Clear(NodeId),
    /// Text was typed
    Keys(NodeId, String),
    /// A file path was injected
    Upload(NodeId, PathBuf),
    /// A script was called; element args render as `#id`
    Script(Vec<String>),
}

#[derive(Debug)]
struct NodeData {
    node: MockNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    value: String,
    effects: Vec<ClickEffect>,
}

#[derive(Debug)]
struct Dom {
    nodes: Vec<NodeData>,
    built: Instant,
    log: Vec<Interaction>,
}

impl Dom {
    fn present(&self, id: NodeId) -> bool {
        let data = &self.nodes[id];
        data.node.attached && self.built.elapsed() >= data.node.appear_after
    }

    /// Present itself and on a present ancestor chain
    fn in_tree(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if !self.present(current) {
                return false;
            }
            cursor = self.nodes[current].parent;
        }
        true
    }

    fn covered(&self, id: NodeId) -> bool {
        self.built.elapsed() < self.nodes[id].node.covered_for
    }

    fn interactable(&self, id: NodeId) -> bool {
        if id == 0 || !self.in_tree(id) || self.covered(id) {
            return false;
        }
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = &self.nodes[current].node;
            if self.built.elapsed() < node.reveal_after {
                return false;
            }
            cursor = self.nodes[current].parent;
        }
        self.nodes[id].node.enabled
    }

    fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![0];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        order
    }

    fn descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[id].children {
            if self.present(child) {
                out.push(child);
                self.descendants(child, out);
            }
        }
    }

    fn matches(&self, id: NodeId, step: &Step) -> bool {
        let node = &self.nodes[id].node;
        if id == 0 {
            return false;
        }
        if let Some(ref tag) = step.tag {
            if &node.tag != tag {
                return false;
            }
        }
        step.predicates.iter().all(|p| predicate_holds(node, p))
    }

    fn evaluate(&self, context: NodeId, query: &Query) -> Vec<NodeId> {
        let start = if query.is_relative() { context } else { 0 };
        if !self.in_tree(start) {
            return Vec::new();
        }
        let mut current = vec![start];
        for step in query.steps() {
            let mut next = Vec::new();
            for &id in &current {
                match step.axis {
                    Axis::Parent => next.extend(self.nodes[id].parent),
                    Axis::Child => next.extend(
                        self.nodes[id]
                            .children
                            .iter()
                            .copied()
                            .filter(|&c| self.present(c) && self.matches(c, step)),
                    ),
                    Axis::Descendant => {
                        let mut below = Vec::new();
                        self.descendants(id, &mut below);
                        next.extend(below.into_iter().filter(|&d| self.matches(d, step)));
                    }
                }
            }
            current = next;
        }
        let selected: HashSet<NodeId> = current.into_iter().collect();
        self.document_order()
            .into_iter()
            .filter(|id| selected.contains(id))
            .collect()
    }

    fn describe(&self, id: NodeId) -> String {
        let node = &self.nodes[id].node;
        let attrs: String = node
            .attrs
            .iter()
            .map(|(k, v)| format!(" {k}=\"{v}\""))
            .collect();
        if node.text.is_empty() {
            format!("<{}{attrs}>", node.tag)
        } else {
            format!("<{}{attrs}>{}", node.tag, node.text)
        }
    }
}

fn predicate_holds(node: &MockNode, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::AttrContains { name, value } => node
            .attrs
            .get(name)
            .is_some_and(|found| found.contains(value.as_str())),
        Predicate::AttrEquals { name, value } => node.attrs.get(name) == Some(value),
        Predicate::TextContains(t) => node.text.contains(t.as_str()),
        Predicate::TextEquals(t) => !node.text.is_empty() && &node.text == t,
        Predicate::TextNormalized(t) => {
            node.text.split_whitespace().collect::<Vec<_>>().join(" ") == *t
        }
        Predicate::AnyOf(inner) => inner.iter().any(|p| predicate_holds(node, p)),
    }
}

/// A scriptable in-memory page
#[derive(Debug, Clone)]
pub struct MockPage {
    dom: Rc<RefCell<Dom>>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPage {
    /// An empty document
    #[must_use]
    pub fn new() -> Self {
        let root = NodeData {
            node: MockNode::new("#document"),
            parent: None,
            children: Vec::new(),
            value: String::new(),
            effects: Vec::new(),
        };
        Self {
            dom: Rc::new(RefCell::new(Dom {
                nodes: vec![root],
                built: Instant::now(),
                log: Vec::new(),
            })),
        }
    }

    /// The document node
    #[must_use]
    pub const fn root(&self) -> NodeId {
        0
    }

    /// Append `node` as the last child of `parent`
    pub fn append(&self, parent: NodeId, node: MockNode) -> NodeId {
        let mut dom = self.dom.borrow_mut();
        let id = dom.nodes.len();
        dom.nodes.push(NodeData {
            node,
            parent: Some(parent),
            children: Vec::new(),
            value: String::new(),
            effects: Vec::new(),
        });
        dom.nodes[parent].children.push(id);
        id
    }

    /// Run `effect` whenever `trigger` is clicked successfully
    pub fn on_click(&self, trigger: NodeId, effect: ClickEffect) {
        self.dom.borrow_mut().nodes[trigger].effects.push(effect);
    }

    /// Restart the clock that `appear_after` / `reveal_after` count from
    pub fn restart_clock(&self) {
        self.dom.borrow_mut().built = Instant::now();
    }

    /// Current value of a node
    #[must_use]
    pub fn value(&self, id: NodeId) -> String {
        self.dom.borrow().nodes[id].value.clone()
    }

    /// Everything that happened so far
    #[must_use]
    pub fn log(&self) -> Vec<Interaction> {
        self.dom.borrow().log.clone()
    }

    /// Forget the interaction log
    pub fn clear_log(&self) {
        self.dom.borrow_mut().log.clear();
    }

    /// Successful clicks on `id`
    #[must_use]
    pub fn clicks(&self, id: NodeId) -> usize {
        self.dom
            .borrow()
            .log
            .iter()
            .filter(|i| **i == Interaction::Click(id))
            .count()
    }

    /// Intercepted clicks, on any node
    #[must_use]
    pub fn obscured_clicks(&self) -> usize {
        self.dom
            .borrow()
            .log
            .iter()
            .filter(|i| matches!(i, Interaction::ObscuredClick(_)))
            .count()
    }

    /// Handle for a node, as if it had been found by a query
    #[must_use]
    pub fn element(&self, id: NodeId) -> MockElement {
        MockElement {
            dom: Rc::clone(&self.dom),
            id,
        }
    }
}

impl SearchContext for MockPage {
    type Element = MockElement;

    fn find_all(&self, query: &Query) -> FormResult<Vec<MockElement>> {
        let found = {
            let mut dom = self.dom.borrow_mut();
            dom.log.push(Interaction::Query(query.to_xpath()));
            dom.evaluate(0, query)
        };
        Ok(found.into_iter().map(|id| self.element(id)).collect())
    }
}

impl Page for MockPage {
    fn call_function(
        &self,
        _declaration: &str,
        args: &[ScriptArg<'_, MockElement>],
    ) -> FormResult<()> {
        let mut dom = self.dom.borrow_mut();
        let mut targets = Vec::new();
        let mut strings = Vec::new();
        let rendered = args
            .iter()
            .map(|arg| match arg {
                ScriptArg::Element(e) => {
                    targets.push(e.id);
                    format!("#{}", e.id)
                }
                ScriptArg::Str(s) => {
                    strings.push((*s).to_string());
                    (*s).to_string()
                }
            })
            .collect();
        dom.log.push(Interaction::Script(rendered));
        for (id, value) in targets.into_iter().zip(strings) {
            if !dom.in_tree(id) {
                return Err(FormError::script(format!("{} is detached", dom.describe(id))));
            }
            dom.nodes[id].value = value;
        }
        Ok(())
    }
}

/// Handle to a node of a [`MockPage`]
#[derive(Debug, Clone)]
pub struct MockElement {
    dom: Rc<RefCell<Dom>>,
    id: NodeId,
}

impl MockElement {
    /// Node id
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Tag name
    #[must_use]
    pub fn tag(&self) -> String {
        self.dom.borrow().nodes[self.id].node.tag.clone()
    }

    fn live(&self, dom: &Dom) -> FormResult<()> {
        if dom.in_tree(self.id) {
            Ok(())
        } else {
            Err(FormError::stale(dom.describe(self.id)))
        }
    }
}

impl SearchContext for MockElement {
    type Element = Self;

    fn find_all(&self, query: &Query) -> FormResult<Vec<Self>> {
        self.find_within(query)
    }
}

impl ElementHandle for MockElement {
    fn describe(&self) -> String {
        self.dom.borrow().describe(self.id)
    }

    fn is_interactable(&self) -> FormResult<bool> {
        Ok(self.dom.borrow().interactable(self.id))
    }

    fn click(&self) -> FormResult<()> {
        let mut dom = self.dom.borrow_mut();
        self.live(&dom)?;
        if dom.covered(self.id) {
            dom.log.push(Interaction::ObscuredClick(self.id));
            return Err(FormError::ElementObscured {
                element: dom.describe(self.id),
                obscured_by: "<div class=\"modal-backdrop fade\">".to_string(),
                attempts: 1,
            });
        }
        if !dom.interactable(self.id) {
            return Err(FormError::driver(format!(
                "element not interactable: {}",
                dom.describe(self.id)
            )));
        }
        if dom.nodes[self.id].node.obscured_clicks > 0 {
            dom.nodes[self.id].node.obscured_clicks -= 1;
            dom.log.push(Interaction::ObscuredClick(self.id));
            return Err(FormError::ElementObscured {
                element: dom.describe(self.id),
                obscured_by: "<div class=\"chosen-drop\">".to_string(),
                attempts: 1,
            });
        }
        dom.log.push(Interaction::Click(self.id));
        let effects = dom.nodes[self.id].effects.clone();
        for effect in effects {
            match effect {
                ClickEffect::Attach(target) => dom.nodes[target].node.attached = true,
                ClickEffect::Detach(target) => dom.nodes[target].node.attached = false,
            }
        }
        Ok(())
    }

    fn clear(&self) -> FormResult<()> {
        let mut dom = self.dom.borrow_mut();
        self.live(&dom)?;
        dom.nodes[self.id].value.clear();
        dom.log.push(Interaction::Clear(self.id));
        Ok(())
    }

    fn send_keys(&self, text: &str) -> FormResult<()> {
        let mut dom = self.dom.borrow_mut();
        self.live(&dom)?;
        dom.nodes[self.id].value.push_str(text);
        dom.log.push(Interaction::Keys(self.id, text.to_string()));
        Ok(())
    }

    fn upload_file(&self, path: &Path) -> FormResult<()> {
        let mut dom = self.dom.borrow_mut();
        self.live(&dom)?;
        dom.nodes[self.id].value = path.display().to_string();
        dom.log.push(Interaction::Upload(self.id, path.to_path_buf()));
        Ok(())
    }

    fn find_within(&self, query: &Query) -> FormResult<Vec<Self>> {
        let found = {
            let mut dom = self.dom.borrow_mut();
            dom.log.push(Interaction::Query(query.to_xpath()));
            dom.evaluate(self.id, query)
        };
        Ok(found
            .into_iter()
            .map(|id| Self {
                dom: Rc::clone(&self.dom),
                id,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn labeled_field(page: &MockPage, label: &str) -> (NodeId, NodeId) {
        let field = page.append(page.root(), MockNode::new("div").attr("class", "field"));
        let _ = page.append(field, MockNode::new("label").text(label));
        let input = page.append(field, MockNode::new("input"));
        (field, input)
    }

    #[test]
    fn test_parent_then_descendant() {
        let page = MockPage::new();
        let (_, input) = labeled_field(&page, "Event Name");
        let q = Query::anywhere("*")
            .text_contains("Event Name")
            .parent()
            .descendant("input");
        let found = page.find_all(&q).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), input);
    }

    #[test]
    fn test_results_in_document_order() {
        let page = MockPage::new();
        let a = page.append(page.root(), MockNode::new("div"));
        let b = page.append(page.root(), MockNode::new("li"));
        let nested = page.append(a, MockNode::new("li"));
        let ids: Vec<_> = page
            .find_all(&Query::anywhere("li"))
            .unwrap()
            .iter()
            .map(MockElement::id)
            .collect();
        assert_eq!(ids, vec![nested, b]);
    }

    #[test]
    fn test_relative_query_stays_inside() {
        let page = MockPage::new();
        let (first, first_input) = labeled_field(&page, "A");
        let _ = labeled_field(&page, "B");
        let inputs = page.element(first).find_within(&Query::within("input")).unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].id(), first_input);
    }

    #[test]
    fn test_child_axis() {
        let page = MockPage::new();
        let wrap = page.append(page.root(), MockNode::new("div"));
        let _ = page.append(wrap, MockNode::new("label").text("I agree"));
        let direct = page.append(wrap, MockNode::new("input"));
        let deeper = page.append(wrap, MockNode::new("span"));
        let _ = page.append(deeper, MockNode::new("input"));
        let q = Query::anywhere("label")
            .text_equals("I agree")
            .parent()
            .child("input");
        let found = page.find_all(&q).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), direct);
    }

    #[test]
    fn test_text_predicates() {
        let node = MockNode::new("span").text("  Budget  ");
        assert!(predicate_holds(&node, &Predicate::TextNormalized("Budget".into())));
        assert!(!predicate_holds(&node, &Predicate::TextEquals("Budget".into())));
        assert!(predicate_holds(&node, &Predicate::TextContains("Bud".into())));
    }

    #[test]
    fn test_detached_until_clicked() {
        let page = MockPage::new();
        let toggle = page.append(page.root(), MockNode::new("a"));
        let list = page.append(page.root(), MockNode::new("ul").detached());
        let _ = page.append(list, MockNode::new("li").text("Music"));
        page.on_click(toggle, ClickEffect::Attach(list));
        assert!(page.find_all(&Query::anywhere("li")).unwrap().is_empty());
        page.element(toggle).click().unwrap();
        assert_eq!(page.find_all(&Query::anywhere("li")).unwrap().len(), 1);
    }

    #[test]
    fn test_obscured_clicks_then_success() {
        let page = MockPage::new();
        let button = page.append(page.root(), MockNode::new("button").obscured_for(2));
        let element = page.element(button);
        assert!(element.click().unwrap_err().is_obscured());
        assert!(element.click().unwrap_err().is_obscured());
        element.click().unwrap();
        assert_eq!(page.clicks(button), 1);
        assert_eq!(page.obscured_clicks(), 2);
    }

    #[test]
    fn test_keys_and_clear() {
        let page = MockPage::new();
        let (_, input) = labeled_field(&page, "Cost");
        let element = page.element(input);
        element.send_keys("old").unwrap();
        element.clear().unwrap();
        element.send_keys("42").unwrap();
        assert_eq!(page.value(input), "42");
    }

    #[test]
    fn test_script_sets_element_values() {
        let page = MockPage::new();
        let a = page.append(page.root(), MockNode::new("input"));
        let b = page.append(page.root(), MockNode::new("input"));
        let (ea, eb) = (page.element(a), page.element(b));
        page.call_function(
            "function(){}",
            &[
                ScriptArg::Element(&ea),
                ScriptArg::Element(&eb),
                ScriptArg::Str("2026-10-17 15:45"),
                ScriptArg::Str("2026-10-17 18:45"),
            ],
        )
        .unwrap();
        assert_eq!(page.value(a), "2026-10-17 15:45");
        assert_eq!(page.value(b), "2026-10-17 18:45");
    }

    #[test]
    fn test_disabled_not_interactable() {
        let page = MockPage::new();
        let id = page.append(page.root(), MockNode::new("input").disabled());
        assert!(!page.element(id).is_interactable().unwrap());
        assert!(page.element(id).click().is_err());
    }

    #[test]
    fn test_covered_until_overlay_leaves() {
        let page = MockPage::new();
        let id = page.append(
            page.root(),
            MockNode::new("li").covered_for(Duration::from_millis(40)),
        );
        let element = page.element(id);
        assert!(!element.is_interactable().unwrap());
        assert!(element.click().unwrap_err().is_obscured());
        assert_eq!(page.obscured_clicks(), 1);

        std::thread::sleep(Duration::from_millis(50));
        assert!(element.is_interactable().unwrap());
        element.click().unwrap();
        assert_eq!(page.clicks(id), 1);
    }

    #[test]
    fn test_detached_handle_is_stale() {
        let page = MockPage::new();
        let id = page.append(page.root(), MockNode::new("li").detached());
        let element = page.element(id);
        assert!(!element.is_interactable().unwrap());
        assert!(element.click().unwrap_err().is_stale());
    }
}
