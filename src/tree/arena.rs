//! The widget arena: allocation, linking, tasks and the id registry.

use std::collections::HashMap;

use slotmap::{SecondaryMap, SlotMap};
use tracing::{trace, warn};

use super::node::{Links, Widget, WidgetId, WidgetState};
use super::TreeError;
use crate::geometry::Rect;
use crate::task::{TaskKind, TaskSet};

/// The central widget tree, backed by a slotmap arena.
///
/// Every widget lives in one `SlotMap`; parent, child and sibling links are
/// kept in a secondary map as handles, so unlinking is O(1) and a freed
/// widget can never be reached through a stale handle.
#[derive(Debug)]
pub struct WidgetTree {
    pub(crate) nodes: SlotMap<WidgetId, Widget>,
    pub(crate) links: SecondaryMap<WidgetId, Links>,
    ids: HashMap<String, Vec<WidgetId>>,
    root: WidgetId,
    trash: Vec<WidgetId>,
}

impl WidgetTree {
    /// Create a tree holding a single root widget of type `root_type`.
    pub fn new(root_type: &str) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Widget::new(root_type));
        let mut links = SecondaryMap::new();
        links.insert(root, Links::default());
        Self { nodes, links, ids: HashMap::new(), root, trash: Vec::new() }
    }

    pub fn root(&self) -> WidgetId {
        self.root
    }

    /// Allocate an unattached widget with empty style, classes and statuses.
    pub fn create(&mut self, type_name: &str) -> WidgetId {
        let id = self.nodes.insert(Widget::new(type_name));
        self.links.insert(id, Links::default());
        id
    }

    /// Immutable access to a widget, destroyed or not.
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.nodes.get_mut(id)
    }

    /// The widget behind `id`, if it is still live.
    pub fn live(&self, id: WidgetId) -> Result<&Widget, TreeError> {
        match self.nodes.get(id) {
            None => Err(TreeError::Stale),
            Some(w) if w.state == WidgetState::Destroyed => Err(TreeError::Destroyed),
            Some(w) => Ok(w),
        }
    }

    pub(crate) fn live_mut(&mut self, id: WidgetId) -> Result<&mut Widget, TreeError> {
        match self.nodes.get_mut(id) {
            None => Err(TreeError::Stale),
            Some(w) if w.state == WidgetState::Destroyed => Err(TreeError::Destroyed),
            Some(w) => Ok(w),
        }
    }

    /// Whether `id` names a live widget.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.live(id).is_ok()
    }

    /// Number of allocated widgets, including destroyed ones not yet freed.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // -- links ---------------------------------------------------------------

    fn link(&self, id: WidgetId) -> Links {
        self.links.get(id).copied().unwrap_or_default()
    }

    fn link_mut(&mut self, id: WidgetId) -> Option<&mut Links> {
        self.links.get_mut(id)
    }

    pub fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.link(id).parent
    }

    pub fn first_child(&self, id: WidgetId) -> Option<WidgetId> {
        self.link(id).first_child
    }

    pub fn last_child(&self, id: WidgetId) -> Option<WidgetId> {
        self.link(id).last_child
    }

    pub fn next_sibling(&self, id: WidgetId) -> Option<WidgetId> {
        self.link(id).next
    }

    pub fn prev_sibling(&self, id: WidgetId) -> Option<WidgetId> {
        self.link(id).prev
    }

    /// Children of `id` in tree order.
    pub fn children(&self, id: WidgetId) -> Children<'_> {
        Children { tree: self, next: self.first_child(id) }
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: WidgetId) -> impl Iterator<Item = WidgetId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Whether `id` is connected to the root.
    pub fn is_attached(&self, id: WidgetId) -> bool {
        self.is_ancestor_or_self(self.root, id)
    }

    fn check_attach(&self, parent: WidgetId, child: WidgetId) -> Result<(), TreeError> {
        self.live(parent)?;
        self.live(child)?;
        if child == self.root {
            return Err(TreeError::RootWidget);
        }
        if self.parent(child).is_some() {
            return Err(TreeError::AlreadyAttached);
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::Cycle);
        }
        Ok(())
    }

    /// Attach `child` as the last child of `parent`, queueing a full style,
    /// layout and paint cycle for its subtree.
    pub fn append(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TreeError> {
        self.check_attach(parent, child)?;
        let old_last = self.last_child(parent);
        if let Some(l) = self.link_mut(child) {
            l.parent = Some(parent);
            l.prev = old_last;
            l.next = None;
        }
        match old_last {
            Some(last) => {
                if let Some(l) = self.link_mut(last) {
                    l.next = Some(child);
                }
            }
            None => {
                if let Some(l) = self.link_mut(parent) {
                    l.first_child = Some(child);
                }
            }
        }
        if let Some(l) = self.link_mut(parent) {
            l.last_child = Some(child);
        }
        if let Some(last) = old_last {
            // `:last-child` moved.
            self.add_task_subtree(last, TaskSet::STYLE);
        }
        self.after_attach(parent, child);
        Ok(())
    }

    /// Attach `child` as the first child of `parent`.
    pub fn prepend(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TreeError> {
        self.check_attach(parent, child)?;
        let old_first = self.first_child(parent);
        if let Some(l) = self.link_mut(child) {
            l.parent = Some(parent);
            l.prev = None;
            l.next = old_first;
        }
        match old_first {
            Some(first) => {
                if let Some(l) = self.link_mut(first) {
                    l.prev = Some(child);
                }
            }
            None => {
                if let Some(l) = self.link_mut(parent) {
                    l.last_child = Some(child);
                }
            }
        }
        if let Some(l) = self.link_mut(parent) {
            l.first_child = Some(child);
        }
        if let Some(first) = old_first {
            // Every following sibling may match `:first-child`, `+` or `~`
            // differently now.
            self.restyle_from(first);
        }
        self.after_attach(parent, child);
        Ok(())
    }

    fn after_attach(&mut self, parent: WidgetId, child: WidgetId) {
        if self.nodes.get(child).is_some_and(|w| w.subtree_dirty) {
            self.mark_dirty_path(parent);
        }
        self.add_task_subtree(child, TaskSet::ATTACH);
        self.add_task(parent, TaskKind::Reflow);
        trace!(?parent, ?child, "attached");
    }

    /// Detach `id` from its parent without destroying it. The detached
    /// subtree keeps its structure; the area it covered is invalidated.
    pub fn unlink(&mut self, id: WidgetId) -> Result<WidgetId, TreeError> {
        self.live(id)?;
        if id == self.root {
            return Err(TreeError::RootWidget);
        }
        let parent = self.parent(id).ok_or(TreeError::NotAttached)?;
        let old_area = self.canvas_rect_in_parent(id);
        self.invalidate(parent, old_area);
        self.unlink_raw(id);
        self.clear_invalid_subtree(id);
        self.add_task(parent, TaskKind::Reflow);
        Ok(parent)
    }

    /// Remove `id` from its sibling chain. Followers are queued for a
    /// style update since structural pseudo-classes and sibling combinators
    /// may now match differently.
    pub(crate) fn unlink_raw(&mut self, id: WidgetId) {
        let links = self.link(id);
        let Some(parent) = links.parent else { return };
        match links.prev {
            Some(prev) => {
                if let Some(l) = self.link_mut(prev) {
                    l.next = links.next;
                }
            }
            None => {
                if let Some(l) = self.link_mut(parent) {
                    l.first_child = links.next;
                }
            }
        }
        match links.next {
            Some(next) => {
                if let Some(l) = self.link_mut(next) {
                    l.prev = links.prev;
                }
            }
            None => {
                if let Some(l) = self.link_mut(parent) {
                    l.last_child = links.prev;
                }
            }
        }
        if let Some(l) = self.link_mut(id) {
            l.parent = None;
            l.prev = None;
            l.next = None;
        }
        if let Some(prev) = links.prev {
            self.add_task_subtree(prev, TaskSet::STYLE);
        }
        if let Some(next) = links.next {
            self.restyle_from(next);
        }
    }

    /// Destroy `id` and its subtree.
    ///
    /// The widget is unlinked, every widget of the subtree is marked
    /// destroyed bottom-up and dropped from the id registry, and the memory
    /// is freed at the end of the next drain. Returns the destroyed widgets
    /// in post-order.
    pub fn destroy(&mut self, id: WidgetId) -> Result<Vec<WidgetId>, TreeError> {
        self.live(id)?;
        if id == self.root {
            return Err(TreeError::RootWidget);
        }
        if let Some(parent) = self.parent(id) {
            let old_area = self.canvas_rect_in_parent(id);
            self.invalidate(parent, old_area);
            self.add_task(parent, TaskKind::Reflow);
            self.unlink_raw(id);
        }
        let doomed = self.post_order(id);
        for &w in &doomed {
            if let Some(name) = self.nodes.get(w).and_then(|n| n.id.clone()) {
                self.unregister_id(&name, w);
            }
            if let Some(widget) = self.nodes.get_mut(w) {
                widget.state = WidgetState::Destroyed;
                widget.tasks = TaskSet::DESTROY;
                widget.invalid.clear();
            }
            self.trash.push(w);
        }
        trace!(?id, count = doomed.len(), "destroyed");
        Ok(doomed)
    }

    /// Free every destroyed widget. Returns how many were freed.
    pub(crate) fn free_trash(&mut self) -> usize {
        let count = self.trash.len();
        for id in self.trash.drain(..) {
            self.nodes.remove(id);
            self.links.remove(id);
        }
        count
    }

    /// `id` and its descendants, children before parents.
    pub fn post_order(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                out.push(current);
                continue;
            }
            stack.push((current, true));
            let kids: Vec<WidgetId> = self.children(current).collect();
            for &child in kids.iter().rev() {
                stack.push((child, false));
            }
        }
        out
    }

    // -- tasks ---------------------------------------------------------------

    /// Queue `kind` on `id` and flag the ancestor chain as having a dirty
    /// descendant, stopping at the first ancestor already flagged.
    pub fn add_task(&mut self, id: WidgetId, kind: TaskKind) {
        self.add_tasks(id, kind.flag());
    }

    pub(crate) fn add_tasks(&mut self, id: WidgetId, tasks: TaskSet) {
        let Some(widget) = self.nodes.get_mut(id) else { return };
        if widget.state == WidgetState::Destroyed {
            return;
        }
        widget.tasks |= tasks;
        if tasks.contains(TaskSet::REFLOW) {
            // Max-content sizes depend on every descendant.
            widget.intrinsic = None;
            let mut current = self.parent(id);
            while let Some(p) = current {
                match self.nodes.get_mut(p) {
                    Some(w) if w.intrinsic.is_some() => w.intrinsic = None,
                    _ => break,
                }
                current = self.parent(p);
            }
        }
        self.mark_dirty_path(id);
    }

    /// Queue `tasks` on `id` and every descendant.
    pub(crate) fn add_task_subtree(&mut self, id: WidgetId, tasks: TaskSet) {
        for w in self.post_order(id) {
            self.add_tasks(w, tasks);
        }
    }

    /// Queue a style update on `first`, its following siblings, and all
    /// their descendants.
    pub(crate) fn restyle_from(&mut self, first: WidgetId) {
        let mut current = Some(first);
        while let Some(w) = current {
            self.add_task_subtree(w, TaskSet::STYLE);
            current = self.next_sibling(w);
        }
    }

    pub(crate) fn mark_dirty_path(&mut self, from: WidgetId) {
        let mut current = Some(from);
        while let Some(id) = current {
            match self.nodes.get_mut(id) {
                Some(w) if !w.subtree_dirty => w.subtree_dirty = true,
                _ => break,
            }
            current = self.parent(id);
        }
    }

    // -- id registry ---------------------------------------------------------

    pub(crate) fn register_id(&mut self, name: &str, id: WidgetId) {
        let holders = self.ids.entry(name.to_string()).or_default();
        if !holders.is_empty() {
            warn!(id = name, count = holders.len() + 1, "duplicate widget id; first registration wins");
        }
        if !holders.contains(&id) {
            holders.push(id);
        }
    }

    pub(crate) fn unregister_id(&mut self, name: &str, id: WidgetId) {
        if let Some(holders) = self.ids.get_mut(name) {
            holders.retain(|&w| w != id);
            if holders.is_empty() {
                self.ids.remove(name);
            }
        }
    }

    /// The first live widget registered under `name`.
    pub fn find_by_id(&self, name: &str) -> Option<WidgetId> {
        self.ids.get(name)?.iter().copied().find(|&w| self.contains(w))
    }

    /// Every widget registered under `name`, in registration order.
    pub fn all_with_id(&self, name: &str) -> &[WidgetId] {
        self.ids.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    // -- geometry ------------------------------------------------------------

    /// Canvas box of `id` in its parent's pixel coordinates.
    pub fn canvas_rect_in_parent(&self, id: WidgetId) -> Rect {
        match self.nodes.get(id) {
            Some(w) => w.local_canvas_rect().translate(w.layout.pixel_rect().offset()),
            None => Rect::EMPTY,
        }
    }
}

/// Iterator over the children of a widget.
pub struct Children<'a> {
    tree: &'a WidgetTree,
    next: Option<WidgetId>,
}

impl Iterator for Children<'_> {
    type Item = WidgetId;

    fn next(&mut self) -> Option<WidgetId> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}
