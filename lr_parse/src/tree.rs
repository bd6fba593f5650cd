use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Index into a [`Tree`]'s arena. Stable across edits: once assigned, a
/// `NodeId` always refers to the same immutable record, even after later
/// edits produce a new tree rooted elsewhere (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

struct NodeRecord<N> {
    data: Rc<N>,
    children: Vec<NodeId>,
}

/// An arena-backed, append-only syntax tree (§6). Editing a node never
/// mutates existing records: `replace_child`/`insert_child`/`remove_child`
/// append one new record for the edited node and one for each ancestor up
/// to the root, returning a new `Tree` whose root points at the freshly
/// built path. Every untouched subtree keeps its original `NodeId`s and is
/// shared, not copied, between the old and new tree.
pub struct Tree<N> {
    arena: Vec<NodeRecord<N>>,
    root: NodeId,
    parent_cache: Rc<RefCell<BTreeMap<NodeId, NodeId>>>,
    parent_cache_built: Cell<bool>,
}

impl<N> Tree<N> {
    pub fn leaf(data: N) -> (Self, NodeId) {
        let tree = Self {
            arena: vec![NodeRecord {
                data: Rc::new(data),
                children: Vec::new(),
            }],
            root: NodeId(0),
            parent_cache: Rc::new(RefCell::new(BTreeMap::new())),
            parent_cache_built: Cell::new(false),
        };
        (tree, NodeId(0))
    }

    /// Builds a tree from a fully-formed node list, `children[i]` already
    /// allocated in earlier `push` calls. `push_internal` appends the new
    /// parent last, matching reduction order in the parser driver: a
    /// production's children are all on the stack before the reduction
    /// creates their parent.
    pub fn push_internal(&mut self, data: N, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.arena.len());
        self.arena.push(NodeRecord {
            data: Rc::new(data),
            children,
        });
        id
    }

    pub fn with_root(mut self, root: NodeId) -> Self {
        self.root = root;
        self.parent_cache.borrow_mut().clear();
        self.parent_cache_built.set(false);
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn data(&self, id: NodeId) -> &N {
        &self.arena[id.0].data
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.arena[id.0].children
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Recursive structural equality over children (§4.H): two nodes, even
    /// from different `Tree` versions with unrelated `NodeId`s, are equal
    /// if their data matches and their children are pairwise structurally
    /// equal. `NodeId`s are never compared directly here since an edit
    /// reallocates a fresh id for every node on the rebuilt path.
    pub fn structurally_eq(&self, here: NodeId, other: &Tree<N>, there: NodeId) -> bool
    where
        N: PartialEq,
    {
        if self.data(here) != other.data(there) {
            return false;
        }
        let (here_children, there_children) = (self.children(here), other.children(there));
        here_children.len() == there_children.len()
            && here_children
                .iter()
                .zip(there_children)
                .all(|(&h, &t)| self.structurally_eq(h, other, t))
    }

    fn ensure_parent_cache(&self) {
        if self.parent_cache_built.get() {
            return;
        }
        if !self.arena.is_empty() {
            let mut cache = self.parent_cache.borrow_mut();
            let mut stack = vec![self.root];
            while let Some(id) = stack.pop() {
                for &child in &self.arena[id.0].children {
                    cache.insert(child, id);
                    stack.push(child);
                }
            }
        }
        self.parent_cache_built.set(true);
    }

    /// The parent of `id` relative to this tree's current root, computed
    /// on first use and memoized (§6). A node with more than one parent
    /// across different tree versions resolves differently per `Tree`
    /// instance, since each keeps its own `root`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        if id == self.root {
            return None;
        }
        self.ensure_parent_cache();
        self.parent_cache.borrow().get(&id).copied()
    }

    fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path
    }

    fn rebuild_path(&mut self, path: &[NodeId], new_leaf_id: NodeId) -> NodeId {
        let mut new_child = new_leaf_id;
        for window in path.windows(2) {
            let (old_child, ancestor) = (window[0], window[1]);
            let mut children = self.arena[ancestor.0].children.clone();
            let position = children
                .iter()
                .position(|&c| c == old_child)
                .expect("path node must be listed in its ancestor's children");
            children[position] = new_child;
            new_child = self.push_internal_keep(ancestor, children);
        }
        new_child
    }

    fn push_internal_keep(&mut self, template: NodeId, children: Vec<NodeId>) -> NodeId
    where
        N: Clone,
    {
        let data = (*self.arena[template.0].data).clone();
        self.push_internal(data, children)
    }

    /// Replaces the data of `target` with `new_data`, reconstructing every
    /// ancestor up to the root. Returns the new tree and the id of the
    /// replacement node.
    pub fn replace_node(&self, target: NodeId, new_data: N) -> (Self, NodeId)
    where
        N: Clone,
    {
        let mut next = self.clone_topology();
        let path = self.path_to_root(target);
        let children = self.arena[target.0].children.clone();
        let new_node = next.push_internal(new_data, children);
        let new_root = if path.len() > 1 {
            next.rebuild_path(&path, new_node)
        } else {
            new_node
        };
        (next.with_root(new_root), new_node)
    }

    /// Inserts `new_child` into `parent`'s children at `index`, reconstructing
    /// ancestors up to the root.
    pub fn insert_child(&self, parent: NodeId, index: usize, new_child: NodeId) -> Self
    where
        N: Clone,
    {
        let mut next = self.clone_topology();
        let mut children = next.arena[parent.0].children.clone();
        children.insert(index.min(children.len()), new_child);
        let new_parent = next.push_internal_keep(parent, children);
        let path = self.path_to_root(parent);
        let new_root = if path.len() > 1 {
            next.rebuild_path(&path, new_parent)
        } else {
            new_parent
        };
        next.with_root(new_root)
    }

    /// Removes the child of `parent` at `index`, reconstructing ancestors up
    /// to the root. The removed subtree remains in the arena, reachable only
    /// through trees that still hold its old id.
    pub fn remove_child(&self, parent: NodeId, index: usize) -> Self
    where
        N: Clone,
    {
        let mut next = self.clone_topology();
        let mut children = next.arena[parent.0].children.clone();
        if index < children.len() {
            children.remove(index);
        }
        let new_parent = next.push_internal_keep(parent, children);
        let path = self.path_to_root(parent);
        let new_root = if path.len() > 1 {
            next.rebuild_path(&path, new_parent)
        } else {
            new_parent
        };
        next.with_root(new_root)
    }

    /// Shares the arena built so far; a fresh `Tree` handle that appends new
    /// records without disturbing `self`'s view of it.
    fn clone_topology(&self) -> Self
    where
        N: Clone,
    {
        Self {
            arena: self
                .arena
                .iter()
                .map(|record| NodeRecord {
                    data: Rc::clone(&record.data),
                    children: record.children.clone(),
                })
                .collect(),
            root: self.root,
            parent_cache: Rc::new(RefCell::new(BTreeMap::new())),
            parent_cache_built: Cell::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_tree_has_no_parent() {
        let (tree, root) = Tree::leaf("leaf");
        assert!(tree.parent(root).is_none());
    }

    #[test]
    fn replace_node_preserves_untouched_siblings() {
        let (mut tree, a) = Tree::leaf("a");
        let b = tree.push_internal("b", vec![]);
        let parent = tree.push_internal("parent", vec![a, b]);
        let tree = tree.with_root(parent);

        let (edited, new_a) = tree.replace_node(a, "a2");
        assert_eq!(*edited.data(new_a), "a2");
        let new_root_children = edited.children(edited.root());
        assert_eq!(new_root_children.len(), 2);
        assert_eq!(*edited.data(new_root_children[1]), "b");

        // old tree is untouched
        assert_eq!(*tree.data(a), "a");
    }

    #[test]
    fn replace_node_with_itself_is_structurally_equal() {
        let (mut tree, a) = Tree::leaf("a");
        let b = tree.push_internal("b", vec![]);
        let parent = tree.push_internal("parent", vec![a, b]);
        let tree = tree.with_root(parent);

        let (edited, _) = tree.replace_node(a, "a");
        assert!(tree.structurally_eq(tree.root(), &edited, edited.root()));
    }

    #[test]
    fn insert_and_remove_child_round_trip_length() {
        let (mut tree, a) = Tree::leaf("a");
        let parent = tree.push_internal("parent", vec![a]);
        let tree = tree.with_root(parent);

        let mut staged = tree.clone_topology();
        let new_leaf = staged.push_internal("b", vec![]);
        let staged = staged.with_root(parent);

        let inserted = staged.insert_child(parent, 1, new_leaf);
        assert_eq!(inserted.children(inserted.root()).len(), 2);

        let removed = inserted.remove_child(inserted.root(), 0);
        assert_eq!(removed.children(removed.root()).len(), 1);
    }
}
