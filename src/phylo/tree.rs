use super::clade::CladeSignature;
use super::node::{Node, NodeId, NodeType};
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Default, Clone)]
pub struct Tree {
    nodes: SlotMap<NodeId, Node>,
    first_node_id: Option<NodeId>,
    tip_count_all: usize,
    internal_node_count_all: usize,
    node_count_all: usize,
    clades_indexed: bool,
}

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Parent node with NodeId: {0} does not exist.")]
    ParentNodeDoesNotExist(NodeId),
    #[error("Tree validation failed: {0}.")]
    InvalidTree(String),
    #[error("Tip node {0} has no label.")]
    UnlabelledTip(NodeId),
    #[error("Tip label '{0}' occurs more than once.")]
    DuplicateTipLabel(String),
    #[error("Clade signatures have not been computed for this tree.")]
    CladesNotIndexed,
}

impl Tree {
    // =========================================================================
    // Construction & Validation
    // =========================================================================

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_new_node<'a>(
        &mut self,
        label: Option<impl Into<&'a str>>,
        parent_node_id: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        let mut node: Node = Node::default();
        node.set_label(label);
        self.add_node(node, parent_node_id)
    }

    pub fn add_node(
        &mut self,
        mut node: Node,
        parent_node_id: Option<NodeId>,
    ) -> Result<NodeId, TreeError> {
        if let Some(parent_node_id) = parent_node_id
            && !self.nodes.contains_key(parent_node_id)
        {
            return Err(TreeError::ParentNodeDoesNotExist(parent_node_id));
        }

        node.set_parent_id(parent_node_id);
        let node_id = self.nodes.insert_with_key(|node_id| {
            node.set_node_id(node_id);
            node
        });

        if let Some(parent_node) = self.node_mut(parent_node_id) {
            parent_node.add_child_id(node_id);
        }

        self.clear_clades();
        Ok(node_id)
    }

    /// Assigns node types and counts, and locates the single parentless node.
    pub fn validate(&mut self) -> Result<NodeId, TreeError> {
        let mut count_of_tip: usize = 0;
        let mut count_of_internal: usize = 0;
        let mut root_ids: Vec<NodeId> = Vec::new();

        for (node_id, node) in self.nodes.iter_mut() {
            match node.set_node_type() {
                NodeType::Tip => count_of_tip += 1,
                NodeType::Internal => count_of_internal += 1,
                NodeType::Root => root_ids.push(node_id),
                NodeType::Unset => {}
            }
        }

        if root_ids.len() != 1 {
            return Err(TreeError::InvalidTree(format!(
                "expected exactly one root node, found {}",
                root_ids.len()
            )));
        }

        let root_id = root_ids[0];
        if self.nodes[root_id].is_tip() {
            count_of_tip += 1;
        } else {
            count_of_internal += 1;
        }

        self.first_node_id = Some(root_id);
        self.tip_count_all = count_of_tip;
        self.internal_node_count_all = count_of_internal;
        self.node_count_all = count_of_tip + count_of_internal;

        Ok(root_id)
    }

    // =========================================================================
    // Tree Properties
    // =========================================================================

    pub fn tip_count_all(&self) -> usize {
        self.tip_count_all
    }

    pub fn internal_node_count_all(&self) -> usize {
        self.internal_node_count_all
    }

    pub fn node_count_all(&self) -> usize {
        self.node_count_all
    }

    pub fn has_internal_node_labels(&self) -> bool {
        self.nodes.values().any(|n| !n.is_tip() && n.label().is_some())
    }

    // =========================================================================
    // Node Access
    // =========================================================================

    pub fn node(&self, node_id: Option<NodeId>) -> Option<&Node> {
        if let Some(node_id) = node_id { self.nodes.get(node_id) } else { None }
    }

    pub fn node_mut(&mut self, node_id: Option<NodeId>) -> Option<&mut Node> {
        if let Some(node_id) = node_id {
            self.nodes.get_mut(node_id)
        } else {
            None
        }
    }

    pub fn first_node_id(&self) -> Option<NodeId> {
        self.first_node_id
    }

    pub fn node_id_by_label<'a>(
        &self,
        label: impl Into<&'a str>,
    ) -> Option<NodeId> {
        let label: &str = label.into();
        self.nodes.iter().find_map(|(node_id, node)| {
            match node.label() {
                Some(node_label) if node_label.as_ref() == label => {
                    Some(node_id)
                }
                _ => None,
            }
        })
    }

    pub fn label(&self, node_id: &NodeId) -> Option<Arc<str>> {
        self.nodes[*node_id].label()
    }

    /// Relabels a node. Relabelling a tip discards all clade signatures,
    /// since they are derived from tip labels.
    pub fn set_label<'a>(
        &mut self,
        node_id: &NodeId,
        label: Option<impl Into<&'a str>>,
    ) {
        let node = &mut self.nodes[*node_id];
        node.set_label(label);
        if node.is_tip() {
            self.clear_clades();
        }
    }

    pub fn parent_id(&self, node_id: &NodeId) -> Option<&NodeId> {
        self.nodes[*node_id].parent_id()
    }

    pub fn child_ids(&self, node_id: &NodeId) -> &[NodeId] {
        self.nodes[*node_id].child_ids()
    }

    pub fn is_tip(&self, node_id: &NodeId) -> bool {
        self.nodes[*node_id].is_tip()
    }

    // =========================================================================
    // Tree Traversal
    // =========================================================================

    /// Node ids in pre-order, children visited left to right.
    pub fn node_ids_preorder(&self) -> Vec<NodeId> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.first_node_id.into_iter().collect();
        while let Some(node_id) = stack.pop() {
            result.push(node_id);
            stack.extend(self.child_ids(&node_id).iter().rev());
        }
        result
    }

    /// Node ids in post-order, children visited left to right.
    pub fn node_ids_postorder(&self) -> Vec<NodeId> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.first_node_id.into_iter().collect();
        while let Some(node_id) = stack.pop() {
            result.push(node_id);
            stack.extend(self.child_ids(&node_id).iter());
        }
        result.reverse();
        result
    }

    pub fn tip_node_ids_all(&self) -> Vec<NodeId> {
        self.node_ids_preorder()
            .into_iter()
            .filter(|node_id| self.is_tip(node_id))
            .collect()
    }

    pub fn internal_node_ids_all(&self) -> Vec<NodeId> {
        self.node_ids_preorder()
            .into_iter()
            .filter(|node_id| !self.is_tip(node_id))
            .collect()
    }

    pub fn tip_labels(&self) -> Vec<Arc<str>> {
        self.tip_node_ids_all()
            .iter()
            .filter_map(|node_id| self.label(node_id))
            .collect()
    }

    // =========================================================================
    // Clade Signatures
    // =========================================================================

    pub fn clades_indexed(&self) -> bool {
        self.clades_indexed
    }

    pub fn clade(&self, node_id: &NodeId) -> Option<&CladeSignature> {
        if self.clades_indexed { self.nodes[*node_id].clade() } else { None }
    }

    /// Assigns every node the set of tip labels below it, bottom-up.
    ///
    /// Every tip must carry a label and no label may occur on two tips.
    pub fn index_clades(&mut self) -> Result<(), TreeError> {
        let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
        for node_id in self.tip_node_ids_all() {
            let Some(label) = self.label(&node_id) else {
                return Err(TreeError::UnlabelledTip(node_id));
            };
            if !seen.insert(label.clone()) {
                return Err(TreeError::DuplicateTipLabel(label.to_string()));
            }
        }

        let mut clades: FxHashMap<NodeId, CladeSignature> =
            FxHashMap::default();
        for node_id in self.node_ids_postorder() {
            let node = &self.nodes[node_id];
            let clade = if node.is_tip() {
                match node.label() {
                    Some(label) => CladeSignature::tip(label),
                    None => return Err(TreeError::UnlabelledTip(node_id)),
                }
            } else {
                CladeSignature::union(
                    node.child_ids().iter().filter_map(|id| clades.get(id)),
                )
            };
            _ = clades.insert(node_id, clade);
        }

        for (node_id, clade) in clades {
            self.nodes[node_id].set_clade(Some(clade));
        }
        self.clades_indexed = true;
        Ok(())
    }

    fn clear_clades(&mut self) {
        if !self.clades_indexed {
            return;
        }
        for node in self.nodes.values_mut() {
            node.set_clade(None);
        }
        self.clades_indexed = false;
    }

    // =========================================================================
    // Rooting Operations
    // =========================================================================

    /// Removes a placeholder root that carries `label` and has exactly one
    /// child, promoting that child to root. Returns the removed node.
    ///
    /// **Errors:**
    /// - `TreeError::InvalidTree` - the tree does not have exactly one root;
    ///   it is left unchanged
    pub fn collapse_placeholder_root(
        &mut self,
        label: &str,
    ) -> Result<Option<Node>, TreeError> {
        if self.nodes.is_empty() {
            return Ok(None);
        }
        let root_id = self.validate()?;
        let root = &self.nodes[root_id];
        if root.label().as_deref() != Some(label) || root.child_node_count() != 1
        {
            return Ok(None);
        }

        let child_id = root.child_ids()[0];
        self.nodes[child_id].set_parent_id(None);
        let removed = self.nodes.remove(root_id);
        self.clear_clades();
        _ = self.validate()?;
        Ok(removed)
    }
}
