use super::clade::CladeSignature;
use slotmap::new_key_type;
use std::{fmt::Display, sync::Arc};

new_key_type! { pub struct NodeId; }

#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Ord, Eq)]
pub enum NodeType {
    #[default]
    Unset,
    Tip,
    Internal,
    Root,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Node {
    node_id: Option<NodeId>,
    parent_id: Option<NodeId>,
    child_ids: Vec<NodeId>,
    label: Option<Arc<str>>,
    clade: Option<CladeSignature>,
    node_type: NodeType,
}

impl Node {
    pub fn is_tip(&self) -> bool { self.child_ids.is_empty() }
    pub fn child_ids(&self) -> &[NodeId] { &self.child_ids }
    pub fn child_node_count(&self) -> usize { self.child_ids.len() }
    pub fn add_child_id(&mut self, node_id: NodeId) { self.child_ids.push(node_id) }
    pub fn node_id(&self) -> Option<&NodeId> { self.node_id.as_ref() }
    pub fn set_node_id(&mut self, node_id: NodeId) { self.node_id = Some(node_id); }
    pub fn parent_id(&self) -> Option<&NodeId> { self.parent_id.as_ref() }
    pub fn set_parent_id(&mut self, node_id: Option<NodeId>) { self.parent_id = node_id; }
    pub fn label(&self) -> Option<Arc<str>> { self.label.clone() }

    pub fn set_label<'a>(&mut self, label: Option<impl Into<&'a str>>) {
        self.label = label.map(|label| label.into().into());
    }

    /// Clade signature assigned by [`Tree::index_clades`](super::Tree::index_clades).
    pub fn clade(&self) -> Option<&CladeSignature> { self.clade.as_ref() }
    pub(crate) fn set_clade(&mut self, clade: Option<CladeSignature>) { self.clade = clade; }

    pub fn node_type(&self) -> NodeType { self.node_type }

    pub(crate) fn set_node_type(&mut self) -> NodeType {
        self.node_type = if self.parent_id.is_none() {
            NodeType::Root
        } else if self.child_ids.is_empty() {
            NodeType::Tip
        } else {
            NodeType::Internal
        };
        self.node_type
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let disp = format!("{self:?}");
        write!(f, "{}", &disp[7..disp.len() - 1])
    }
}
