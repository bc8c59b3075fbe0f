//! The matched-field tree walked during decoding.
//!
//! Nodes live in an index arena so parent links stay simple. Each message
//! node keeps its matched fields ordered by field number, which makes
//! ascending tag streams resolvable by a forward scan; the number→index map
//! is the fallback for producers that interleave tags.

use std::collections::HashMap;

use crate::convert::Converter;

pub(crate) type NodeId = usize;

/// A matched field: either a scalar leaf owning a column and a converter,
/// or the entrance to a nested message node. Leaf converters keep their own
/// descriptor handle for error reporting.
#[derive(Debug)]
pub(crate) struct FieldNode {
    pub(crate) number: u32,
    pub(crate) column_index: Option<usize>,
    pub(crate) nested: Option<NodeId>,
    pub(crate) converter: Option<Converter>,
}

#[derive(Default, Debug)]
pub(crate) struct MessageNode {
    pub(crate) parent: Option<NodeId>,
    /// Position of the field leading here within the parent's ordered list.
    pub(crate) index_in_parent: usize,
    pub(crate) fields: Vec<FieldNode>,
    pub(crate) by_number: HashMap<u32, usize>,
}

#[derive(Debug)]
pub(crate) struct SchemaTree {
    nodes: Vec<MessageNode>,
}

impl SchemaTree {
    pub(crate) const ROOT: NodeId = 0;

    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![MessageNode::default()],
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &MessageNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut MessageNode {
        &mut self.nodes[id]
    }

    pub(crate) fn add_child(&mut self, parent: NodeId) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(MessageNode {
            parent: Some(parent),
            ..MessageNode::default()
        });
        id
    }

    pub(crate) fn converter_mut(&mut self, node: NodeId, field: usize) -> &mut Converter {
        self.nodes[node].fields[field]
            .converter
            .as_mut()
            .expect("leaf fields always carry a converter")
    }

    /// Order fields by number and rebuild the lookup map and child
    /// back-pointers. Must run once, after all columns are matched.
    pub(crate) fn finalize(&mut self) {
        for id in 0..self.nodes.len() {
            let mut fields = std::mem::take(&mut self.nodes[id].fields);
            fields.sort_by_key(|field| field.number);
            let mut by_number = HashMap::with_capacity(fields.len());
            for (index, field) in fields.iter().enumerate() {
                by_number.insert(field.number, index);
                if let Some(child) = field.nested {
                    self.nodes[child].index_in_parent = index;
                }
            }
            self.nodes[id].fields = fields;
            self.nodes[id].by_number = by_number;
        }
    }
}
