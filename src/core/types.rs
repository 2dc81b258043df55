use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Value;

/// Ordered snapshot of a repository node: its path, identifier, properties in
/// repository order and children in repository order.
///
/// Sessions hand these out from the navigation operations (`root_node`,
/// `item`, `node_by_id`). A snapshot is plain data; mutating it does not touch
/// repository state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub path: String,
    pub id: Uuid,
    pub properties: Vec<Property>,
    pub children: Vec<NodeData>,
}

impl NodeData {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            id: Uuid::new_v4(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_id(path: impl Into<String>, id: Uuid) -> Self {
        Self {
            path: path.into(),
            id,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Last segment of the node path ("/" for the root).
    pub fn name(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((_, name)) if !name.is_empty() => name,
            _ => &self.path,
        }
    }

    pub fn push_property(&mut self, property: Property) -> &mut Self {
        self.properties.push(property);
        self
    }

    pub fn push_child(&mut self, child: NodeData) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Depth-first pre-order lookup of a descendant (or self) by path.
    pub fn find(&self, path: &str) -> Option<&NodeData> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(path))
    }
}

/// A named property of a node, holding one value or an ordered list of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub path: String,
    pub values: PropertyValues,
}

impl Property {
    pub fn single(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            values: PropertyValues::Single(value.into()),
        }
    }

    pub fn multiple(path: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            path: path.into(),
            values: PropertyValues::Multiple(values),
        }
    }

    pub fn name(&self) -> &str {
        match self.path.rsplit_once('/') {
            Some((_, name)) if !name.is_empty() => name,
            _ => &self.path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValues {
    Single(Value),
    Multiple(Vec<Value>),
}

impl PropertyValues {
    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Multiple(_))
    }
}

/// An addressable repository item: either a node or a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemData {
    Node(NodeData),
    Property(Property),
}

impl ItemData {
    pub fn path(&self) -> &str {
        match self {
            Self::Node(node) => &node.path,
            Self::Property(property) => &property.path,
        }
    }

    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    pub fn into_node(self) -> Option<NodeData> {
        match self {
            Self::Node(node) => Some(node),
            Self::Property(_) => None,
        }
    }
}
