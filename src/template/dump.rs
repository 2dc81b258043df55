//! Textual rendering of repository subtrees.

use super::RepoTemplate;
use crate::core::{AccessError, ItemData, NodeData, PropertyValues, Result};
use crate::session::binding::BindingContext;

impl RepoTemplate {
    /// Render the subtree at `path` (or the whole repository when omitted) as
    /// text: one line per node path, one `property_path=value` line per
    /// property, children in repository order after their parent.
    pub fn dump(&self, ctx: &BindingContext, path: Option<&str>) -> Result<String> {
        self.execute_with(ctx, true, |session| {
            let node = match path {
                None => session.root_node()?,
                Some(path) => match session.item(path)? {
                    ItemData::Node(node) => node,
                    ItemData::Property(property) => {
                        return Err(AccessError::InvalidArgument(format!(
                            "'{}' is a property, not a node",
                            property.path
                        ))
                        .into());
                    }
                },
            };
            Ok(dump_node(&node))
        })
    }
}

/// Depth-first pre-order rendering of a node snapshot: the node's own path
/// and properties before any child's rendering. Multi-valued properties are
/// comma-joined on one line. Pure; touches no repository state.
pub fn dump_node(node: &NodeData) -> String {
    let mut out = String::new();
    out.push_str(&node.path);
    out.push('\n');

    for property in &node.properties {
        out.push_str(&property.path);
        out.push('=');
        match &property.values {
            PropertyValues::Single(value) => out.push_str(&value.to_string()),
            PropertyValues::Multiple(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(&value.to_string());
                }
            }
        }
        out.push('\n');
    }

    for child in &node.children {
        out.push_str(&dump_node(child));
    }
    out
}
