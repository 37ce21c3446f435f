//! Derivation trees built by the parser for display.
//!
//! Nothing after the parser consumes these; they exist so a front end can
//! show how each statement was derived from the grammar.

use serde::Serialize;

use crate::frontend::token::TokenKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeNode {
    /// A grammar production with its children in source order.
    Interior { label: String, children: Vec<TreeNode> },

    /// A consumed token.
    Leaf { kind: TokenKind, value: String },
}

impl TreeNode {
    pub fn interior(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        TreeNode::Interior {
            label: label.into(),
            children,
        }
    }

    pub fn leaf(kind: TokenKind, value: impl Into<String>) -> Self {
        TreeNode::Leaf {
            kind,
            value: value.into(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            TreeNode::Interior { label, .. } => label.clone(),
            TreeNode::Leaf { kind, value } => format!("{}: {}", kind, value),
        }
    }

    /// Renders the tree as indented text, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, "", true, true);
        out
    }

    fn render_into(&self, out: &mut String, prefix: &str, last: bool, root: bool) {
        if root {
            out.push_str(&self.label());
        } else {
            out.push_str(prefix);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(&self.label());
        }
        out.push('\n');

        if let TreeNode::Interior { children, .. } = self {
            let child_prefix = if root {
                String::new()
            } else if last {
                format!("{}    ", prefix)
            } else {
                format!("{}│   ", prefix)
            };
            for (i, child) in children.iter().enumerate() {
                child.render_into(out, &child_prefix, i + 1 == children.len(), false);
            }
        }
    }
}
