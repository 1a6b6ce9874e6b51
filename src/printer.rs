//! ASCII rendering of a [`TreeNode`] hierarchy.

use crate::tree::TreeNode;

const BRANCH: &str = "├── ";
const CORNER: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Renders `root` and its subtree, one line per node, depth-first pre-order.
///
/// The root is printed bare; every descendant gets the prefix of its
/// ancestors followed by a connector. Each line ends with `\n`.
pub fn render_tree(root: &TreeNode) -> String {
    let mut out = String::new();
    out.push_str(&root.name);
    out.push('\n');
    render_children(&mut out, &root.children, "");
    out
}

fn render_children(out: &mut String, children: &[TreeNode], prefix: &str) {
    let count = children.len();
    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { CORNER } else { BRANCH };

        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&child.name);
        out.push('\n');

        if !child.children.is_empty() {
            let new_prefix = format!("{prefix}{}", if is_last { SPACE } else { PIPE });
            render_children(out, &child.children, &new_prefix);
        }
    }
}
