//! Generic traversal over the node interface.
//!
//! Nothing here knows whether a node is backed by the OS or by an archive; the
//! walkers only call `children`, `is_directory` and `input_stream`. Failures below
//! the starting node are logged and that subtree is skipped.

use std::io::Read;
use std::path::Path;

use log::warn;

use crate::error::{Error, Result};
use crate::node::Node;

/// What the walk does after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    /// Do not list this node's children.
    SkipChildren,
    /// End the whole walk.
    Stop,
}

/// Depth-first, pre-order walk below `root`. The root itself is not visited;
/// its children are at depth 0.
pub fn walk<F>(root: &Node, mut visitor: F) -> Result<()>
where
    F: FnMut(&Node, usize) -> WalkControl,
{
    for child in root.children()? {
        if !visit(&child, 0, &mut visitor) {
            break;
        }
    }
    Ok(())
}

/// Returns false once the visitor asked to stop.
fn visit<F>(node: &Node, depth: usize, visitor: &mut F) -> bool
where
    F: FnMut(&Node, usize) -> WalkControl,
{
    match visitor(node, depth) {
        WalkControl::Stop => return false,
        WalkControl::SkipChildren => return true,
        WalkControl::Continue => {}
    }
    if !node.is_directory() {
        return true;
    }

    let children = match node.children() {
        Ok(children) => children,
        Err(e) => {
            warn!("Skipping children of {}: {}", node.name(), e);
            return true;
        }
    };
    for child in children {
        if !visit(&child, depth + 1, visitor) {
            return false;
        }
    }
    true
}

/// Every node below `root` with its `/`-joined virtual path, in walk order.
pub fn flatten(root: &Node) -> Result<Vec<(String, Node)>> {
    let mut out = Vec::new();
    for child in root.children()? {
        push_subtree(child, String::new(), &mut out);
    }
    Ok(out)
}

fn push_subtree(node: Node, prefix: String, out: &mut Vec<(String, Node)>) {
    let path = if prefix.is_empty() {
        node.name().to_string()
    } else {
        format!("{}/{}", prefix, node.name())
    };

    let mut below = Vec::new();
    if node.is_directory() {
        match node.children() {
            Ok(children) => {
                for child in children {
                    push_subtree(child, path.clone(), &mut below);
                }
            }
            Err(e) => warn!("Skipping children of {}: {}", path, e),
        }
    }

    out.push((path, node));
    out.append(&mut below);
}

/// Read a file-like node's whole stream.
pub fn read_all(node: &Node) -> Result<Vec<u8>> {
    let mut stream = node.input_stream()?;
    let mut buf = Vec::new();
    stream
        .read_to_end(&mut buf)
        .map_err(|e| Error::io(Path::new(node.name()), e))?;
    Ok(buf)
}
