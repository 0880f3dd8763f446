use std::fmt::{self, Write};

use super::{ChildrenNodeCollection, MatchedRouteDataMap, NodeContents, RouteTree, RouteTreeNode};

/// Renders the tree as the nested conditionals a dispatcher would evaluate.
impl fmt::Display for RouteTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        out.push_str("match segments.len() {\n");
        if let Some(root) = &self.root {
            out.push_str("  0 => {\n");
            write_leaf(&mut out, root, 2)?;
            out.push_str("  }\n");
        }
        for (count, children) in &self.buckets {
            writeln!(out, "  {count} => {{")?;
            write_children(&mut out, children, 2)?;
            out.push_str("  }\n");
        }
        out.push_str("  _ => not_found,\n}\n");
        f.write_str(&out)
    }
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn write_children(out: &mut String, children: &ChildrenNodeCollection, level: usize) -> fmt::Result {
    for node in children.prioritized() {
        write_node(out, node, level)?;
    }
    Ok(())
}

fn write_node(out: &mut String, node: &RouteTreeNode, level: usize) -> fmt::Result {
    let condition = node
        .matchers()
        .iter()
        .map(|(depth, m)| m.condition_expr(&format!("segments[{depth}]")))
        .collect::<Vec<_>>()
        .join(" && ");
    indent(out, level);
    writeln!(out, "if {condition} {{")?;

    for (depth, matcher) in node.matchers() {
        if let Some(expr) = matcher.parameter_expr(&format!("segments[{depth}]")) {
            indent(out, level + 1);
            writeln!(out, "bind [{}] = {expr};", matcher.alias_signature())?;
        }
    }

    match node.contents() {
        NodeContents::Children(children) => write_children(out, children, level + 1)?,
        NodeContents::Leaf(leaf) => write_leaf(out, leaf, level + 1)?,
    }

    indent(out, level);
    out.push_str("}\n");
    Ok(())
}

fn write_leaf(out: &mut String, leaf: &MatchedRouteDataMap, level: usize) -> fmt::Result {
    for entry in leaf.entries() {
        indent(out, level);
        let names = entry
            .param_names
            .iter()
            .map(|n| n.as_ref())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "[{}] => found({:?}, [{names}]);", entry.methods, entry.route.as_ref())?;
    }
    indent(out, level);
    writeln!(out, "_ => method_not_allowed([{}]);", leaf.allowed())
}
