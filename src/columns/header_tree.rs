//! Multi-level column headers.
//!
//! Headers are stored as a flat arena in pre-order with parent back
//! references, so every walk is a loop over indices.

use crate::model::column::ColumnConfig;
use serde::{Deserialize, Serialize};

/// Nested header definition as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSpec {
    /// Label. Leaves default to their field.
    pub title: Option<String>,
    /// Data field; meaningful on leaves only.
    pub field: Option<String>,
    /// Sub-headers.
    pub children: Vec<HeaderSpec>,
    /// Start hidden.
    pub hidden: bool,
}

impl HeaderSpec {
    /// A leaf bound to `field`.
    pub fn leaf(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::default()
        }
    }

    /// A parent header over `children`.
    pub fn group(title: impl Into<String>, children: Vec<HeaderSpec>) -> Self {
        Self {
            title: Some(title.into()),
            children,
            ..Self::default()
        }
    }
}

/// Index of a node in a [`HeaderTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeaderNodeId(usize);

/// One header in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNode {
    /// Label.
    pub title: String,
    /// Data field of a leaf.
    pub field: Option<String>,
    /// Parent, `None` for top-level headers.
    pub parent: Option<HeaderNodeId>,
    /// Children in display order.
    pub children: Vec<HeaderNodeId>,
    /// Zero for top-level headers.
    pub depth: usize,
    /// Hidden by itself; ancestors may hide it too.
    pub hidden: bool,
}

impl HeaderNode {
    /// True when the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A rendered header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    /// Node rendered by the cell.
    pub id: HeaderNodeId,
    /// Label.
    pub title: String,
    /// Visible leaf columns spanned.
    pub colspan: usize,
    /// Header rows spanned.
    pub rowspan: usize,
}

/// Column header hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderTree {
    nodes: Vec<HeaderNode>,
    roots: Vec<HeaderNodeId>,
}

impl HeaderTree {
    /// Flatten nested specs into an arena.
    pub fn new(specs: Vec<HeaderSpec>) -> Self {
        let mut tree = Self::default();
        let mut stack: Vec<(HeaderSpec, Option<HeaderNodeId>, usize)> =
            specs.into_iter().rev().map(|s| (s, None, 0)).collect();

        while let Some((spec, parent, depth)) = stack.pop() {
            let id = HeaderNodeId(tree.nodes.len());
            let title = spec
                .title
                .or_else(|| spec.field.clone())
                .unwrap_or_default();
            tree.nodes.push(HeaderNode {
                title,
                field: spec.field,
                parent,
                children: Vec::new(),
                depth,
                hidden: spec.hidden,
            });
            match parent.and_then(|p| tree.nodes.get_mut(p.0)) {
                Some(parent) => parent.children.push(id),
                None => tree.roots.push(id),
            }
            stack.extend(
                spec.children
                    .into_iter()
                    .rev()
                    .map(|child| (child, Some(id), depth + 1)),
            );
        }
        tree
    }

    /// Look up a node.
    pub fn node(&self, id: HeaderNodeId) -> Option<&HeaderNode> {
        self.nodes.get(id.0)
    }

    /// Top-level headers.
    pub fn roots(&self) -> &[HeaderNodeId] {
        &self.roots
    }

    /// Leaf bound to `field`.
    pub fn find(&self, field: &str) -> Option<HeaderNodeId> {
        self.nodes
            .iter()
            .position(|n| n.is_leaf() && n.field.as_deref() == Some(field))
            .map(HeaderNodeId)
    }

    /// Number of header rows.
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth + 1).max().unwrap_or(0)
    }

    /// Depth of a node, zero for top-level headers.
    pub fn level_of(&self, id: HeaderNodeId) -> Option<usize> {
        self.node(id).map(|n| n.depth)
    }

    /// Ancestors of a node, outermost first.
    pub fn parents_of(&self, id: HeaderNodeId) -> Vec<HeaderNodeId> {
        let mut parents = Vec::new();
        let mut current = self.node(id).and_then(|n| n.parent);
        while let Some(parent) = current {
            parents.push(parent);
            current = self.node(parent).and_then(|n| n.parent);
        }
        parents.reverse();
        parents
    }

    /// Visible when neither the node nor any ancestor is hidden.
    pub fn is_visible(&self, id: HeaderNodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        !node.hidden
            && self
                .parents_of(id)
                .iter()
                .all(|p| self.node(*p).is_some_and(|n| !n.hidden))
    }

    /// Hide a node with its descendants, or show it with its descendants
    /// and ancestors.
    pub fn set_visible(&mut self, id: HeaderNodeId, visible: bool) {
        if self.node(id).is_none() {
            return;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0) {
                node.hidden = !visible;
                stack.extend(node.children.iter().copied());
            }
        }
        if visible {
            for parent in self.parents_of(id) {
                if let Some(node) = self.nodes.get_mut(parent.0) {
                    node.hidden = false;
                }
            }
        }
    }

    /// Node ids grouped by depth, each level in display order.
    pub fn levels(&self) -> Vec<Vec<HeaderNodeId>> {
        let mut levels = vec![Vec::new(); self.max_depth()];
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(level) = levels.get_mut(node.depth) {
                level.push(HeaderNodeId(i));
            }
        }
        levels
    }

    /// Visible leaves in display order.
    pub fn leaf_columns(&self) -> Vec<&HeaderNode> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, n)| n.is_leaf() && self.is_visible(HeaderNodeId(*i)))
            .map(|(_, n)| n)
            .collect()
    }

    /// Column configuration for every leaf. Leaves under a common top-level
    /// header share a group so the layout keeps them adjacent.
    pub fn column_configs(&self) -> Vec<ColumnConfig> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_leaf())
            .filter_map(|(i, n)| {
                let field = n.field.clone()?;
                let mut config = ColumnConfig::new(field).title(n.title.clone());
                if let Some(root) = self.parents_of(HeaderNodeId(i)).first() {
                    config = config.group(format!("header-{}", root.0));
                }
                if !self.is_visible(HeaderNodeId(i)) {
                    config = config.hidden();
                }
                Some(config)
            })
            .collect()
    }

    /// Header rows with spans, hidden nodes omitted.
    pub fn header_rows(&self) -> Vec<Vec<HeaderCell>> {
        let depth = self.max_depth();
        let mut spans = vec![0usize; self.nodes.len()];
        for i in (0..self.nodes.len()).rev() {
            let node = &self.nodes[i];
            spans[i] = if node.is_leaf() {
                usize::from(self.is_visible(HeaderNodeId(i)))
            } else {
                node.children.iter().map(|c| spans[c.0]).sum()
            };
        }

        let mut rows = vec![Vec::new(); depth];
        for (i, node) in self.nodes.iter().enumerate() {
            if spans[i] == 0 {
                continue;
            }
            let rowspan = if node.is_leaf() { depth - node.depth } else { 1 };
            if let Some(row) = rows.get_mut(node.depth) {
                row.push(HeaderCell {
                    id: HeaderNodeId(i),
                    title: node.title.clone(),
                    colspan: spans[i],
                    rowspan,
                });
            }
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff_headers() -> HeaderTree {
        HeaderTree::new(vec![
            HeaderSpec::leaf("name"),
            HeaderSpec::group(
                "Address",
                vec![HeaderSpec::leaf("street"), HeaderSpec::leaf("city")],
            ),
            HeaderSpec::group(
                "Employment",
                vec![
                    HeaderSpec::leaf("dept"),
                    HeaderSpec::group(
                        "Pay",
                        vec![HeaderSpec::leaf("salary"), HeaderSpec::leaf("bonus")],
                    ),
                ],
            ),
        ])
    }

    fn row_text(row: &[HeaderCell]) -> String {
        row.iter()
            .map(|c| format!("{}({}x{})", c.title, c.colspan, c.rowspan))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn header_rows_carry_spans() {
        let tree = staff_headers();
        assert_eq!(tree.max_depth(), 3);
        let rows = tree.header_rows();
        let text: Vec<String> = rows.iter().map(|r| row_text(r)).collect();
        insta::assert_snapshot!(text.join("\n"), @r"
        name(1x3) Address(2x1) Employment(3x1)
        street(1x2) city(1x2) dept(1x2) Pay(2x1)
        salary(1x1) bonus(1x1)
        ");
    }

    #[test]
    fn leaves_in_display_order() {
        let tree = staff_headers();
        let fields: Vec<&str> = tree
            .leaf_columns()
            .iter()
            .filter_map(|n| n.field.as_deref())
            .collect();
        assert_eq!(fields, vec!["name", "street", "city", "dept", "salary", "bonus"]);
    }

    #[test]
    fn parents_and_levels() {
        let tree = staff_headers();
        let salary = tree.find("salary");
        let Some(salary) = salary else {
            panic!("salary leaf missing");
        };
        let titles: Vec<String> = tree
            .parents_of(salary)
            .iter()
            .filter_map(|p| tree.node(*p).map(|n| n.title.clone()))
            .collect();
        assert_eq!(titles, vec!["Employment", "Pay"]);
        assert_eq!(tree.level_of(salary), Some(2));
        assert_eq!(tree.levels().iter().map(Vec::len).collect::<Vec<_>>(), vec![3, 4, 2]);
    }

    #[test]
    fn hiding_cascades_and_showing_reveals_ancestors() {
        let mut tree = staff_headers();
        let Some(pay) = tree.parents_of(tree.find("bonus").unwrap_or(HeaderNodeId(0))).last().copied() else {
            panic!("pay header missing");
        };
        tree.set_visible(pay, false);
        assert!(!tree.is_visible(pay));
        assert_eq!(tree.leaf_columns().len(), 4);
        let rows = tree.header_rows();
        assert_eq!(row_text(&rows[0]), "name(1x3) Address(2x1) Employment(1x1)");

        let Some(employment) = tree.roots().last().copied() else {
            panic!("no roots");
        };
        tree.set_visible(employment, false);
        let Some(salary) = tree.find("salary") else {
            panic!("salary leaf missing");
        };
        tree.set_visible(salary, true);
        assert!(tree.is_visible(salary));
        assert!(tree.is_visible(employment));
        let Some(dept) = tree.find("dept") else {
            panic!("dept leaf missing");
        };
        assert!(!tree.is_visible(dept));
        assert_eq!(tree.leaf_columns().len(), 4);
    }

    #[test]
    fn column_configs_group_by_top_level_header() {
        let tree = staff_headers();
        let configs = tree.column_configs();
        assert_eq!(configs.len(), 6);
        assert_eq!(configs[0].group, None);
        assert_eq!(configs[1].group, configs[2].group);
        assert_eq!(configs[3].group, configs[5].group);
        assert_ne!(configs[1].group, configs[3].group);
    }

    #[test]
    fn specs_deserialize_from_json() {
        let json = r#"[{"title":"Who","children":[{"field":"first"},{"field":"last","hidden":true}]}]"#;
        let specs: Vec<HeaderSpec> = serde_json::from_str(json).unwrap_or_default();
        let tree = HeaderTree::new(specs);
        assert_eq!(tree.max_depth(), 2);
        assert_eq!(tree.leaf_columns().len(), 1);
    }
}
