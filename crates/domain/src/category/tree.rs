//! Category tree assembly from a flat list.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Category, CategoryId, CategorySummary};

/// How children are attached when building the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeStrategy {
    /// Children are attached only to root categories; a category whose
    /// parent is not a root is left out. Subcategories never have
    /// subcategories of their own.
    #[default]
    RootsOnly,

    /// Every category is attached under its parent at any depth.
    Nested,
}

impl FromStr for TreeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "roots" | "roots_only" => Ok(TreeStrategy::RootsOnly),
            "nested" => Ok(TreeStrategy::Nested),
            other => Err(format!("unknown tree strategy: {other}")),
        }
    }
}

/// A category positioned in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,

    /// The resolved parent, for nodes that are not roots.
    pub parent_summary: Option<CategorySummary>,

    pub subcategories: Vec<CategoryNode>,
}

impl CategoryNode {
    fn leaf(category: &Category, parent: Option<&Category>) -> Self {
        Self {
            category: category.clone(),
            parent_summary: parent.map(Category::summary),
            subcategories: Vec::new(),
        }
    }

    /// Returns the number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .subcategories
            .iter()
            .map(CategoryNode::node_count)
            .sum::<usize>()
    }
}

/// Builds the category tree from a flat, already sorted list.
///
/// Roots keep the input order, and so do siblings. Categories whose parent
/// is missing from the input never appear. The input is not modified and
/// every category appears at most once.
pub fn build_tree(categories: &[Category], strategy: TreeStrategy) -> Vec<CategoryNode> {
    match strategy {
        TreeStrategy::RootsOnly => build_roots_only(categories),
        TreeStrategy::Nested => build_nested(categories),
    }
}

fn build_roots_only(categories: &[Category]) -> Vec<CategoryNode> {
    let mut roots: Vec<CategoryNode> = categories
        .iter()
        .filter(|category| category.is_root())
        .map(|category| CategoryNode::leaf(category, None))
        .collect();

    for child in categories {
        let Some(parent_id) = child.parent else {
            continue;
        };

        if let Some(root) = roots.iter_mut().find(|root| root.category.id == parent_id) {
            let node = CategoryNode::leaf(child, Some(&root.category));
            root.subcategories.push(node);
        }
    }

    roots
}

fn build_nested(categories: &[Category]) -> Vec<CategoryNode> {
    let mut children: HashMap<CategoryId, Vec<&Category>> = HashMap::new();
    for category in categories {
        if let Some(parent_id) = category.parent {
            children.entry(parent_id).or_default().push(category);
        }
    }

    let mut placed = HashSet::new();
    categories
        .iter()
        .filter(|category| category.is_root())
        .filter_map(|root| attach(root, None, &children, &mut placed))
        .collect()
}

fn attach(
    category: &Category,
    parent: Option<&Category>,
    children: &HashMap<CategoryId, Vec<&Category>>,
    placed: &mut HashSet<CategoryId>,
) -> Option<CategoryNode> {
    if !placed.insert(category.id) {
        return None;
    }

    let mut node = CategoryNode::leaf(category, parent);
    if let Some(kids) = children.get(&category.id) {
        node.subcategories = kids
            .iter()
            .filter_map(|child| attach(child, Some(category), children, placed))
            .collect();
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(name: &str, parent: Option<CategoryId>) -> Category {
        let now = Utc::now();
        Category {
            id: CategoryId::new(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: None,
            parent,
            display_order: 0,
            attributes: Vec::new(),
            seo: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn names(nodes: &[CategoryNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.category.name.as_str()).collect()
    }

    /// Roots A and B, children C (of A), D (of B) and E (of a category
    /// that is not in the list).
    fn sample() -> Vec<Category> {
        let a = category("A", None);
        let b = category("B", None);
        let c = category("C", Some(a.id));
        let d = category("D", Some(b.id));
        let e = category("E", Some(CategoryId::new()));
        vec![a, b, c, d, e]
    }

    #[test]
    fn test_roots_only_depth_one() {
        let tree = build_tree(&sample(), TreeStrategy::RootsOnly);

        assert_eq!(names(&tree), vec!["A", "B"]);
        assert_eq!(names(&tree[0].subcategories), vec!["C"]);
        assert_eq!(names(&tree[1].subcategories), vec!["D"]);
        assert_eq!(tree.iter().map(CategoryNode::node_count).sum::<usize>(), 4);
    }

    #[test]
    fn test_roots_only_drops_grandchildren() {
        let a = category("A", None);
        let c = category("C", Some(a.id));
        let g = category("G", Some(c.id));
        let tree = build_tree(&[a, c, g], TreeStrategy::RootsOnly);

        assert_eq!(names(&tree), vec!["A"]);
        assert_eq!(names(&tree[0].subcategories), vec!["C"]);
        assert!(tree[0].subcategories[0].subcategories.is_empty());
    }

    #[test]
    fn test_nested_keeps_grandchildren() {
        let a = category("A", None);
        let c = category("C", Some(a.id));
        let g = category("G", Some(c.id));
        let tree = build_tree(&[g, a, c], TreeStrategy::Nested);

        assert_eq!(names(&tree), vec!["A"]);
        let c_node = &tree[0].subcategories[0];
        assert_eq!(c_node.category.name, "C");
        assert_eq!(names(&c_node.subcategories), vec!["G"]);
        assert_eq!(
            c_node.subcategories[0]
                .parent_summary
                .as_ref()
                .map(|p| p.name.as_str()),
            Some("C")
        );
    }

    #[test]
    fn test_nested_omits_dangling_parents() {
        let tree = build_tree(&sample(), TreeStrategy::Nested);
        assert_eq!(names(&tree), vec!["A", "B"]);
        assert_eq!(tree.iter().map(CategoryNode::node_count).sum::<usize>(), 4);
    }

    #[test]
    fn test_nested_ignores_cycles() {
        let mut x = category("X", None);
        let y = category("Y", Some(x.id));
        x.parent = Some(y.id);
        let r = category("R", None);

        let tree = build_tree(&[x, y, r], TreeStrategy::Nested);
        assert_eq!(names(&tree), vec!["R"]);
        assert!(tree[0].subcategories.is_empty());
    }

    #[test]
    fn test_siblings_keep_input_order() {
        let a = category("A", None);
        let z = category("Z", Some(a.id));
        let m = category("M", Some(a.id));
        let input = vec![a, z, m];

        for strategy in [TreeStrategy::RootsOnly, TreeStrategy::Nested] {
            let tree = build_tree(&input, strategy);
            assert_eq!(names(&tree[0].subcategories), vec!["Z", "M"]);
            assert_eq!(
                tree[0].subcategories[0]
                    .parent_summary
                    .as_ref()
                    .map(|p| p.id),
                Some(input[0].id)
            );
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(&[], TreeStrategy::RootsOnly).is_empty());
        assert!(build_tree(&[], TreeStrategy::Nested).is_empty());
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("roots".parse::<TreeStrategy>(), Ok(TreeStrategy::RootsOnly));
        assert_eq!("nested".parse::<TreeStrategy>(), Ok(TreeStrategy::Nested));
        assert!("deep".parse::<TreeStrategy>().is_err());
    }
}
