use std::collections::{HashMap, HashSet, VecDeque};

use super::model::Node;

/// Adjacency view over a node list: id → position and parent → children.
///
/// Every traversal that the store performs (move, delete, cycle check, layout)
/// goes through this index so they agree on the edge cases: unknown parents
/// make a node a root, and cyclic parent chains terminate.
#[derive(Clone, Debug, Default)]
pub struct TreeIndex {
	positions: HashMap<String, usize>,
	children: HashMap<String, Vec<String>>,
	roots: Vec<String>,
}

impl TreeIndex {
	pub fn build(nodes: &[Node]) -> Self {
		let positions: HashMap<String, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		let mut children: HashMap<String, Vec<String>> = HashMap::new();
		let mut roots = Vec::new();

		for node in nodes {
			match &node.parent_id {
				Some(parent) if positions.contains_key(parent) => {
					children.entry(parent.clone()).or_default().push(node.id.clone());
				}
				_ => roots.push(node.id.clone()),
			}
		}

		Self {
			positions,
			children,
			roots,
		}
	}

	pub fn position(&self, id: &str) -> Option<usize> {
		self.positions.get(id).copied()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.positions.contains_key(id)
	}

	pub fn children(&self, id: &str) -> &[String] {
		self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Nodes whose parent is absent or unknown, in list order.
	pub fn roots(&self) -> &[String] {
		&self.roots
	}

	/// `id` followed by all of its transitive descendants, breadth first.
	/// Empty when `id` is unknown.
	pub fn subtree(&self, id: &str) -> Vec<String> {
		if !self.contains(id) {
			return Vec::new();
		}
		let mut visited = HashSet::new();
		let mut order = Vec::new();
		let mut queue = VecDeque::from([id.to_string()]);

		while let Some(current) = queue.pop_front() {
			if !visited.insert(current.clone()) {
				continue;
			}
			for child in self.children(&current) {
				if !visited.contains(child) {
					queue.push_back(child.clone());
				}
			}
			order.push(current);
		}
		order
	}

	/// True when `ancestor` appears on the parent chain of `id`.
	/// A node is not its own ancestor.
	pub fn is_ancestor(&self, nodes: &[Node], ancestor: &str, id: &str) -> bool {
		let mut visited = HashSet::new();
		let mut current = self.parent_of(nodes, id);

		while let Some(parent) = current {
			if parent == ancestor {
				return true;
			}
			if !visited.insert(parent) {
				return false;
			}
			current = self.parent_of(nodes, parent);
		}
		false
	}

	fn parent_of<'a>(&self, nodes: &'a [Node], id: &str) -> Option<&'a str> {
		let node = nodes.get(self.position(id)?)?;
		node.parent_id.as_deref().filter(|parent| self.contains(parent))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chain() -> Vec<Node> {
		vec![
			Node::new("a", None, "A"),
			Node::new("b", Some("a"), "B"),
			Node::new("c", Some("b"), "C"),
			Node::new("d", Some("a"), "D"),
			Node::new("e", Some("ghost"), "E"),
		]
	}

	#[test]
	fn unknown_parents_become_roots() {
		let index = TreeIndex::build(&chain());
		assert_eq!(index.roots(), ["a".to_string(), "e".to_string()]);
		assert_eq!(index.children("a"), ["b".to_string(), "d".to_string()]);
	}

	#[test]
	fn subtree_collects_every_depth() {
		let index = TreeIndex::build(&chain());
		let mut subtree = index.subtree("a");
		subtree.sort();
		assert_eq!(subtree, ["a", "b", "c", "d"]);
		assert_eq!(index.subtree("c"), ["c"]);
		assert!(index.subtree("missing").is_empty());
	}

	#[test]
	fn ancestor_walk_follows_parent_chain() {
		let nodes = chain();
		let index = TreeIndex::build(&nodes);
		assert!(index.is_ancestor(&nodes, "a", "c"));
		assert!(index.is_ancestor(&nodes, "b", "c"));
		assert!(!index.is_ancestor(&nodes, "c", "a"));
		assert!(!index.is_ancestor(&nodes, "a", "a"));
		assert!(!index.is_ancestor(&nodes, "d", "c"));
	}

	#[test]
	fn cyclic_parent_chains_terminate() {
		let nodes = vec![
			Node::new("x", Some("y"), "X"),
			Node::new("y", Some("x"), "Y"),
		];
		let index = TreeIndex::build(&nodes);
		assert!(index.roots().is_empty());
		assert_eq!(index.subtree("x").len(), 2);
		assert!(index.is_ancestor(&nodes, "y", "x"));
		assert!(!index.is_ancestor(&nodes, "z", "x"));
	}
}
