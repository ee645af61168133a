use std::collections::HashSet;

use log::debug;
use rand::Rng;
use uuid::Uuid;

use super::layout::{self, Direction};
use super::model::{Node, SecondaryLink};
use super::tree_index::TreeIndex;
use crate::error::GraphError;

/// Id given to the root of a fresh map.
pub const ROOT_ID: &str = "root";
/// Distance a new child is placed from its parent along the growth axis.
pub const CHILD_OFFSET_HORIZONTAL: f64 = 220.0;
pub const CHILD_OFFSET_VERTICAL: f64 = 120.0;
/// Largest perpendicular jitter applied to a new child, in either direction.
pub const CHILD_JITTER: f64 = 40.0;

/// The canonical node list and secondary-link list.
///
/// Invariants upheld by every operation:
/// - node ids are unique,
/// - parent chains form a forest,
/// - every link joins two distinct live nodes and no unordered pair repeats.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: Vec<Node>,
	links: Vec<SecondaryLink>,
	index: TreeIndex,
}

impl PartialEq for Graph {
	fn eq(&self, other: &Self) -> bool {
		self.nodes == other.nodes && self.links == other.links
	}
}

impl Graph {
	/// Builds a graph from parts already known to be consistent.
	/// Links that reference unknown nodes, self-links and repeated pairs are dropped.
	pub fn from_parts(nodes: Vec<Node>, links: Vec<SecondaryLink>) -> Self {
		let mut graph = Self {
			index: TreeIndex::build(&nodes),
			nodes,
			links: Vec::with_capacity(links.len()),
		};
		for link in links {
			graph.add_link(&link.source_id, &link.target_id);
		}
		graph
	}

	/// A map holding only the permanent root.
	pub fn with_root(label: &str) -> Self {
		Self::from_parts(vec![Node::new(ROOT_ID, None, label)], Vec::new())
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn links(&self) -> &[SecondaryLink] {
		&self.links
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.get(self.index.position(id)?)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.index.contains(id)
	}

	/// The first node without a parent. Deleting it from the UI is refused.
	pub fn permanent_root(&self) -> Option<&Node> {
		self.nodes.iter().find(|node| node.is_root())
	}

	/// Appends a child of `parent_id`, offset along the growth axis with a small
	/// perpendicular jitter. Returns the new id, or `None` when the parent is unknown.
	pub fn add_child(
		&mut self,
		parent_id: &str,
		direction: Direction,
		rng: &mut impl Rng,
	) -> Option<String> {
		let parent = self.node(parent_id)?;
		let jitter = rng.gen_range(-CHILD_JITTER..=CHILD_JITTER);
		let (x, y) = match direction {
			Direction::Horizontal => (parent.x + CHILD_OFFSET_HORIZONTAL, parent.y + jitter),
			Direction::Vertical => (parent.x + jitter, parent.y + CHILD_OFFSET_VERTICAL),
		};
		let id = Uuid::new_v4().to_string();
		let node = Node::new(id.clone(), Some(parent_id), "New idea").at(x, y);

		debug!("add child {} under {}", id, parent_id);
		self.nodes.push(node);
		self.reindex();
		Some(id)
	}

	/// Removes `id`, all of its descendants and every link touching a removed node.
	/// Returns the removed ids; empty when `id` is unknown.
	pub fn delete_subtree(&mut self, id: &str) -> Vec<String> {
		let removed = self.index.subtree(id);
		if removed.is_empty() {
			return removed;
		}
		let doomed: HashSet<&str> = removed.iter().map(String::as_str).collect();
		self.nodes.retain(|node| !doomed.contains(node.id.as_str()));
		self.links.retain(|link| {
			!doomed.contains(link.source_id.as_str()) && !doomed.contains(link.target_id.as_str())
		});

		debug!("deleted subtree of {} ({} nodes)", id, removed.len());
		self.reindex();
		removed
	}

	/// Makes `new_parent_id` the parent of `node_id`. Positions are not touched.
	/// Returns `Ok(false)` when it already was the parent.
	pub fn reparent(&mut self, node_id: &str, new_parent_id: &str) -> Result<bool, GraphError> {
		let position = self
			.index
			.position(node_id)
			.ok_or_else(|| GraphError::UnknownNode(node_id.to_string()))?;
		if !self.contains(new_parent_id) {
			return Err(GraphError::UnknownNode(new_parent_id.to_string()));
		}
		if node_id == new_parent_id || self.index.is_ancestor(&self.nodes, node_id, new_parent_id) {
			return Err(GraphError::AncestorCycle {
				node: node_id.to_string(),
				parent: new_parent_id.to_string(),
			});
		}

		if self.nodes[position].parent_id.as_deref() == Some(new_parent_id) {
			return Ok(false);
		}
		self.nodes[position].parent_id = Some(new_parent_id.to_string());
		self.reindex();
		Ok(true)
	}

	/// Translates `id` and all of its descendants. Returns how many nodes moved.
	///
	/// Runs once per pointer-move frame while dragging, so it only touches the
	/// subtree and leaves the index alone.
	pub fn move_subtree(&mut self, id: &str, dx: f64, dy: f64) -> usize {
		let subtree = self.index.subtree(id);
		for member in &subtree {
			if let Some(position) = self.index.position(member) {
				let node = &mut self.nodes[position];
				node.x += dx;
				node.y += dy;
			}
		}
		subtree.len()
	}

	/// Replaces the node with `patch.id` wholesale. Returns whether anything changed.
	///
	/// The parent is kept as-is; structural changes go through [`Graph::reparent`].
	pub fn update_node(&mut self, patch: Node) -> bool {
		let Some(position) = self.index.position(&patch.id) else {
			return false;
		};
		let current = &mut self.nodes[position];
		let patch = Node {
			parent_id: current.parent_id.clone(),
			..patch
		};
		if *current == patch {
			return false;
		}
		*current = patch;
		true
	}

	/// Adds a link between two live, distinct nodes unless the pair is already linked.
	pub fn add_link(&mut self, source_id: &str, target_id: &str) -> bool {
		if source_id == target_id || !self.contains(source_id) || !self.contains(target_id) {
			return false;
		}
		if self.links.iter().any(|link| link.connects(source_id, target_id)) {
			return false;
		}
		self.links.push(SecondaryLink::new(source_id, target_id));
		true
	}

	/// Removes the link joining the pair, in either order.
	pub fn remove_link(&mut self, source_id: &str, target_id: &str) -> bool {
		let before = self.links.len();
		self.links.retain(|link| !link.connects(source_id, target_id));
		self.links.len() != before
	}

	/// Runs the tree layout over every node.
	pub fn apply_layout(&mut self, direction: Direction) {
		self.nodes = layout::layout(&self.nodes, direction);
	}

	fn reindex(&mut self) {
		self.index = TreeIndex::build(&self.nodes);
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	fn rng() -> StdRng {
		StdRng::seed_from_u64(7)
	}

	/// root ─ a ─ a1
	///      │   └ a2
	///      └ b
	fn sample() -> Graph {
		Graph::from_parts(
			vec![
				Node::new("root", None, "Root"),
				Node::new("a", Some("root"), "A").at(200.0, -50.0),
				Node::new("b", Some("root"), "B").at(200.0, 50.0),
				Node::new("a1", Some("a"), "A1").at(400.0, -80.0),
				Node::new("a2", Some("a"), "A2").at(400.0, -20.0),
			],
			vec![SecondaryLink::new("a1", "b"), SecondaryLink::new("root", "b")],
		)
	}

	#[test]
	fn add_child_twice_then_delete_root() {
		let mut graph = Graph::with_root("Root");
		let mut rng = rng();
		let first = graph.add_child("root", Direction::Horizontal, &mut rng).unwrap();
		let second = graph.add_child("root", Direction::Horizontal, &mut rng).unwrap();

		assert_ne!(first, second);
		assert_eq!(graph.nodes().len(), 3);
		let children = graph
			.nodes()
			.iter()
			.filter(|n| n.parent_id.as_deref() == Some("root"))
			.count();
		assert_eq!(children, 2);

		graph.delete_subtree("root");
		assert!(graph.nodes().is_empty());
		assert!(graph.links().is_empty());
	}

	#[test]
	fn add_child_is_placed_near_parent() {
		let mut graph = sample();
		let id = graph.add_child("b", Direction::Vertical, &mut rng()).unwrap();
		let child = graph.node(&id).unwrap();
		assert_eq!(child.y, 50.0 + CHILD_OFFSET_VERTICAL);
		assert!((child.x - 200.0).abs() <= CHILD_JITTER);
	}

	#[test]
	fn add_child_of_unknown_parent_is_a_no_op() {
		let mut graph = sample();
		let before = graph.clone();
		assert!(graph.add_child("nope", Direction::Horizontal, &mut rng()).is_none());
		assert_eq!(graph, before);
	}

	#[test]
	fn delete_subtree_removes_descendants_and_their_links() {
		let mut graph = sample();
		let mut removed = graph.delete_subtree("a");
		removed.sort();
		assert_eq!(removed, ["a", "a1", "a2"]);

		let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["root", "b"]);
		assert_eq!(graph.links(), [SecondaryLink::new("root", "b")]);
		for link in graph.links() {
			assert!(graph.contains(&link.source_id) && graph.contains(&link.target_id));
		}
	}

	#[test]
	fn delete_unknown_id_changes_nothing() {
		let mut graph = sample();
		let before = graph.clone();
		assert!(graph.delete_subtree("ghost").is_empty());
		assert_eq!(graph, before);
	}

	#[test]
	fn reparent_into_descendant_is_rejected() {
		let mut graph = Graph::from_parts(
			vec![
				Node::new("A", None, "A"),
				Node::new("B", Some("A"), "B"),
				Node::new("C", Some("B"), "C"),
			],
			Vec::new(),
		);
		let before = graph.clone();

		assert_eq!(
			graph.reparent("A", "C"),
			Err(GraphError::AncestorCycle {
				node: "A".into(),
				parent: "C".into()
			})
		);
		assert!(graph.reparent("B", "B").is_err());
		assert_eq!(graph, before);
	}

	#[test]
	fn reparent_changes_exactly_one_parent_and_no_position() {
		let mut graph = sample();
		let before = graph.clone();
		assert_eq!(graph.reparent("a2", "b"), Ok(true));
		assert_eq!(graph.reparent("a2", "b"), Ok(false));

		let changed: Vec<&str> = before
			.nodes()
			.iter()
			.zip(graph.nodes())
			.filter(|(old, new)| old.parent_id != new.parent_id)
			.map(|(old, _)| old.id.as_str())
			.collect();
		assert_eq!(changed, ["a2"]);
		for (old, new) in before.nodes().iter().zip(graph.nodes()) {
			assert_eq!((old.x, old.y), (new.x, new.y));
		}
		assert_eq!(graph.index.children("b"), ["a2".to_string()]);
	}

	#[test]
	fn reparent_to_unknown_node_is_rejected() {
		let mut graph = sample();
		assert_eq!(
			graph.reparent("a", "ghost"),
			Err(GraphError::UnknownNode("ghost".into()))
		);
	}

	#[test]
	fn move_translates_exactly_the_subtree() {
		let mut graph = sample();
		let before = graph.clone();
		assert_eq!(graph.move_subtree("a", 15.0, -7.5), 3);

		for (old, new) in before.nodes().iter().zip(graph.nodes()) {
			let moved = ["a", "a1", "a2"].contains(&old.id.as_str());
			let expected = if moved {
				(old.x + 15.0, old.y - 7.5)
			} else {
				(old.x, old.y)
			};
			assert_eq!((new.x, new.y), expected, "node {}", old.id);
		}

		graph.move_subtree("a", -15.0, 7.5);
		assert_eq!(graph, before);
	}

	#[test]
	fn update_node_keeps_parent() {
		let mut graph = sample();
		let mut patch = graph.node("a").unwrap().clone();
		patch.label = "Renamed".into();
		patch.parent_id = None;

		assert!(graph.update_node(patch.clone()));
		let updated = graph.node("a").unwrap();
		assert_eq!(updated.label, "Renamed");
		assert_eq!(updated.parent_id.as_deref(), Some("root"));

		let unchanged = graph.node("a").unwrap().clone();
		assert!(!graph.update_node(unchanged));
	}

	#[test]
	fn links_are_unordered_and_never_duplicated() {
		let mut graph = sample();
		let count = graph.links().len();

		assert!(graph.add_link("a2", "root"));
		assert!(!graph.add_link("root", "a2"));
		assert_eq!(graph.links().len(), count + 1);

		assert!(!graph.add_link("a", "a"));
		assert!(!graph.add_link("a", "ghost"));
		assert_eq!(graph.links().len(), count + 1);

		assert!(graph.remove_link("root", "a2"));
		assert!(!graph.remove_link("root", "a2"));
		assert_eq!(graph.links().len(), count);
	}

	#[test]
	fn from_parts_prunes_bad_links() {
		let graph = Graph::from_parts(
			vec![Node::new("a", None, "A"), Node::new("b", Some("a"), "B")],
			vec![
				SecondaryLink::new("a", "b"),
				SecondaryLink::new("b", "a"),
				SecondaryLink::new("a", "a"),
				SecondaryLink::new("a", "gone"),
			],
		);
		assert_eq!(graph.links(), [SecondaryLink::new("a", "b")]);
	}

	#[test]
	fn permanent_root_is_first_parentless_node() {
		let graph = sample();
		assert_eq!(graph.permanent_root().map(|n| n.id.as_str()), Some("root"));
	}
}
