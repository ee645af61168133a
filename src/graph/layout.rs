use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::model::Node;
use super::tree_index::TreeIndex;

/// Distance between depth levels when the tree grows rightwards.
pub const LEVEL_SPACING_HORIZONTAL: f64 = 240.0;
/// Distance between neighbouring leaves when the tree grows rightwards.
pub const SIBLING_SPACING_HORIZONTAL: f64 = 72.0;
pub const LEVEL_SPACING_VERTICAL: f64 = 140.0;
pub const SIBLING_SPACING_VERTICAL: f64 = 200.0;

/// Growth axis of the tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
	#[default]
	Horizontal,
	Vertical,
}

impl Direction {
	pub fn toggled(self) -> Self {
		match self {
			Direction::Horizontal => Direction::Vertical,
			Direction::Vertical => Direction::Horizontal,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Direction::Horizontal => "horizontal",
			Direction::Vertical => "vertical",
		}
	}

	/// Maps (depth, breadth) to world (x, y).
	fn place(self, depth: f64, breadth: f64) -> (f64, f64) {
		match self {
			Direction::Horizontal => (
				depth * LEVEL_SPACING_HORIZONTAL,
				breadth * SIBLING_SPACING_HORIZONTAL,
			),
			Direction::Vertical => (
				breadth * SIBLING_SPACING_VERTICAL,
				depth * LEVEL_SPACING_VERTICAL,
			),
		}
	}
}

/// Assigns a position to every node from its depth and subtree breadth.
///
/// Leaves take consecutive breadth slots and parents sit centered over their
/// children. Roots are laid out as siblings under a virtual super-root that is
/// never emitted. Nodes trapped in a parent cycle are placed as extra roots.
pub fn layout(nodes: &[Node], direction: Direction) -> Vec<Node> {
	let index = TreeIndex::build(nodes);
	let mut slots: HashMap<String, (f64, f64)> = HashMap::with_capacity(nodes.len());
	let mut visited = HashSet::with_capacity(nodes.len());
	let mut cursor = 0.0;

	for root in index.roots() {
		place_subtree(&index, root, &mut cursor, &mut visited, &mut slots);
	}
	for node in nodes {
		if !visited.contains(node.id.as_str()) {
			place_subtree(&index, &node.id, &mut cursor, &mut visited, &mut slots);
		}
	}

	let center = (cursor - 1.0).max(0.0) / 2.0;
	nodes
		.iter()
		.map(|node| {
			let (depth, breadth) = slots.get(&node.id).copied().unwrap_or_default();
			let (x, y) = direction.place(depth, breadth - center);
			Node {
				x,
				y,
				..node.clone()
			}
		})
		.collect()
}

/// A node whose children are still being placed.
struct Frame<'a> {
	id: &'a str,
	depth: f64,
	next_child: usize,
	first: Option<f64>,
	last: f64,
}

impl<'a> Frame<'a> {
	fn new(id: &'a str, depth: f64) -> Self {
		Self {
			id,
			depth,
			next_child: 0,
			first: None,
			last: 0.0,
		}
	}
}

/// Post-order walk from `root` with an explicit stack, so chain depth is not
/// bounded by the call stack.
fn place_subtree<'a>(
	index: &'a TreeIndex,
	root: &'a str,
	cursor: &mut f64,
	visited: &mut HashSet<String>,
	slots: &mut HashMap<String, (f64, f64)>,
) {
	visited.insert(root.to_string());
	let mut stack = vec![Frame::new(root, 0.0)];

	while let Some(frame) = stack.last_mut() {
		if let Some(child) = index.children(frame.id).get(frame.next_child) {
			frame.next_child += 1;
			let depth = frame.depth + 1.0;
			if visited.insert(child.clone()) {
				stack.push(Frame::new(child, depth));
			}
			continue;
		}

		let breadth = match frame.first {
			Some(first) => (first + frame.last) / 2.0,
			None => {
				let slot = *cursor;
				*cursor += 1.0;
				slot
			}
		};
		slots.insert(frame.id.to_string(), (frame.depth, breadth));
		stack.pop();
		if let Some(parent) = stack.last_mut() {
			parent.first.get_or_insert(breadth);
			parent.last = breadth;
		}
	}
}
