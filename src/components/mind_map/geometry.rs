//! Node extents and connector curves, in world space.

use crate::graph::{Graph, Node};
use crate::viewport::Point;

/// Approximate glyph advance as a fraction of the font size.
const CHAR_WIDTH_RATIO: f64 = 0.6;
const PADDING_X: f64 = 14.0;
const PADDING_Y: f64 = 10.0;
pub const MIN_HALF_WIDTH: f64 = 40.0;
pub const MAX_HALF_WIDTH: f64 = 140.0;

/// Half width and half height of a node's box. Shared by drawing and hit-testing,
/// so a node is hit exactly where it is drawn.
pub fn half_extents(node: &Node) -> (f64, f64) {
	let font = node.style.font_size.px();
	let text = node.label.chars().count() as f64 * font * CHAR_WIDTH_RATIO;
	let half_width = (text / 2.0 + PADDING_X).clamp(MIN_HALF_WIDTH, MAX_HALF_WIDTH);
	(half_width, font / 2.0 + PADDING_Y)
}

pub fn contains(node: &Node, world: Point) -> bool {
	let (hw, hh) = half_extents(node);
	(world.x - node.x).abs() <= hw && (world.y - node.y).abs() <= hh
}

/// A cubic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Curve {
	pub from: Point,
	pub c1: Point,
	pub c2: Point,
	pub to: Point,
}

impl Curve {
	/// Taut curve between two endpoints.
	///
	/// When the endpoints are further apart horizontally than vertically both
	/// control points sit on the horizontal midpoint at their own endpoint's
	/// height; otherwise on the vertical midpoint at their own endpoint's x.
	pub fn between(from: Point, to: Point) -> Self {
		let (dx, dy) = ((to.x - from.x).abs(), (to.y - from.y).abs());
		if dx > dy {
			let mid = (from.x + to.x) / 2.0;
			Self {
				from,
				c1: Point::new(mid, from.y),
				c2: Point::new(mid, to.y),
				to,
			}
		} else {
			let mid = (from.y + to.y) / 2.0;
			Self {
				from,
				c1: Point::new(from.x, mid),
				c2: Point::new(to.x, mid),
				to,
			}
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorKind {
	/// Parent → child edge.
	Hierarchy,
	/// Secondary link, drawn dashed.
	Link,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
	pub kind: ConnectorKind,
	pub curve: Curve,
}

fn center(node: &Node) -> Point {
	Point::new(node.x, node.y)
}

/// Every parent/child edge followed by every secondary link.
pub fn connectors(graph: &Graph) -> Vec<Connector> {
	let hierarchy = graph.nodes().iter().filter_map(|child| {
		let parent = graph.node(child.parent_id.as_deref()?)?;
		Some(Connector {
			kind: ConnectorKind::Hierarchy,
			curve: Curve::between(center(parent), center(child)),
		})
	});
	let links = graph.links().iter().filter_map(|link| {
		let (source, target) = (graph.node(&link.source_id)?, graph.node(&link.target_id)?);
		Some(Connector {
			kind: ConnectorKind::Link,
			curve: Curve::between(center(source), center(target)),
		})
	});
	hierarchy.chain(links).collect()
}
