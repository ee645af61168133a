use std::mem;

use log::{debug, info};
use rand::rngs::StdRng;

use super::geometry;
use super::types::{Modifiers, Notice};
use crate::document::Imported;
use crate::error::GenerateError;
use crate::generate::{self, GeneratedNode};
use crate::graph::{Direction, Graph, History, Node, layout};
use crate::viewport::{Point, Size, Viewport, ZOOM_STEP};

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

/// Label of the root in a fresh map.
pub const ROOT_LABEL: &str = "Central idea";

#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
	pub node_id: String,
	/// Alt was held at pointer-down: dropping creates a link instead of reparenting.
	pub link_mode: bool,
	pub start: Point,
	pub last: Point,
	/// Node under the pointer, refreshed on every move.
	pub drop_target: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PanState {
	pub last: Point,
}

/// One pointer gesture, from press to release.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	Idle,
	Panning(PanState),
	NodeDragging(DragState),
}

/// What a finished gesture did to the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureOutcome {
	None,
	Moved,
	Linked,
	Reparented,
	Rejected,
}

/// Everything the canvas needs: the undoable graph, the viewport, the current
/// gesture and the selection. Free of browser types so it can be driven from tests.
pub struct MindMapState {
	pub history: History,
	pub viewport: Viewport,
	pub gesture: Gesture,
	pub selected: Option<String>,
	pub direction: Direction,
	pub width: f64,
	pub height: f64,
	notices: Vec<Notice>,
	rng: StdRng,
}

impl MindMapState {
	pub fn new(graph: Graph, direction: Direction, width: f64, height: f64, rng: StdRng) -> Self {
		Self {
			history: History::new(graph),
			viewport: Viewport::default(),
			gesture: Gesture::Idle,
			selected: None,
			direction,
			width,
			height,
			notices: Vec::new(),
			rng,
		}
	}

	pub fn graph(&self) -> &Graph {
		self.history.present()
	}

	pub fn size(&self) -> Size {
		Size::new(self.width, self.height)
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn screen_to_graph(&self, screen: Point) -> Point {
		self.viewport.screen_to_world(screen, self.size())
	}

	/// Topmost node drawn under a screen point.
	pub fn node_at_position(&self, screen: Point) -> Option<&Node> {
		let world = self.screen_to_graph(screen);
		self.graph()
			.nodes()
			.iter()
			.rev()
			.find(|node| geometry::contains(node, world))
	}

	/// Node other than `dragged` whose box contains `world`, nearest center first.
	/// Ties go to the node earlier in the list.
	pub fn drop_target_at(&self, world: Point, dragged: &str) -> Option<String> {
		self.graph()
			.nodes()
			.iter()
			.filter(|node| node.id != dragged && geometry::contains(node, world))
			.min_by(|a, b| {
				let da = world.distance_squared(Point::new(a.x, a.y));
				let db = world.distance_squared(Point::new(b.x, b.y));
				da.total_cmp(&db)
			})
			.map(|node| node.id.clone())
	}

	pub fn selected_node(&self) -> Option<&Node> {
		self.graph().node(self.selected.as_deref()?)
	}

	pub fn drag(&self) -> Option<&DragState> {
		match &self.gesture {
			Gesture::NodeDragging(drag) => Some(drag),
			_ => None,
		}
	}

	pub fn is_selected(&self, id: &str) -> bool {
		self.selected.as_deref() == Some(id)
	}

	pub fn is_drop_target(&self, id: &str) -> bool {
		self.drag()
			.and_then(|drag| drag.drop_target.as_deref())
			.is_some_and(|target| target == id)
	}

	pub fn take_notices(&mut self) -> Vec<Notice> {
		mem::take(&mut self.notices)
	}

	fn notify(&mut self, notice: Notice) {
		self.notices.push(notice);
	}

	// --- Pointer input ---

	/// Starts dragging the node under the pointer, or panning when over the background.
	pub fn on_pointer_down(&mut self, screen: Point, modifiers: Modifiers) {
		match self.node_at_position(screen).map(|node| node.id.clone()) {
			Some(id) => {
				debug!("drag start on {} (link mode: {})", id, modifiers.alt);
				self.selected = Some(id.clone());
				self.history.begin_gesture();
				self.gesture = Gesture::NodeDragging(DragState {
					node_id: id,
					link_mode: modifiers.alt,
					start: screen,
					last: screen,
					drop_target: None,
				});
			}
			None => {
				self.selected = None;
				self.gesture = Gesture::Panning(PanState { last: screen });
			}
		}
	}

	pub fn on_pointer_move(&mut self, screen: Point) {
		let mut gesture = mem::take(&mut self.gesture);
		match &mut gesture {
			Gesture::Idle => {}
			Gesture::Panning(pan) => {
				let delta = screen - pan.last;
				self.viewport.pan(delta.x, delta.y);
				pan.last = screen;
			}
			Gesture::NodeDragging(drag) => {
				let delta = self.viewport.screen_delta_to_world(screen - drag.last);
				if delta != Point::default() {
					self.history
						.transient()
						.move_subtree(&drag.node_id, delta.x, delta.y);
				}
				drag.last = screen;
				drag.drop_target = self.drop_target_at(self.screen_to_graph(screen), &drag.node_id);
			}
		}
		self.gesture = gesture;
	}

	/// Ends the gesture. A drag released over another node links or reparents;
	/// a rejected reparent keeps the moved position and raises a notice.
	pub fn on_pointer_up(&mut self) -> GestureOutcome {
		let outcome = match mem::take(&mut self.gesture) {
			Gesture::Idle | Gesture::Panning(_) => GestureOutcome::None,
			Gesture::NodeDragging(drag) => self.finish_drag(drag),
		};
		self.history.end_gesture();
		outcome
	}

	/// Pointer left the canvas: the gesture ends without a drop.
	pub fn on_pointer_leave(&mut self) {
		self.cancel_gesture();
	}

	fn finish_drag(&mut self, drag: DragState) -> GestureOutcome {
		let moved = if drag.start != drag.last {
			GestureOutcome::Moved
		} else {
			GestureOutcome::None
		};
		let Some(target) = drag.drop_target else {
			return moved;
		};

		if drag.link_mode {
			if self.history.commit(|graph| graph.add_link(&drag.node_id, &target)) {
				info!("linked {} and {}", drag.node_id, target);
				return GestureOutcome::Linked;
			}
			return moved;
		}

		match self.history.apply(|graph| graph.reparent(&drag.node_id, &target)) {
			Ok(true) => {
				info!("reparented {} under {}", drag.node_id, target);
				GestureOutcome::Reparented
			}
			Ok(false) => moved,
			Err(err) => {
				info!("reparent rejected: {}", err);
				self.notify(Notice::warning(err.to_string()));
				GestureOutcome::Rejected
			}
		}
	}

	pub fn cancel_gesture(&mut self) {
		self.gesture = Gesture::Idle;
		self.history.end_gesture();
	}

	/// Command-scroll zooms around the pointer; plain scroll pans.
	pub fn on_wheel(&mut self, screen: Point, dx: f64, dy: f64, modifiers: Modifiers) {
		if modifiers.command() {
			if dy == 0.0 {
				return;
			}
			let factor = if dy < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
			let size = self.size();
			self.viewport.zoom_at(screen, factor, size);
		} else {
			self.viewport.pan(-dx, -dy);
		}
	}

	pub fn on_double_click(&mut self, screen: Point) {
		if let Some(id) = self.node_at_position(screen).map(|node| node.id.clone()) {
			self.focus_node(&id);
		}
	}

	// --- Keyboard ---

	/// Editing shortcuts. Returns whether the key was consumed.
	///
	/// The caller must not forward keys typed into text fields.
	pub fn on_key_down(&mut self, key: &str, modifiers: Modifiers) -> bool {
		match key {
			"z" | "Z" if modifiers.command() => {
				if modifiers.shift {
					self.redo();
				} else {
					self.undo();
				}
			}
			"y" | "Y" if modifiers.command() => {
				self.redo();
			}
			_ if modifiers.command() => return false,
			"Tab" => {
				self.add_child_to_selected();
			}
			"Enter" => {
				self.add_sibling_to_selected();
			}
			"Delete" | "Backspace" => {
				self.delete_selected();
			}
			"Escape" => {
				self.cancel_gesture();
				self.selected = None;
			}
			_ => return false,
		}
		true
	}

	// --- Commands ---

	/// Adds a child of `parent_id` and selects it.
	pub fn add_child(&mut self, parent_id: &str) -> Option<String> {
		let (direction, rng) = (self.direction, &mut self.rng);
		let mut created = None;
		self.history.commit(|graph| {
			created = graph.add_child(parent_id, direction, rng);
			created.is_some()
		});
		if created.is_some() {
			self.selected = created.clone();
		}
		created
	}

	pub fn add_child_to_selected(&mut self) -> Option<String> {
		let Some(selected) = self.selected.clone() else {
			self.notify(Notice::info("Select a node first."));
			return None;
		};
		self.add_child(&selected)
	}

	pub fn add_sibling_to_selected(&mut self) -> Option<String> {
		let Some(node) = self.selected_node() else {
			self.notify(Notice::info("Select a node first."));
			return None;
		};
		match node.parent_id.clone() {
			Some(parent) => self.add_child(&parent),
			None => {
				self.notify(Notice::warning(
					"A root node has no siblings. Press Tab to add a child.",
				));
				None
			}
		}
	}

	/// Deletes the selected subtree and selects its parent. The permanent root is refused.
	pub fn delete_selected(&mut self) -> bool {
		let Some(node) = self.selected_node() else {
			return false;
		};
		let is_root = self
			.graph()
			.permanent_root()
			.is_some_and(|root| root.id == node.id);
		if is_root {
			self.notify(Notice::warning("The root node cannot be deleted."));
			return false;
		}
		let (id, parent) = (node.id.clone(), node.parent_id.clone());
		let deleted = self
			.history
			.commit(|graph| !graph.delete_subtree(&id).is_empty());
		if deleted {
			self.selected = parent;
		}
		deleted
	}

	pub fn update_node(&mut self, patch: Node) -> bool {
		self.history.commit(|graph| graph.update_node(patch))
	}

	pub fn add_link(&mut self, source_id: &str, target_id: &str) -> bool {
		self.history.commit(|graph| graph.add_link(source_id, target_id))
	}

	pub fn remove_link(&mut self, source_id: &str, target_id: &str) -> bool {
		self.history.commit(|graph| graph.remove_link(source_id, target_id))
	}

	pub fn undo(&mut self) -> bool {
		self.gesture = Gesture::Idle;
		let changed = self.history.undo();
		self.drop_stale_selection();
		changed
	}

	pub fn redo(&mut self) -> bool {
		self.gesture = Gesture::Idle;
		let changed = self.history.redo();
		self.drop_stale_selection();
		changed
	}

	fn drop_stale_selection(&mut self) {
		if let Some(id) = &self.selected {
			if !self.graph().contains(id) {
				self.selected = None;
			}
		}
	}

	/// Re-runs the tree layout over the whole graph.
	pub fn auto_layout(&mut self) -> bool {
		let direction = self.direction;
		self.history.commit(|graph| {
			let before = graph.nodes().to_vec();
			graph.apply_layout(direction);
			graph.nodes() != before.as_slice()
		})
	}

	pub fn set_direction(&mut self, direction: Direction) {
		self.direction = direction;
		self.auto_layout();
	}

	/// Starts over with a lone root.
	pub fn reset(&mut self) {
		self.load_graph(Graph::with_root(ROOT_LABEL));
	}

	pub fn load_imported(&mut self, imported: Imported) {
		self.direction = imported.direction;
		let count = imported.graph.nodes().len();
		self.load_graph(imported.graph);
		let message = if imported.laid_out {
			format!("Loaded {} nodes. The file had no positions, so they were laid out.", count)
		} else {
			format!("Loaded {} nodes.", count)
		};
		self.notify(Notice::info(message));
	}

	/// Replaces the map with a generated node list, laid out in the current direction.
	pub fn load_generated(&mut self, generated: Vec<GeneratedNode>) -> Result<(), GenerateError> {
		let nodes = generate::into_tree(generated)?;
		let nodes = layout(&nodes, self.direction);
		self.load_graph(Graph::from_parts(nodes, Vec::new()));
		Ok(())
	}

	fn load_graph(&mut self, graph: Graph) {
		self.cancel_gesture();
		self.history.replace(graph);
		self.selected = None;
		self.focus_root();
	}

	pub fn focus_node(&mut self, id: &str) {
		if let Some(node) = self.graph().node(id) {
			let center = Point::new(node.x, node.y);
			self.viewport.focus(Some(center));
		}
	}

	pub fn focus_root(&mut self) {
		let root = self
			.graph()
			.permanent_root()
			.map(|root| Point::new(root.x, root.y));
		self.viewport.focus(None);
		if let Some(point) = root {
			self.viewport.focus(Some(point));
		}
	}

	pub fn reset_view(&mut self) {
		self.viewport.focus(None);
	}
}
