use std::convert::Infallible;
use std::mem;

use log::debug;

use super::store::Graph;

/// Snapshot state of the gesture currently in progress.
#[derive(Clone, Debug, Default)]
enum Checkpoint {
	#[default]
	Idle,
	/// Gesture started; its before-snapshot has not been needed yet.
	Pending(Box<Graph>),
	/// The before-snapshot is on the past stack; further changes in this gesture fold into it.
	Recorded,
}

/// Linear undo/redo over whole-graph snapshots.
///
/// Each committed mutation pushes the previous graph onto `past` and clears
/// `future`. A pointer gesture shares a single entry: the graph as it was when
/// the gesture began.
#[derive(Clone, Debug, Default)]
pub struct History {
	present: Graph,
	past: Vec<Graph>,
	future: Vec<Graph>,
	checkpoint: Checkpoint,
}

impl History {
	pub fn new(present: Graph) -> Self {
		Self {
			present,
			..Self::default()
		}
	}

	pub fn present(&self) -> &Graph {
		&self.present
	}

	pub fn can_undo(&self) -> bool {
		!self.past.is_empty()
	}

	pub fn can_redo(&self) -> bool {
		!self.future.is_empty()
	}

	pub fn depth(&self) -> (usize, usize) {
		(self.past.len(), self.future.len())
	}

	/// Applies `mutate` to a scratch copy and keeps it only when it returns `Ok(true)`.
	///
	/// `Ok(false)` (nothing changed) and `Err` leave both the graph and the stacks untouched.
	pub fn apply<E>(&mut self, mutate: impl FnOnce(&mut Graph) -> Result<bool, E>) -> Result<bool, E> {
		let mut next = self.present.clone();
		if !mutate(&mut next)? {
			return Ok(false);
		}
		let previous = mem::replace(&mut self.present, next);
		self.record(previous);
		Ok(true)
	}

	/// [`History::apply`] for mutations that cannot fail.
	pub fn commit(&mut self, mutate: impl FnOnce(&mut Graph) -> bool) -> bool {
		self.apply(|graph| Ok::<_, Infallible>(mutate(graph)))
			.unwrap_or_else(|never| match never {})
	}

	/// Replaces the whole graph as one committed mutation (reset, import, generation).
	pub fn replace(&mut self, graph: Graph) {
		self.commit(move |present| {
			*present = graph;
			true
		});
	}

	/// Marks the start of a continuous gesture. The current graph becomes the
	/// undo target of everything the gesture changes.
	pub fn begin_gesture(&mut self) {
		self.checkpoint = Checkpoint::Pending(Box::new(self.present.clone()));
	}

	/// Mutable access for per-frame changes such as dragging.
	///
	/// Outside a gesture this records an entry every call; inside one only the
	/// first call does.
	pub fn transient(&mut self) -> &mut Graph {
		match mem::take(&mut self.checkpoint) {
			Checkpoint::Idle => {
				let previous = self.present.clone();
				self.record(previous);
			}
			Checkpoint::Pending(before) => {
				self.past.push(*before);
				self.future.clear();
				self.checkpoint = Checkpoint::Recorded;
			}
			Checkpoint::Recorded => self.checkpoint = Checkpoint::Recorded,
		}
		&mut self.present
	}

	pub fn end_gesture(&mut self) {
		self.checkpoint = Checkpoint::Idle;
	}

	pub fn undo(&mut self) -> bool {
		self.end_gesture();
		let Some(previous) = self.past.pop() else {
			return false;
		};
		let current = mem::replace(&mut self.present, previous);
		self.future.push(current);
		debug!("undo ({} left)", self.past.len());
		true
	}

	pub fn redo(&mut self) -> bool {
		self.end_gesture();
		let Some(next) = self.future.pop() else {
			return false;
		};
		let current = mem::replace(&mut self.present, next);
		self.past.push(current);
		debug!("redo ({} left)", self.future.len());
		true
	}

	/// Pushes the undo entry for a change. Inside a gesture the gesture's
	/// before-snapshot is pushed instead of `previous`, and only once.
	fn record(&mut self, previous: Graph) {
		self.checkpoint = match mem::take(&mut self.checkpoint) {
			Checkpoint::Idle => {
				self.past.push(previous);
				Checkpoint::Idle
			}
			Checkpoint::Pending(before) => {
				self.past.push(*before);
				Checkpoint::Recorded
			}
			Checkpoint::Recorded => Checkpoint::Recorded,
		};
		self.future.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::GraphError;
	use crate::graph::model::Node;

	fn chain() -> Graph {
		Graph::from_parts(
			vec![
				Node::new("A", None, "A"),
				Node::new("B", Some("A"), "B").at(100.0, 0.0),
				Node::new("C", Some("B"), "C").at(200.0, 0.0),
			],
			Vec::new(),
		)
	}

	#[test]
	fn undo_and_redo_restore_exact_snapshots() {
		let mut history = History::new(chain());
		let before = history.present().clone();

		assert!(history.commit(|g| g.add_link("A", "C")));
		let after = history.present().clone();

		assert!(history.undo());
		assert_eq!(*history.present(), before);
		assert!(history.redo());
		assert_eq!(*history.present(), after);
	}

	#[test]
	fn new_commit_clears_redo() {
		let mut history = History::new(chain());
		history.commit(|g| g.add_link("A", "C"));
		history.undo();
		assert!(history.can_redo());

		history.commit(|g| !g.delete_subtree("C").is_empty());
		assert!(!history.can_redo());
		let current = history.present().clone();
		assert!(!history.redo());
		assert_eq!(*history.present(), current);
	}

	#[test]
	fn empty_stacks_are_no_ops() {
		let mut history = History::new(chain());
		let before = history.present().clone();
		assert!(!history.undo());
		assert!(!history.redo());
		assert_eq!(*history.present(), before);
	}

	#[test]
	fn rejected_and_unchanged_mutations_record_nothing() {
		let mut history = History::new(chain());
		let before = history.present().clone();

		let result = history.apply(|g| g.reparent("A", "C"));
		assert!(matches!(result, Err(GraphError::AncestorCycle { .. })));
		assert!(!history.commit(|g| g.add_link("A", "A")));

		assert_eq!(*history.present(), before);
		assert_eq!(history.depth(), (0, 0));
	}

	#[test]
	fn a_drag_records_one_entry_holding_the_pre_drag_state() {
		let mut history = History::new(chain());
		let before = history.present().clone();

		history.begin_gesture();
		for _ in 0..10 {
			history.transient().move_subtree("B", 3.0, 1.0);
		}
		assert_eq!(history.apply(|g| g.reparent("C", "A")), Ok(true));
		history.end_gesture();

		assert_eq!(history.depth(), (1, 0));
		assert_eq!(history.present().node("B").unwrap().x, 130.0);
		assert_eq!(history.present().node("C").unwrap().parent_id.as_deref(), Some("A"));

		history.undo();
		assert_eq!(*history.present(), before);
	}

	#[test]
	fn a_gesture_without_changes_records_nothing() {
		let mut history = History::new(chain());
		history.begin_gesture();
		history.end_gesture();
		assert_eq!(history.depth(), (0, 0));

		history.commit(|g| g.add_link("A", "C"));
		assert_eq!(history.depth(), (1, 0));
	}

	#[test]
	fn replace_is_undoable() {
		let mut history = History::new(chain());
		let before = history.present().clone();
		history.replace(Graph::with_root("Fresh"));
		assert_eq!(history.present().nodes().len(), 1);
		history.undo();
		assert_eq!(*history.present(), before);
	}
}
