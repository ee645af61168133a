//! Shared editor handle, provided as context to the canvas and the panels.

use std::time::Duration;

use leptos::prelude::*;
use log::debug;

use super::mind_map::{MindMapState, Notice};

/// A notice on screen. `id` lets a timed dismissal skip a newer notice.
#[derive(Clone, Debug, PartialEq)]
pub struct ShownNotice {
	pub id: u64,
	pub notice: Notice,
}

/// Copyable handle to the editor state.
///
/// The state itself is not reactive: the canvas redraws every animation frame.
/// DOM panels subscribe through [`EditorHandle::with`], which tracks a revision
/// counter bumped by [`EditorHandle::update`].
#[derive(Clone, Copy)]
pub struct EditorHandle {
	state: StoredValue<MindMapState, LocalStorage>,
	revision: RwSignal<u64>,
	notices: RwSignal<Vec<ShownNotice>>,
	next_notice: StoredValue<u64>,
	notice_ms: u32,
	/// A generation request is in flight.
	pub busy: RwSignal<bool>,
}

impl EditorHandle {
	pub fn new(state: MindMapState, notice_ms: u32) -> Self {
		Self {
			state: StoredValue::new_local(state),
			revision: RwSignal::new(0),
			notices: RwSignal::new(Vec::new()),
			next_notice: StoredValue::new(0),
			notice_ms,
			busy: RwSignal::new(false),
		}
	}

	/// Reads the state and subscribes the caller to later updates.
	pub fn with<R>(&self, f: impl FnOnce(&MindMapState) -> R) -> R {
		self.revision.track();
		self.state.with_value(f)
	}

	/// Reads the state without subscribing. `None` once the owner is disposed.
	pub fn try_with_untracked<R>(&self, f: impl FnOnce(&MindMapState) -> R) -> Option<R> {
		self.state.try_with_value(f)
	}

	/// Mutates the state, publishes any notices it raised and notifies subscribers.
	pub fn update<R>(&self, f: impl FnOnce(&mut MindMapState) -> R) -> Option<R> {
		let (result, notices) = self
			.state
			.try_update_value(|state| (f(state), state.take_notices()))?;
		for notice in notices {
			self.notify(notice);
		}
		self.revision.update(|revision| *revision += 1);
		Some(result)
	}

	/// Mutates the state without notifying DOM subscribers. For per-frame pointer moves.
	pub fn update_quiet(&self, f: impl FnOnce(&mut MindMapState)) {
		let _ = self.state.try_update_value(f);
	}

	pub fn notices(&self) -> Signal<Vec<ShownNotice>> {
		self.notices.into()
	}

	pub fn notify(&self, notice: Notice) {
		let id = self.next_notice.get_value();
		self.next_notice.set_value(id + 1);
		debug!("notice {}: {}", id, notice.message);

		let transient = notice.is_transient();
		self.notices
			.update(|notices| notices.push(ShownNotice { id, notice }));
		if transient {
			let notices = self.notices;
			set_timeout(
				move || {
					let _ = notices.try_update(|notices| notices.retain(|shown| shown.id != id));
				},
				Duration::from_millis(u64::from(self.notice_ms)),
			);
		}
	}

	pub fn dismiss(&self, id: u64) {
		self.notices
			.update(|notices| notices.retain(|shown| shown.id != id));
	}
}
