use std::cell::RefCell;
use std::rc::Rc;

use leptos::ev;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent,
	WheelEvent,
};

use super::render;
use super::types::Modifiers;
use crate::components::editor::EditorHandle;
use crate::viewport::Point;

/// Pixels per line for wheel events reported in lines.
const WHEEL_LINE_HEIGHT: f64 = 16.0;

fn mouse_modifiers(ev: &MouseEvent) -> Modifiers {
	Modifiers {
		alt: ev.alt_key(),
		ctrl: ev.ctrl_key(),
		meta: ev.meta_key(),
		shift: ev.shift_key(),
	}
}

fn key_modifiers(ev: &KeyboardEvent) -> Modifiers {
	Modifiers {
		alt: ev.alt_key(),
		ctrl: ev.ctrl_key(),
		meta: ev.meta_key(),
		shift: ev.shift_key(),
	}
}

/// True when a key event was aimed at a text field.
fn typing_into_field(ev: &KeyboardEvent) -> bool {
	ev.target()
		.and_then(|target| target.dyn_into::<HtmlElement>().ok())
		.is_some_and(|el| {
			matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
				|| el.is_content_editable()
		})
}

fn canvas_point(canvas: &NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Sizes the canvas to its parent and tells the editor the new viewport size.
fn fit_canvas(canvas: &HtmlCanvasElement, editor: EditorHandle) {
	let (w, h) = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.unwrap_or((800.0, 600.0));
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	editor.update_quiet(|s| s.resize(w, h));
}

/// Canvas bound to the [`EditorHandle`] in context. Fills its parent element
/// and follows window resizes.
#[component]
pub fn MindMapCanvas() -> impl IntoView {
	let editor = expect_context::<EditorHandle>();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		fit_canvas(&canvas, editor);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("2d canvas context unavailable");
			return;
		};
		editor.update_quiet(|s| s.focus_root());

		let animate_inner = animate.clone();
		*animate.borrow_mut() = Some(Closure::new(move || {
			if editor
				.try_with_untracked(|s| render::render(s, &ctx))
				.is_none()
			{
				// editor disposed with the page; stop the loop
				return;
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let keydown = window_event_listener(ev::keydown, move |ev: KeyboardEvent| {
		if typing_into_field(&ev) {
			return;
		}
		let handled = editor
			.update(|s| s.on_key_down(&ev.key(), key_modifiers(&ev)))
			.unwrap_or(false);
		if handled {
			ev.prevent_default();
		}
	});
	let resize = window_event_listener(ev::resize, move |_| {
		if let Some(canvas) = canvas_ref.get_untracked() {
			let canvas: HtmlCanvasElement = canvas.into();
			fit_canvas(&canvas, editor);
		}
	});
	on_cleanup(move || {
		keydown.remove();
		resize.remove();
	});

	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(point) = canvas_point(&canvas_ref, &ev) else {
			return;
		};
		editor.update(|s| s.on_pointer_down(point, mouse_modifiers(&ev)));
	};

	let on_mousemove = move |ev: MouseEvent| {
		let Some(point) = canvas_point(&canvas_ref, &ev) else {
			return;
		};
		editor.update_quiet(|s| s.on_pointer_move(point));
	};

	let on_mouseup = move |_: MouseEvent| {
		editor.update(|s| s.on_pointer_up());
	};

	let on_mouseleave = move |_: MouseEvent| {
		editor.update(|s| s.on_pointer_leave());
	};

	let on_dblclick = move |ev: MouseEvent| {
		let Some(point) = canvas_point(&canvas_ref, &ev) else {
			return;
		};
		editor.update_quiet(|s| s.on_double_click(point));
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(point) = canvas_point(&canvas_ref, &ev) else {
			return;
		};
		let unit = if ev.delta_mode() == WheelEvent::DOM_DELTA_LINE {
			WHEEL_LINE_HEIGHT
		} else {
			1.0
		};
		let (dx, dy) = (ev.delta_x() * unit, ev.delta_y() * unit);
		editor.update_quiet(|s| s.on_wheel(point, dx, dy, mouse_modifiers(&ev)));
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="mind-map-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
