use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::geometry::{self, ConnectorKind, Curve};
use super::state::MindMapState;
use crate::graph::{Node, Shape};

const BACKGROUND: &str = "#f7f8fa";
const EDGE_COLOR: &str = "#94a3b8";
const LINK_COLOR: &str = "#d97706";
const NODE_FILL: &str = "#ffffff";
const NODE_BORDER: &str = "#64748b";
const SELECTED_BORDER: &str = "#2563eb";
const REPARENT_TARGET: &str = "#16a34a";
const LINK_TARGET: &str = "#d97706";
const TEXT_COLOR: &str = "#0f172a";

pub fn render(state: &MindMapState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let k = state.viewport.scale();
	let _ = ctx.translate(
		state.width / 2.0 + state.viewport.x(),
		state.height / 2.0 + state.viewport.y(),
	);
	let _ = ctx.scale(k, k);
	draw_connectors(state, ctx);
	draw_drop_preview(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: f64, gap: f64) {
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(dash),
		&JsValue::from_f64(gap),
	));
}

fn clear_dash(ctx: &CanvasRenderingContext2d) {
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn stroke_curve(ctx: &CanvasRenderingContext2d, curve: &Curve) {
	ctx.begin_path();
	ctx.move_to(curve.from.x, curve.from.y);
	ctx.bezier_curve_to(
		curve.c1.x, curve.c1.y, curve.c2.x, curve.c2.y, curve.to.x, curve.to.y,
	);
	ctx.stroke();
}

fn draw_connectors(state: &MindMapState, ctx: &CanvasRenderingContext2d) {
	let k = state.viewport.scale();
	for connector in geometry::connectors(state.graph()) {
		match connector.kind {
			ConnectorKind::Hierarchy => {
				clear_dash(ctx);
				ctx.set_stroke_style_str(EDGE_COLOR);
				ctx.set_line_width(2.0);
			}
			ConnectorKind::Link => {
				set_dash(ctx, 6.0, 4.0);
				ctx.set_stroke_style_str(LINK_COLOR);
				ctx.set_line_width(1.5);
			}
		}
		// keep hairlines visible when zoomed far out
		ctx.set_line_width(ctx.line_width().max(1.0 / k));
		stroke_curve(ctx, &connector.curve);
	}
	clear_dash(ctx);
}

/// Straight dashed line from the dragged node to the node it would attach to.
fn draw_drop_preview(state: &MindMapState, ctx: &CanvasRenderingContext2d) {
	let Some(drag) = state.drag() else {
		return;
	};
	let graph = state.graph();
	let (Some(source), Some(target)) = (
		graph.node(&drag.node_id),
		drag.drop_target.as_deref().and_then(|id| graph.node(id)),
	) else {
		return;
	};

	let color = if drag.link_mode { LINK_TARGET } else { REPARENT_TARGET };
	ctx.set_stroke_style_str(color);
	ctx.set_line_width(2.0);
	if drag.link_mode {
		set_dash(ctx, 4.0, 4.0);
	} else {
		set_dash(ctx, 10.0, 5.0);
	}
	ctx.begin_path();
	ctx.move_to(source.x, source.y);
	ctx.line_to(target.x, target.y);
	ctx.stroke();
	clear_dash(ctx);
}

fn draw_nodes(state: &MindMapState, ctx: &CanvasRenderingContext2d) {
	let link_mode = state.drag().is_some_and(|drag| drag.link_mode);

	for node in state.graph().nodes() {
		let (hw, hh) = geometry::half_extents(node);
		let (border, width) = if state.is_drop_target(&node.id) {
			(if link_mode { LINK_TARGET } else { REPARENT_TARGET }, 3.0)
		} else if state.is_selected(&node.id) {
			(SELECTED_BORDER, 2.5)
		} else {
			(node.style.border.as_deref().unwrap_or(NODE_BORDER), 1.5)
		};

		outline(ctx, node, hw, hh);
		ctx.set_fill_style_str(node.style.background.as_deref().unwrap_or(NODE_FILL));
		ctx.fill();
		ctx.set_stroke_style_str(border);
		ctx.set_line_width(width);
		ctx.stroke();

		ctx.set_fill_style_str(TEXT_COLOR);
		ctx.set_font(&format!("{}px sans-serif", node.style.font_size.px()));
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text_with_max_width(&node.label, node.x, node.y, 2.0 * hw - 12.0);
	}
}

fn outline(ctx: &CanvasRenderingContext2d, node: &Node, hw: f64, hh: f64) {
	let (x, y) = (node.x, node.y);
	ctx.begin_path();
	match node.style.shape {
		Shape::Rectangle => ctx.rect(x - hw, y - hh, 2.0 * hw, 2.0 * hh),
		Shape::Rounded => rounded_rect(ctx, x, y, hw, hh, 8.0),
		Shape::Pill => rounded_rect(ctx, x, y, hw, hh, hh),
		Shape::Ellipse => {
			let _ = ctx.ellipse(x, y, hw, hh, 0.0, 0.0, 2.0 * PI);
		}
	}
	ctx.close_path();
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, hw: f64, hh: f64, r: f64) {
	let r = r.min(hw).min(hh);
	let (left, right, top, bottom) = (x - hw, x + hw, y - hh, y + hh);
	ctx.move_to(left + r, top);
	let _ = ctx.arc_to(right, top, right, bottom, r);
	let _ = ctx.arc_to(right, bottom, left, bottom, r);
	let _ = ctx.arc_to(left, bottom, left, top, r);
	let _ = ctx.arc_to(left, top, right, top, r);
}
