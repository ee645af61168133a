//! Pan/zoom state and screen ↔ world conversion.
//!
//! Screen coordinates are canvas pixels from the top-left corner. World origin
//! sits at the canvas center when the pan is zero, so every conversion takes
//! the current canvas [`Size`] explicitly.

use std::ops::{Add, Sub};

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 5.0;
/// Zoom multiplier applied per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn scale(self, factor: f64) -> Self {
		Self::new(self.x * factor, self.y * factor)
	}

	pub fn distance_squared(self, other: Point) -> f64 {
		let (dx, dy) = (self.x - other.x, self.y - other.y);
		dx * dx + dy * dy
	}
}

impl Add for Point {
	type Output = Point;

	fn add(self, rhs: Point) -> Point {
		Point::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

/// Canvas size in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

impl Size {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn center(self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

/// Pan offset in screen pixels plus zoom factor. The scale is clamped to
/// `[MIN_SCALE, MAX_SCALE]` on every change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	x: f64,
	y: f64,
	scale: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			scale: 1.0,
		}
	}
}

impl Viewport {
	pub fn new(x: f64, y: f64, scale: f64) -> Self {
		Self {
			x,
			y,
			scale: clamp_scale(scale),
		}
	}

	pub fn x(&self) -> f64 {
		self.x
	}

	pub fn y(&self) -> f64 {
		self.y
	}

	pub fn scale(&self) -> f64 {
		self.scale
	}

	pub fn pan_offset(&self) -> Point {
		Point::new(self.x, self.y)
	}

	/// Screen-space drag; not divided by the scale.
	pub fn pan(&mut self, dx: f64, dy: f64) {
		self.x += dx;
		self.y += dy;
	}

	pub fn set_scale(&mut self, scale: f64) {
		self.scale = clamp_scale(scale);
	}

	/// Multiplies the scale by `factor`, keeping the world point under `screen` fixed.
	pub fn zoom_at(&mut self, screen: Point, factor: f64, size: Size) {
		let world = self.screen_to_world(screen, size);
		self.set_scale(self.scale * factor);
		let pan = screen - size.center() - world.scale(self.scale);
		self.x = pan.x;
		self.y = pan.y;
	}

	/// Centers the view on `world`, or returns to the origin at scale 1.
	pub fn focus(&mut self, world: Option<Point>) {
		match world {
			Some(point) => {
				let pan = point.scale(-self.scale);
				self.x = pan.x;
				self.y = pan.y;
			}
			None => *self = Viewport::default(),
		}
	}

	pub fn screen_to_world(&self, screen: Point, size: Size) -> Point {
		(screen - size.center() - self.pan_offset()).scale(1.0 / self.scale)
	}

	pub fn world_to_screen(&self, world: Point, size: Size) -> Point {
		world.scale(self.scale) + self.pan_offset() + size.center()
	}

	/// Converts a screen-space delta into a world-space delta.
	pub fn screen_delta_to_world(&self, delta: Point) -> Point {
		delta.scale(1.0 / self.scale)
	}
}

fn clamp_scale(scale: f64) -> f64 {
	if scale.is_finite() {
		scale.clamp(MIN_SCALE, MAX_SCALE)
	} else {
		1.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SIZE: Size = Size::new(800.0, 600.0);

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
	}

	#[test]
	fn world_origin_maps_to_canvas_center() {
		let viewport = Viewport::default();
		assert_eq!(viewport.world_to_screen(Point::default(), SIZE), Point::new(400.0, 300.0));
		assert_eq!(viewport.screen_to_world(Point::new(400.0, 300.0), SIZE), Point::default());
	}

	#[test]
	fn conversions_are_inverse() {
		let viewport = Viewport::new(-35.0, 12.5, 1.7);
		let screen = Point::new(123.0, 456.0);
		let world = viewport.screen_to_world(screen, SIZE);
		assert!(close(viewport.world_to_screen(world, SIZE), screen));
	}

	#[test]
	fn pan_is_unscaled() {
		let mut viewport = Viewport::new(0.0, 0.0, 2.0);
		viewport.pan(10.0, -4.0);
		assert_eq!((viewport.x(), viewport.y(), viewport.scale()), (10.0, -4.0, 2.0));
	}

	#[test]
	fn zoom_keeps_point_under_cursor() {
		let mut viewport = Viewport::new(20.0, -10.0, 1.0);
		let cursor = Point::new(600.0, 150.0);
		let before = viewport.screen_to_world(cursor, SIZE);

		viewport.zoom_at(cursor, 1.5, SIZE);
		assert_eq!(viewport.scale(), 1.5);
		assert!(close(viewport.screen_to_world(cursor, SIZE), before));

		viewport.zoom_at(cursor, 1.0 / 3.0, SIZE);
		assert!(close(viewport.screen_to_world(cursor, SIZE), before));
	}

	#[test]
	fn scale_is_clamped_on_every_change() {
		let mut viewport = Viewport::new(0.0, 0.0, 50.0);
		assert_eq!(viewport.scale(), MAX_SCALE);
		viewport.zoom_at(Point::default(), 0.0001, SIZE);
		assert_eq!(viewport.scale(), MIN_SCALE);
		viewport.set_scale(f64::NAN);
		assert_eq!(viewport.scale(), 1.0);
	}

	#[test]
	fn zoom_at_clamp_still_pins_cursor() {
		let mut viewport = Viewport::new(0.0, 0.0, 4.0);
		let cursor = Point::new(100.0, 100.0);
		let before = viewport.screen_to_world(cursor, SIZE);
		viewport.zoom_at(cursor, 10.0, SIZE);
		assert_eq!(viewport.scale(), MAX_SCALE);
		assert!(close(viewport.screen_to_world(cursor, SIZE), before));
	}

	#[test]
	fn focus_centers_point_or_resets() {
		let mut viewport = Viewport::new(99.0, 99.0, 2.0);
		viewport.focus(Some(Point::new(50.0, -20.0)));
		assert!(close(
			viewport.world_to_screen(Point::new(50.0, -20.0), SIZE),
			SIZE.center()
		));
		assert_eq!(viewport.scale(), 2.0);

		viewport.focus(None);
		assert_eq!(viewport, Viewport::default());
	}
}
