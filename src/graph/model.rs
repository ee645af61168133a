use serde::{Deserialize, Serialize};

/// Outline drawn around a node's label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Shape {
	#[default]
	Rounded,
	Rectangle,
	Pill,
	Ellipse,
}

impl Shape {
	/// Every variant, in the order the properties panel lists them.
	pub const ALL: [Shape; 4] = [Shape::Rounded, Shape::Rectangle, Shape::Pill, Shape::Ellipse];

	/// Parses a stored shape name. Unknown names fall back to [`Shape::Rounded`].
	pub fn parse(name: &str) -> Self {
		match name.trim().to_ascii_lowercase().as_str() {
			"rectangle" | "rect" => Shape::Rectangle,
			"pill" => Shape::Pill,
			"ellipse" | "circle" => Shape::Ellipse,
			_ => Shape::Rounded,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Shape::Rounded => "rounded",
			Shape::Rectangle => "rectangle",
			Shape::Pill => "pill",
			Shape::Ellipse => "ellipse",
		}
	}
}

impl From<String> for Shape {
	fn from(name: String) -> Self {
		Shape::parse(&name)
	}
}

impl From<Shape> for String {
	fn from(shape: Shape) -> Self {
		shape.as_str().to_string()
	}
}

/// Font-size tier of a node label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontSize {
	Small,
	#[default]
	Medium,
	Large,
}

impl FontSize {
	/// Every tier, smallest first.
	pub const ALL: [FontSize; 3] = [FontSize::Small, FontSize::Medium, FontSize::Large];

	/// Parses a stored tier name. Unknown names fall back to [`FontSize::Medium`].
	pub fn parse(name: &str) -> Self {
		match name.trim().to_ascii_lowercase().as_str() {
			"small" | "sm" => FontSize::Small,
			"large" | "lg" => FontSize::Large,
			_ => FontSize::Medium,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			FontSize::Small => "small",
			FontSize::Medium => "medium",
			FontSize::Large => "large",
		}
	}

	/// Label size in world units.
	pub fn px(self) -> f64 {
		match self {
			FontSize::Small => 12.0,
			FontSize::Medium => 14.0,
			FontSize::Large => 18.0,
		}
	}
}

impl From<String> for FontSize {
	fn from(name: String) -> Self {
		FontSize::parse(&name)
	}
}

impl From<FontSize> for String {
	fn from(size: FontSize) -> Self {
		size.as_str().to_string()
	}
}

/// Cosmetic hints. None of these affect graph behaviour.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeStyle {
	pub shape: Shape,
	pub font_size: FontSize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub background: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub border: Option<String>,
}

/// A labelled point in the mind map. Coordinates are world-space and center-anchored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: String,
	pub parent_id: Option<String>,
	pub label: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub x: f64,
	pub y: f64,
	#[serde(default)]
	pub style: NodeStyle,
}

impl Node {
	pub fn new(id: impl Into<String>, parent_id: Option<&str>, label: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			parent_id: parent_id.map(str::to_string),
			label: label.into(),
			description: None,
			x: 0.0,
			y: 0.0,
			style: NodeStyle::default(),
		}
	}

	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.x = x;
		self.y = y;
		self
	}

	pub fn is_root(&self) -> bool {
		self.parent_id.is_none()
	}
}

/// Non-hierarchical association between two nodes. Endpoint order carries no meaning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryLink {
	pub source_id: String,
	pub target_id: String,
}

impl SecondaryLink {
	pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
		Self {
			source_id: source_id.into(),
			target_id: target_id.into(),
		}
	}

	/// True when this link joins `a` and `b`, in either order.
	pub fn connects(&self, a: &str, b: &str) -> bool {
		(self.source_id == a && self.target_id == b) || (self.source_id == b && self.target_id == a)
	}

	/// The endpoint opposite `id`, if `id` is one of the endpoints.
	pub fn other(&self, id: &str) -> Option<&str> {
		if self.source_id == id {
			Some(&self.target_id)
		} else if self.target_id == id {
			Some(&self.source_id)
		} else {
			None
		}
	}
}
