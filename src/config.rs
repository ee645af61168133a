//! Editor settings, read from `localStorage` at startup.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::graph::Direction;

/// `localStorage` key holding the JSON settings object.
pub const STORAGE_KEY: &str = "mindmap.config";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
	/// Growth axis for new maps and auto layout.
	pub direction: Direction,
	/// How long info and warning notices stay on screen.
	pub notice_ms: u32,
	pub generation: GenerationConfig,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			direction: Direction::Horizontal,
			notice_ms: 3500,
			generation: GenerationConfig::default(),
		}
	}
}

/// Where and how to reach the chat-completions service used for generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationConfig {
	pub endpoint: String,
	pub model: String,
	pub api_key: String,
}

impl Default for GenerationConfig {
	fn default() -> Self {
		Self {
			endpoint: "https://api.openai.com/v1/chat/completions".into(),
			model: "gpt-4o-mini".into(),
			api_key: String::new(),
		}
	}
}

impl EditorConfig {
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	/// Reads [`STORAGE_KEY`]. Missing settings give the defaults; malformed ones
	/// are logged and also give the defaults.
	pub fn load() -> Self {
		let Some(text) = web_sys::window()
			.and_then(|window| window.local_storage().ok().flatten())
			.and_then(|storage| storage.get_item(STORAGE_KEY).ok().flatten())
		else {
			return Self::default();
		};
		Self::from_json(&text).unwrap_or_else(|err| {
			warn!("ignoring malformed {}: {}", STORAGE_KEY, err);
			Self::default()
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_settings_keep_other_defaults() {
		let config =
			EditorConfig::from_json(r#"{"direction":"vertical","generation":{"apiKey":"k"}}"#)
				.unwrap();
		assert_eq!(config.direction, Direction::Vertical);
		assert_eq!(config.notice_ms, 3500);
		assert_eq!(config.generation.api_key, "k");
		assert_eq!(config.generation.model, GenerationConfig::default().model);
	}

	#[test]
	fn malformed_settings_are_an_error() {
		assert!(EditorConfig::from_json(r#"{"noticeMs": "soon"}"#).is_err());
	}
}
