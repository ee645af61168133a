//! Mind map generation through a chat-completions service.
//!
//! [`generate`] is the only suspension point in the editor. Everything it can
//! fail with is a [`GenerateError`]; nothing here panics on bad service output.

use std::collections::HashSet;

use log::{info, warn};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use crate::config::GenerationConfig;
use crate::document;
use crate::error::GenerateError;
use crate::graph::Node;

const SYSTEM_PROMPT: &str = "You turn content into a mind map. Reply with JSON only: \
	{\"nodes\": [{\"id\": string, \"parentId\": string | null, \"label\": string, \
	\"description\": string}]}. Exactly one node has parentId null. Labels are at \
	most five words.";

/// One entry of the flat node list returned by the model.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedNode {
	pub id: String,
	#[serde(default)]
	pub parent_id: Option<String>,
	pub label: String,
	#[serde(default)]
	pub description: Option<String>,
}

impl From<GeneratedNode> for Node {
	fn from(generated: GeneratedNode) -> Self {
		Node {
			description: generated.description.filter(|d| !d.trim().is_empty()),
			..Node::new(generated.id, generated.parent_id.as_deref(), generated.label)
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
	/// Summarize the page behind an `http(s)` URL.
	Url,
	/// Extract the structure of the given text.
	Text,
}

impl InputMode {
	pub fn detect(input: &str) -> Self {
		match Url::parse(input.trim()) {
			Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => InputMode::Url,
			_ => InputMode::Text,
		}
	}
}

pub fn prompt(input: &str) -> String {
	let input = input.trim();
	match InputMode::detect(input) {
		InputMode::Url => format!(
			"Summarize the web page at {input} as a mind map. The root is the page's main topic."
		),
		InputMode::Text => {
			format!("Extract the structure of the following text as a mind map.\n\n{input}")
		}
	}
}

/// Request body for the chat-completions endpoint.
pub fn request_body(config: &GenerationConfig, input: &str) -> Value {
	json!({
		"model": config.model,
		"response_format": { "type": "json_object" },
		"messages": [
			{ "role": "system", "content": SYSTEM_PROMPT },
			{ "role": "user", "content": prompt(input) },
		],
	})
}

#[derive(Deserialize)]
struct ChatResponse {
	#[serde(default)]
	choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
	message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
	#[serde(default)]
	content: Option<String>,
}

/// Pulls the model's text out of a chat-completions response body.
pub fn response_content(body: &str) -> Result<String, GenerateError> {
	let response: ChatResponse =
		serde_json::from_str(body).map_err(|_| GenerateError::MissingResponse)?;
	response
		.choices
		.into_iter()
		.next()
		.and_then(|choice| choice.message.content)
		.filter(|content| !content.trim().is_empty())
		.ok_or(GenerateError::MissingResponse)
}

/// Parses model output into a node list with exactly one root.
///
/// Accepts `{"nodes": [...]}` or a bare array, optionally wrapped in a code
/// fence or surrounded by prose.
pub fn parse_node_list(text: &str) -> Result<Vec<GeneratedNode>, GenerateError> {
	let start = text
		.find(['{', '['])
		.ok_or_else(|| GenerateError::MalformedJson("no JSON found".into()))?;
	let end = text
		.rfind(['}', ']'])
		.filter(|&end| end > start)
		.ok_or_else(|| GenerateError::MalformedJson("unterminated JSON".into()))?;

	let value: Value = serde_json::from_str(&text[start..=end])
		.map_err(|err| GenerateError::MalformedJson(err.to_string()))?;
	let list = match value {
		Value::Array(_) => value,
		Value::Object(mut object) => object
			.remove("nodes")
			.ok_or_else(|| GenerateError::MalformedJson("missing `nodes`".into()))?,
		_ => return Err(GenerateError::MalformedJson("expected a node list".into())),
	};
	let mut nodes: Vec<GeneratedNode> = serde_json::from_value(list)
		.map_err(|err| GenerateError::MalformedJson(err.to_string()))?;

	if nodes.is_empty() {
		return Err(GenerateError::EmptyNodeList);
	}
	for node in &mut nodes {
		if node.parent_id.as_deref().is_some_and(|p| p.is_empty() || p == "null") {
			node.parent_id = None;
		}
	}
	let roots = nodes.iter().filter(|node| node.parent_id.is_none()).count();
	if roots != 1 {
		return Err(GenerateError::RootCount(roots));
	}
	Ok(nodes)
}

/// Turns a parsed node list into editor nodes forming a single tree.
///
/// Unlike file imports, a parent id naming no node is an error here rather
/// than a new root.
pub fn into_tree(generated: Vec<GeneratedNode>) -> Result<Vec<Node>, GenerateError> {
	let orphan = {
		let ids: HashSet<&str> = generated.iter().map(|node| node.id.as_str()).collect();
		generated.iter().find_map(|node| {
			let parent = node.parent_id.as_deref()?;
			(!ids.contains(parent)).then(|| {
				GenerateError::InvalidTree(format!(
					"node `{}` names unknown parent `{}`",
					node.id, parent
				))
			})
		})
	};
	if let Some(err) = orphan {
		return Err(err);
	}

	let nodes = document::validate(generated.into_iter().map(Node::from).collect())
		.map_err(|err| GenerateError::InvalidTree(err.to_string()))?;
	let roots = nodes.iter().filter(|node| node.is_root()).count();
	if roots != 1 {
		return Err(GenerateError::RootCount(roots));
	}
	Ok(nodes)
}

/// Sends `input` to the service and returns the generated node list.
pub async fn generate(
	config: &GenerationConfig,
	input: &str,
) -> Result<Vec<GeneratedNode>, GenerateError> {
	if input.trim().is_empty() {
		return Err(GenerateError::EmptyInput);
	}
	if config.api_key.trim().is_empty() {
		return Err(GenerateError::MissingCredentials);
	}
	info!("generating mind map ({:?} input)", InputMode::detect(input));

	let (status, body) = post_json(config, &request_body(config, input).to_string())
		.await
		.map_err(|err| {
			warn!("generation request failed: {:?}", err);
			GenerateError::Network(js_message(&err))
		})?;
	if !(200..300).contains(&status) {
		return Err(GenerateError::Http(status));
	}
	let nodes = parse_node_list(&response_content(&body)?)?;
	info!("generated {} nodes", nodes.len());
	Ok(nodes)
}

async fn post_json(config: &GenerationConfig, body: &str) -> Result<(u16, String), JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let init = RequestInit::new();
	init.set_method("POST");
	init.set_body(&JsValue::from_str(body));

	let request = Request::new_with_str_and_init(&config.endpoint, &init)?;
	request.headers().set("Content-Type", "application/json")?;
	request
		.headers()
		.set("Authorization", &format!("Bearer {}", config.api_key.trim()))?;

	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await?
		.dyn_into()?;
	let text = JsFuture::from(response.text()?).await?;
	Ok((response.status(), text.as_string().unwrap_or_default()))
}

fn js_message(value: &JsValue) -> String {
	value
		.as_string()
		.or_else(|| {
			value
				.dyn_ref::<js_sys::Error>()
				.map(|err| String::from(err.message()))
		})
		.unwrap_or_else(|| "unknown error".into())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn urls_and_text_are_told_apart() {
		assert_eq!(InputMode::detect("https://example.com/post"), InputMode::Url);
		assert_eq!(InputMode::detect("  http://example.com  "), InputMode::Url);
		assert_eq!(InputMode::detect("ftp://example.com"), InputMode::Text);
		assert_eq!(InputMode::detect("mailto:me@example.com"), InputMode::Text);
		assert_eq!(InputMode::detect("Rust is a systems language"), InputMode::Text);
	}

	#[test]
	fn prompt_follows_input_mode() {
		assert!(prompt("https://example.com").starts_with("Summarize the web page"));
		assert!(prompt("Some notes").ends_with("Some notes"));
	}

	#[test]
	fn fenced_object_output_is_parsed() {
		let output = "Here you go:\n```json\n{\"nodes\": [\
			{\"id\": \"1\", \"parentId\": null, \"label\": \"Rust\"},\
			{\"id\": \"2\", \"parentId\": \"1\", \"label\": \"Ownership\", \"description\": \"moves\"}\
		]}\n```";
		let nodes = parse_node_list(output).unwrap();
		assert_eq!(nodes.len(), 2);
		assert_eq!(nodes[1].parent_id.as_deref(), Some("1"));
		assert_eq!(nodes[1].description.as_deref(), Some("moves"));
	}

	#[test]
	fn bare_arrays_and_string_nulls_are_accepted() {
		let output = r#"[{"id":"r","parentId":"","label":"Root"},{"id":"c","parentId":"r","label":"C"}]"#;
		let nodes = parse_node_list(output).unwrap();
		assert_eq!(nodes[0].parent_id, None);
	}

	#[test]
	fn each_failure_has_its_own_error() {
		assert!(matches!(
			parse_node_list("no json here"),
			Err(GenerateError::MalformedJson(_))
		));
		assert!(matches!(
			parse_node_list("{\"nodes\": [oops]}"),
			Err(GenerateError::MalformedJson(_))
		));
		assert_eq!(parse_node_list(r#"{"nodes": []}"#), Err(GenerateError::EmptyNodeList));
		assert_eq!(
			parse_node_list(r#"[{"id":"a","label":"A"},{"id":"b","label":"B"}]"#),
			Err(GenerateError::RootCount(2))
		);
	}

	fn generated(id: &str, parent: Option<&str>) -> GeneratedNode {
		GeneratedNode {
			id: id.into(),
			parent_id: parent.map(Into::into),
			label: id.to_uppercase(),
			description: None,
		}
	}

	#[test]
	fn generated_tree_keeps_its_single_root() {
		let nodes = into_tree(vec![generated("r", None), generated("c", Some("r"))]).unwrap();
		assert_eq!(nodes.iter().filter(|n| n.is_root()).count(), 1);
		assert_eq!(nodes[1].parent_id.as_deref(), Some("r"));
	}

	#[test]
	fn dangling_generated_parent_is_rejected() {
		let result = into_tree(vec![generated("r", None), generated("c", Some("ghost"))]);
		assert!(matches!(result, Err(GenerateError::InvalidTree(msg)) if msg.contains("ghost")));
	}

	#[test]
	fn broken_generated_tree_reports_a_generation_error() {
		let duplicate = into_tree(vec![generated("r", None), generated("r", Some("r"))]);
		assert!(matches!(duplicate, Err(GenerateError::InvalidTree(_))));

		let cycle = into_tree(vec![
			generated("r", None),
			generated("a", Some("b")),
			generated("b", Some("a")),
		]);
		assert!(matches!(cycle, Err(GenerateError::InvalidTree(_))));
		assert_eq!(
			into_tree(vec![generated("a", None), generated("b", None)]),
			Err(GenerateError::RootCount(2))
		);
	}

	#[test]
	fn response_content_requires_a_message() {
		let body = r#"{"choices":[{"message":{"content":"{\"nodes\":[]}"}}]}"#;
		assert_eq!(response_content(body).unwrap(), r#"{"nodes":[]}"#);
		assert_eq!(response_content(r#"{"choices":[]}"#), Err(GenerateError::MissingResponse));
		assert_eq!(response_content("<html>"), Err(GenerateError::MissingResponse));
	}

	#[test]
	fn request_body_carries_model_and_prompt() {
		let config = GenerationConfig::default();
		let body = request_body(&config, "notes");
		assert_eq!(body["model"], config.model.as_str());
		assert_eq!(body["messages"][1]["content"], prompt("notes"));
	}
}
