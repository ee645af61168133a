//! Saved mind map files: `{version, direction?, nodes, secondaryLinks?}`.

use std::collections::HashSet;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::graph::{Direction, Graph, Node, NodeStyle, SecondaryLink, TreeIndex, layout};

/// Version written by [`export`]. Version 1 files may lack node positions.
pub const CURRENT_VERSION: u32 = 2;

fn legacy_version() -> u32 {
	1
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentIn {
	#[serde(default = "legacy_version")]
	version: u32,
	#[serde(default)]
	direction: Direction,
	nodes: Vec<NodeIn>,
	#[serde(default)]
	secondary_links: Option<Vec<SecondaryLink>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeIn {
	id: String,
	#[serde(default)]
	parent_id: Option<String>,
	label: String,
	#[serde(default)]
	description: Option<String>,
	x: Option<f64>,
	y: Option<f64>,
	#[serde(default)]
	style: NodeStyle,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentOut<'a> {
	version: u32,
	direction: Direction,
	nodes: &'a [Node],
	secondary_links: &'a [SecondaryLink],
}

/// A loaded file: the graph and the direction it was laid out in.
#[derive(Debug)]
pub struct Imported {
	pub graph: Graph,
	pub direction: Direction,
	/// True when positions were missing and the layout assigned them.
	pub laid_out: bool,
}

/// Parses a saved file. Nothing is returned unless the whole file is valid.
pub fn import(text: &str) -> Result<Imported, DocumentError> {
	let document: DocumentIn = serde_json::from_str(text)?;
	let direction = document.direction;
	let legacy = document.nodes.iter().any(|node| node.x.is_none() || node.y.is_none());

	let nodes = document
		.nodes
		.into_iter()
		.map(|node| Node {
			id: node.id,
			parent_id: node.parent_id.filter(|parent| !parent.is_empty()),
			label: node.label,
			description: node.description,
			x: node.x.unwrap_or_default(),
			y: node.y.unwrap_or_default(),
			style: node.style,
		})
		.collect();
	let nodes = validate(nodes)?;
	let nodes = if legacy {
		info!("version {} file without positions; running layout", document.version);
		layout(&nodes, direction)
	} else {
		nodes
	};

	let links = document.secondary_links.unwrap_or_default();
	let link_count = links.len();
	let graph = Graph::from_parts(nodes, links);
	if graph.links().len() != link_count {
		warn!(
			"dropped {} secondary links with missing or repeated endpoints",
			link_count - graph.links().len()
		);
	}

	Ok(Imported {
		graph,
		direction,
		laid_out: legacy,
	})
}

/// Serializes the graph at [`CURRENT_VERSION`].
pub fn export(graph: &Graph, direction: Direction) -> Result<String, DocumentError> {
	let document = DocumentOut {
		version: CURRENT_VERSION,
		direction,
		nodes: graph.nodes(),
		secondary_links: graph.links(),
	};
	Ok(serde_json::to_string_pretty(&document)?)
}

/// Rejects empty lists, repeated ids and parent cycles. Parents that name an
/// unknown node are cleared so the node becomes a root.
pub fn validate(mut nodes: Vec<Node>) -> Result<Vec<Node>, DocumentError> {
	if nodes.is_empty() {
		return Err(DocumentError::Empty);
	}
	let mut seen = HashSet::with_capacity(nodes.len());
	for node in &nodes {
		if !seen.insert(node.id.as_str()) {
			return Err(DocumentError::DuplicateId(node.id.clone()));
		}
	}

	let known: HashSet<String> = nodes.iter().map(|node| node.id.clone()).collect();
	for node in &mut nodes {
		if let Some(parent) = &node.parent_id {
			if !known.contains(parent) {
				warn!("node {} names unknown parent {}; treating it as a root", node.id, parent);
				node.parent_id = None;
			}
		}
	}

	let index = TreeIndex::build(&nodes);
	if let Some(node) = nodes.iter().find(|node| index.is_ancestor(&nodes, &node.id, &node.id)) {
		return Err(DocumentError::Cycle(node.id.clone()));
	}
	Ok(nodes)
}
