//! Error types for each boundary of the editor.

use thiserror::Error;

/// Rejected graph mutations. The graph is left untouched whenever one of these is returned.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GraphError {
	#[error("no node with id `{0}`")]
	UnknownNode(String),
	#[error("cannot move `{node}` under `{parent}`: it would become its own ancestor")]
	AncestorCycle { node: String, parent: String },
}

/// Failures while reading a saved mind map. Nothing is loaded when one occurs.
#[derive(Debug, Error)]
pub enum DocumentError {
	#[error("invalid mind map file: {0}")]
	Json(#[from] serde_json::Error),
	#[error("the mind map file contains no nodes")]
	Empty,
	#[error("the mind map file contains node `{0}` more than once")]
	DuplicateId(String),
	#[error("the mind map file has a parent cycle through node `{0}`")]
	Cycle(String),
}

/// Failures of the generation service, each mapped to its own user-facing message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
	#[error("Enter some text or a URL to generate a mind map from.")]
	EmptyInput,
	#[error("No API key configured for the generation service.")]
	MissingCredentials,
	#[error("Could not reach the generation service: {0}")]
	Network(String),
	#[error("The generation service answered with HTTP {0}.")]
	Http(u16),
	#[error("The generation service returned no usable response.")]
	MissingResponse,
	#[error("The model output was not valid JSON: {0}")]
	MalformedJson(String),
	#[error("The model returned an empty node list.")]
	EmptyNodeList,
	#[error("The model returned {0} root nodes; exactly one is required.")]
	RootCount(usize),
	#[error("The model output is not a usable tree: {0}")]
	InvalidTree(String),
}
