//! Failures the graph view can hit. None of them escape the view.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum GraphError {
	/// Host-supplied graph data had the wrong shape.
	#[error("invalid graph data: {0}")]
	InvalidData(String),
	/// The canvas element was not mounted when the session started.
	#[error("canvas element is not available")]
	MissingCanvas,
	/// The browser refused to hand out a 2d context.
	#[error("2d rendering context is not available")]
	MissingContext,
	/// A call into the browser canvas/DOM API raised.
	#[error("renderer fault: {0}")]
	Renderer(String),
}

impl From<JsValue> for GraphError {
	fn from(value: JsValue) -> Self {
		let message = value
			.as_string()
			.unwrap_or_else(|| format!("{value:?}"));
		GraphError::Renderer(message)
	}
}

impl From<serde_json::Error> for GraphError {
	fn from(err: serde_json::Error) -> Self {
		GraphError::InvalidData(err.to_string())
	}
}
