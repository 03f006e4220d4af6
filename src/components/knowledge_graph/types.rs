//! Records handed to the graph view by the data layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::GraphError;

/// A user-authored idea or interest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeNode {
	/// Unique identifier. Connections reference nodes by this id.
	pub id: String,
	/// Display title, drawn as the node label.
	pub title: String,
	#[serde(default)]
	pub description: String,
	/// Raw category as stored by the backend. Unrecognized values are kept as-is
	/// and styled with the neutral fallback.
	#[serde(default = "default_category")]
	pub category: String,
	#[serde(default)]
	pub created_at: Option<DateTime<Utc>>,
}

/// A directed, typed and weighted relationship between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
	pub id: String,
	pub source_node_id: String,
	pub target_node_id: String,
	/// Raw relationship type. `None` reads as "related".
	#[serde(default)]
	pub relationship_type: Option<String>,
	#[serde(default)]
	pub description: String,
	/// Strength from 1 to 5. `None` reads as 1.
	#[serde(default)]
	pub strength: Option<u8>,
	#[serde(default)]
	pub created_at: Option<DateTime<Utc>>,
}

fn default_category() -> String {
	Category::Other.as_str().to_string()
}

/// The fixed set of categories a node can be filed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
	Art,
	Science,
	History,
	Music,
	Literature,
	Philosophy,
	Technology,
	Hobby,
	Other,
}

impl Category {
	pub const ALL: [Category; 9] = [
		Category::Art,
		Category::Science,
		Category::History,
		Category::Music,
		Category::Literature,
		Category::Philosophy,
		Category::Technology,
		Category::Hobby,
		Category::Other,
	];

	/// Case-insensitive lookup; `None` for anything outside the known set.
	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();
		Self::ALL
			.into_iter()
			.find(|c| c.as_str().eq_ignore_ascii_case(raw))
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Category::Art => "art",
			Category::Science => "science",
			Category::History => "history",
			Category::Music => "music",
			Category::Literature => "literature",
			Category::Philosophy => "philosophy",
			Category::Technology => "technology",
			Category::Hobby => "hobby",
			Category::Other => "other",
		}
	}

	pub fn display_name(self) -> &'static str {
		match self {
			Category::Art => "Art",
			Category::Science => "Science",
			Category::History => "History",
			Category::Music => "Music",
			Category::Literature => "Literature",
			Category::Philosophy => "Philosophy",
			Category::Technology => "Technology",
			Category::Hobby => "Hobby",
			Category::Other => "Other",
		}
	}
}

/// Relationship kinds a connection can carry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RelationshipType {
	#[default]
	Related,
	Influences,
	Inspires,
	Contrasts,
	BuildsOn,
	Complements,
}

impl RelationshipType {
	pub const ALL: [RelationshipType; 6] = [
		RelationshipType::Related,
		RelationshipType::Influences,
		RelationshipType::Inspires,
		RelationshipType::Contrasts,
		RelationshipType::BuildsOn,
		RelationshipType::Complements,
	];

	pub fn parse(raw: &str) -> Option<Self> {
		let raw = raw.trim();
		Self::ALL
			.into_iter()
			.find(|r| r.as_str().eq_ignore_ascii_case(raw))
	}

	pub fn as_str(self) -> &'static str {
		match self {
			RelationshipType::Related => "related",
			RelationshipType::Influences => "influences",
			RelationshipType::Inspires => "inspires",
			RelationshipType::Contrasts => "contrasts",
			RelationshipType::BuildsOn => "builds_on",
			RelationshipType::Complements => "complements",
		}
	}
}

/// Node and connection arrays as handed over by the data layer.
///
/// Both halves are shared slices so that the projector can memoize on identity.
#[derive(Clone, Debug, Default)]
pub struct GraphInput {
	pub nodes: Arc<[KnowledgeNode]>,
	pub connections: Arc<[Connection]>,
}

impl GraphInput {
	pub fn new(nodes: Vec<KnowledgeNode>, connections: Vec<Connection>) -> Self {
		Self {
			nodes: nodes.into(),
			connections: connections.into(),
		}
	}

	/// Parse `{ "nodes": [...], "connections": [...] }` from untyped JSON.
	///
	/// Either field missing or not an array is reported as invalid data rather
	/// than silently treated as empty.
	pub fn from_json_str(json: &str) -> Result<Self, GraphError> {
		let value: Value = serde_json::from_str(json)?;
		Self::from_json_value(value)
	}

	pub fn from_json_value(mut value: Value) -> Result<Self, GraphError> {
		let nodes = take_array(&mut value, "nodes")?;
		let connections = take_array(&mut value, "connections")?;
		let nodes: Vec<KnowledgeNode> = serde_json::from_value(nodes)?;
		let connections: Vec<Connection> = serde_json::from_value(connections)?;
		Ok(Self::new(nodes, connections))
	}
}

fn take_array(value: &mut Value, field: &str) -> Result<Value, GraphError> {
	match value.get_mut(field).map(Value::take) {
		Some(array @ Value::Array(_)) => Ok(array),
		Some(_) => Err(GraphError::InvalidData(format!("`{field}` must be an array"))),
		None => Err(GraphError::InvalidData(format!("`{field}` is missing"))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn category_parse_is_case_insensitive() {
		assert_eq!(Category::parse("Philosophy"), Some(Category::Philosophy));
		assert_eq!(Category::parse(" hobby "), Some(Category::Hobby));
		assert_eq!(Category::parse("underwater_basket_weaving"), None);
	}

	#[test]
	fn relationship_parse_handles_underscored_names() {
		assert_eq!(
			RelationshipType::parse("builds_on"),
			Some(RelationshipType::BuildsOn)
		);
		assert_eq!(RelationshipType::parse("teleports"), None);
	}

	#[test]
	fn json_input_decodes_optional_fields() {
		let input = GraphInput::from_json_str(
			r#"{
				"nodes": [
					{"id": "n1", "title": "Stoicism", "category": "philosophy"},
					{"id": "n2", "title": "CBT", "created_at": "2024-03-01T12:00:00Z"}
				],
				"connections": [
					{"id": "c1", "source_node_id": "n1", "target_node_id": "n2", "strength": 4}
				]
			}"#,
		)
		.unwrap();

		assert_eq!(input.nodes.len(), 2);
		assert_eq!(input.nodes[1].category, "other");
		assert!(input.nodes[1].created_at.is_some());
		assert_eq!(input.connections[0].strength, Some(4));
		assert_eq!(input.connections[0].relationship_type, None);
	}

	#[test]
	fn non_array_fields_are_invalid_data() {
		let err = GraphInput::from_json_str(r#"{"nodes": {}, "connections": []}"#).unwrap_err();
		assert_eq!(
			err,
			GraphError::InvalidData("`nodes` must be an array".into())
		);

		let err = GraphInput::from_json_str(r#"{"nodes": []}"#).unwrap_err();
		assert_eq!(
			err,
			GraphError::InvalidData("`connections` is missing".into())
		);
	}

	#[test]
	fn malformed_records_are_invalid_data() {
		let err =
			GraphInput::from_json_str(r#"{"nodes": [{"title": "no id"}], "connections": []}"#)
				.unwrap_err();
		assert!(matches!(err, GraphError::InvalidData(_)));
	}
}
