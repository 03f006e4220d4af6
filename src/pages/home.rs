use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use leptos::prelude::*;
use log::{info, warn};

use crate::components::knowledge_graph::{
	Connection, GraphError, GraphInput, GraphPlaceholder, GraphViewConfig, KnowledgeGraphView,
	KnowledgeNode, script_text,
};

const DATA_ELEMENT: &str = "graph-data";
const CONFIG_ELEMENT: &str = "graph-config";

static LOCAL_IDS: AtomicU32 = AtomicU32::new(0);

fn sample_node(id: &str, title: &str, category: &str, description: &str) -> KnowledgeNode {
	KnowledgeNode {
		id: id.to_string(),
		title: title.to_string(),
		description: description.to_string(),
		category: category.to_string(),
		created_at: None,
	}
}

fn sample_connection(
	id: &str,
	source: &str,
	target: &str,
	relationship: &str,
	strength: u8,
) -> Connection {
	Connection {
		id: id.to_string(),
		source_node_id: source.to_string(),
		target_node_id: target.to_string(),
		relationship_type: Some(relationship.to_string()),
		description: String::new(),
		strength: Some(strength),
		created_at: None,
	}
}

/// A small built-in graph for when the page carries no data.
fn sample_data() -> GraphInput {
	GraphInput::new(
		vec![
			sample_node("n1", "Impressionism", "art", "Light and colour over line."),
			sample_node("n2", "Optics", "science", "How light bends and scatters."),
			sample_node("n3", "Debussy", "music", "Harmony as colour."),
			sample_node("n4", "Renaissance", "history", ""),
			sample_node("n5", "Stoicism", "philosophy", "Virtue is the only good."),
			sample_node("n6", "Meditations", "literature", ""),
			sample_node("n7", "Rust", "technology", "Ownership instead of a collector."),
			sample_node("n8", "Woodworking", "hobby", ""),
			sample_node("n9", "Linear perspective", "art", ""),
		],
		vec![
			sample_connection("c1", "n2", "n1", "influences", 4),
			sample_connection("c2", "n1", "n3", "inspires", 3),
			sample_connection("c3", "n4", "n9", "builds_on", 5),
			sample_connection("c4", "n9", "n1", "contrasts", 2),
			sample_connection("c5", "n5", "n6", "related", 4),
			sample_connection("c6", "n7", "n8", "complements", 1),
			sample_connection("c7", "n2", "n9", "builds_on", 3),
		],
	)
}

/// Records from the page if present, otherwise the sample graph.
fn load_input() -> Result<GraphInput, GraphError> {
	match script_text(DATA_ELEMENT) {
		Some(text) => GraphInput::from_json_str(&text),
		None => Ok(sample_data()),
	}
}

fn local_connection_id() -> String {
	let n = LOCAL_IDS.fetch_add(1, Ordering::Relaxed);
	format!("local-{}-{n}", Utc::now().timestamp_millis())
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = GraphViewConfig::from_dom(CONFIG_ELEMENT);
	let input = match load_input() {
		Ok(input) => input,
		Err(e) => {
			warn!("home: could not load #{DATA_ELEMENT}: {e}");
			return view! {
				<div class="fullscreen-graph">
					<GraphPlaceholder
						title="This graph data could not be read"
						detail=e.to_string()
						error=true
					/>
				</div>
			}
			.into_any();
		}
	};

	let nodes = RwSignal::new(input.nodes);
	let connections = RwSignal::new(input.connections);

	let on_node_click = Callback::new(move |id: String| {
		let title = nodes.with_untracked(|n| {
			n.iter().find(|n| n.id == id).map(|n| n.title.clone())
		});
		info!("home: open node {id} ({})", title.unwrap_or_default());
	});
	let on_create_connection = Callback::new(move |(source, target): (String, String)| {
		connections.update(|c| {
			let mut next = c.to_vec();
			next.push(Connection {
				id: local_connection_id(),
				source_node_id: source,
				target_node_id: target,
				relationship_type: None,
				description: String::new(),
				strength: None,
				created_at: Some(Utc::now()),
			});
			*c = Arc::from(next);
		});
	});
	let on_delete_connection = Callback::new(move |id: String| {
		connections.update(|c| {
			*c = c.iter().filter(|conn| conn.id != id).cloned().collect();
		});
	});

	view! {
		<div class="fullscreen-graph">
			<KnowledgeGraphView
				nodes=nodes
				connections=connections
				on_node_click=on_node_click
				on_create_connection=on_create_connection
				on_delete_connection=on_delete_connection
				config=config
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Cosmic Nexus"</h1>
				<p class="subtitle">
					"Hover to inspect. Press C to connect two nodes. Click a link to delete it."
				</p>
			</div>
		</div>
	}
	.into_any()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::project;

	#[test]
	fn sample_graph_resolves_every_link() {
		let input = sample_data();
		let graph = project(&input.nodes, &input.connections);
		assert_eq!(graph.nodes.len(), 9);
		assert_eq!(graph.links.len(), input.connections.len());
	}

	#[test]
	fn local_ids_are_unique() {
		assert_ne!(local_connection_id(), local_connection_id());
	}
}
