//! Projection of knowledge records into the vertex/edge shape the canvas draws.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, warn};

use super::types::{Connection, KnowledgeNode};

/// Baseline visual size of every node before interaction styling.
pub const BASE_NODE_VAL: f64 = 3.0;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderNode {
	pub id: String,
	pub name: String,
	pub category: String,
	pub description: String,
	/// Baseline size. Hover styling derives from it and never writes it.
	pub val: f64,
	pub connection_count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderLink {
	/// Id of the connection this link was projected from.
	pub id: String,
	pub source: String,
	pub target: String,
	pub value: u8,
	pub relationship_type: Option<String>,
	pub description: String,
}

/// Vertices and edges ready for drawing, plus lookup tables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderGraph {
	pub nodes: Vec<RenderNode>,
	pub links: Vec<RenderLink>,
	node_index: HashMap<String, usize>,
	neighbors: HashMap<String, HashSet<String>>,
}

impl RenderGraph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: &str) -> Option<&RenderNode> {
		self.node_index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn link(&self, id: &str) -> Option<&RenderLink> {
		self.links.iter().find(|l| l.id == id)
	}

	/// Nodes sharing at least one rendered link with `id`.
	pub fn neighbors(&self, id: &str) -> Option<&HashSet<String>> {
		self.neighbors.get(id)
	}

	#[cfg(test)]
	pub fn are_adjacent(&self, a: &str, b: &str) -> bool {
		self.neighbors.get(a).is_some_and(|n| n.contains(b))
	}
}

/// Build the render graph for one `(nodes, connections)` pair.
///
/// Links with an endpoint missing from `nodes` are dropped.
pub fn project(nodes: &[KnowledgeNode], connections: &[Connection]) -> RenderGraph {
	let mut graph = RenderGraph::default();

	for node in nodes {
		if graph.node_index.contains_key(&node.id) {
			warn!("knowledge-graph: duplicate node id {:?} skipped", node.id);
			continue;
		}
		graph.node_index.insert(node.id.clone(), graph.nodes.len());
		graph.nodes.push(RenderNode {
			id: node.id.clone(),
			name: node.title.clone(),
			category: node.category.clone(),
			description: node.description.clone(),
			val: BASE_NODE_VAL,
			connection_count: 0,
		});
	}

	let (mut dropped, mut self_loops) = (0usize, 0usize);
	for conn in connections {
		let (Some(&src), Some(&tgt)) = (
			graph.node_index.get(&conn.source_node_id),
			graph.node_index.get(&conn.target_node_id),
		) else {
			dropped += 1;
			continue;
		};
		if src == tgt {
			self_loops += 1;
			continue;
		}

		graph.links.push(RenderLink {
			id: conn.id.clone(),
			source: conn.source_node_id.clone(),
			target: conn.target_node_id.clone(),
			value: conn.strength.unwrap_or(1).clamp(1, 5),
			relationship_type: conn.relationship_type.clone(),
			description: conn.description.clone(),
		});

		graph.nodes[src].connection_count += 1;
		graph.nodes[tgt].connection_count += 1;
		graph
			.neighbors
			.entry(conn.source_node_id.clone())
			.or_default()
			.insert(conn.target_node_id.clone());
		graph
			.neighbors
			.entry(conn.target_node_id.clone())
			.or_default()
			.insert(conn.source_node_id.clone());
	}

	if dropped > 0 {
		warn!("knowledge-graph: {dropped} connection(s) reference unknown nodes, skipped");
	}
	if self_loops > 0 {
		warn!("knowledge-graph: {self_loops} connection(s) link a node to itself, skipped");
	}
	debug!(
		"knowledge-graph: projected {} nodes, {} links",
		graph.nodes.len(),
		graph.links.len()
	);
	graph
}

/// A render graph tied to the exact input slices it was built from.
///
/// Equality is identity of the inputs, which is what a reactive memo needs to
/// decide whether downstream consumers must rerun.
#[derive(Clone, Debug)]
pub struct Projection {
	nodes: Arc<[KnowledgeNode]>,
	connections: Arc<[Connection]>,
	graph: Arc<RenderGraph>,
}

impl Projection {
	pub fn new(nodes: Arc<[KnowledgeNode]>, connections: Arc<[Connection]>) -> Self {
		let graph = Arc::new(project(&nodes, &connections));
		Self {
			nodes,
			connections,
			graph,
		}
	}

	/// Hand back `prev` untouched when both inputs are the same allocations,
	/// otherwise project afresh.
	pub fn reuse_or_project(
		prev: Option<&Projection>,
		nodes: Arc<[KnowledgeNode]>,
		connections: Arc<[Connection]>,
	) -> Self {
		match prev {
			Some(p) if p.is_built_from(&nodes, &connections) => p.clone(),
			_ => Self::new(nodes, connections),
		}
	}

	pub fn is_built_from(&self, nodes: &Arc<[KnowledgeNode]>, connections: &Arc<[Connection]>) -> bool {
		Arc::ptr_eq(&self.nodes, nodes) && Arc::ptr_eq(&self.connections, connections)
	}

	pub fn graph(&self) -> &Arc<RenderGraph> {
		&self.graph
	}
}

impl PartialEq for Projection {
	fn eq(&self, other: &Self) -> bool {
		self.is_built_from(&other.nodes, &other.connections)
	}
}

/// Non-reactive memoizing projector.
#[derive(Debug, Default)]
pub struct GraphProjector {
	last: Option<Projection>,
}

impl GraphProjector {
	pub fn project(
		&mut self,
		nodes: &Arc<[KnowledgeNode]>,
		connections: &Arc<[Connection]>,
	) -> Arc<RenderGraph> {
		let next = Projection::reuse_or_project(self.last.as_ref(), nodes.clone(), connections.clone());
		let graph = next.graph.clone();
		self.last = Some(next);
		graph
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, title: &str, category: &str) -> KnowledgeNode {
		KnowledgeNode {
			id: id.into(),
			title: title.into(),
			description: String::new(),
			category: category.into(),
			created_at: None,
		}
	}

	fn conn(id: &str, source: &str, target: &str, strength: Option<u8>) -> Connection {
		Connection {
			id: id.into(),
			source_node_id: source.into(),
			target_node_id: target.into(),
			relationship_type: Some("influences".into()),
			description: String::new(),
			strength,
			created_at: None,
		}
	}

	fn scenario_nodes() -> Vec<KnowledgeNode> {
		vec![
			node("n1", "Stoicism", "philosophy"),
			node("n2", "CBT", "science"),
		]
	}

	#[test]
	fn projects_nodes_and_links() {
		let graph = project(&scenario_nodes(), &[conn("c1", "n1", "n2", Some(4))]);

		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.links.len(), 1);
		assert_eq!(graph.links[0].value, 4);
		assert_eq!(graph.links[0].id, "c1");
		assert_eq!(graph.nodes[0].name, "Stoicism");
		assert_eq!(graph.nodes[0].val, BASE_NODE_VAL);
		assert_eq!(graph.node("n2").unwrap().connection_count, 1);
		assert!(graph.are_adjacent("n2", "n1"));
	}

	#[test]
	fn dangling_target_is_dropped() {
		let graph = project(
			&scenario_nodes(),
			&[
				conn("c1", "n1", "n2", Some(4)),
				conn("c2", "n1", "missing", Some(2)),
			],
		);

		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.links.len(), 1);
		assert!(graph.link("c2").is_none());
		assert_eq!(graph.node("n1").unwrap().connection_count, 1);
	}

	#[test]
	fn every_link_resolves_to_a_projected_node() {
		let nodes = vec![node("a", "A", "art"), node("b", "B", "music"), node("c", "C", "?")];
		let connections = vec![
			conn("1", "a", "b", None),
			conn("2", "zz", "a", None),
			conn("3", "b", "c", Some(9)),
			conn("4", "c", "gone", Some(3)),
			conn("5", "c", "a", Some(0)),
			conn("6", "b", "b", Some(2)),
		];
		let graph = project(&nodes, &connections);

		for link in &graph.links {
			assert!(graph.node(&link.source).is_some());
			assert!(graph.node(&link.target).is_some());
			assert_ne!(link.source, link.target);
			assert!((1..=5).contains(&link.value));
		}
		assert_eq!(graph.links.len(), 3);
		assert_eq!(graph.node("b").unwrap().connection_count, 2);
		assert!(!graph.neighbors("b").unwrap().contains("b"));
	}

	#[test]
	fn missing_strength_defaults_to_one() {
		let graph = project(&scenario_nodes(), &[conn("c1", "n1", "n2", None)]);
		assert_eq!(graph.links[0].value, 1);
	}

	#[test]
	fn duplicate_node_ids_keep_first() {
		let nodes = vec![node("n1", "First", "art"), node("n1", "Second", "art")];
		let graph = project(&nodes, &[]);
		assert_eq!(graph.nodes.len(), 1);
		assert_eq!(graph.node("n1").unwrap().name, "First");
	}

	#[test]
	fn same_inputs_reuse_the_same_graph() {
		let nodes: Arc<[KnowledgeNode]> = scenario_nodes().into();
		let connections: Arc<[Connection]> = vec![conn("c1", "n1", "n2", Some(4))].into();
		let mut projector = GraphProjector::default();

		let first = projector.project(&nodes, &connections);
		let second = projector.project(&nodes, &connections);
		assert!(Arc::ptr_eq(&first, &second));
	}

	#[test]
	fn replaced_input_rebuilds_an_equal_graph() {
		let nodes: Arc<[KnowledgeNode]> = scenario_nodes().into();
		let connections: Arc<[Connection]> = vec![conn("c1", "n1", "n2", Some(4))].into();
		let mut projector = GraphProjector::default();

		let first = projector.project(&nodes, &connections);
		let copy: Arc<[Connection]> = connections.to_vec().into();
		let second = projector.project(&nodes, &copy);

		assert!(!Arc::ptr_eq(&first, &second));
		assert_eq!(*first, *second);
	}

	#[test]
	fn projection_equality_follows_input_identity() {
		let nodes: Arc<[KnowledgeNode]> = scenario_nodes().into();
		let connections: Arc<[Connection]> = Vec::<Connection>::new().into();

		let a = Projection::new(nodes.clone(), connections.clone());
		let b = Projection::reuse_or_project(Some(&a), nodes.clone(), connections.clone());
		assert_eq!(a, b);
		assert!(Arc::ptr_eq(a.graph(), b.graph()));

		let c = Projection::reuse_or_project(Some(&a), scenario_nodes().into(), connections);
		assert_ne!(a, c);
	}
}
