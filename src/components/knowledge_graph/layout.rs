//! Layout planning for the force and cluster modes.

use std::collections::HashMap;
use std::f64::consts::PI;

use super::config::GraphViewConfig;
use super::driver::{LayoutPlan, Point};
use super::projector::RenderGraph;

/// Which layout the view is arranged in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GraphLayout {
	#[default]
	Force,
	Cluster,
}

impl GraphLayout {
	pub fn label(self) -> &'static str {
		match self {
			GraphLayout::Force => "Force",
			GraphLayout::Cluster => "Cluster",
		}
	}
}

pub fn plan(layout: GraphLayout, graph: &RenderGraph, config: &GraphViewConfig) -> LayoutPlan {
	match layout {
		GraphLayout::Force => LayoutPlan::Force,
		GraphLayout::Cluster => LayoutPlan::Pinned(cluster_positions(
			graph,
			Point::default(),
			config.cluster_radius,
			config.cluster_member_radius,
		)),
	}
}

/// Group nodes by category, put each category on a circle of `radius` around
/// `center` (in order of first appearance), and put each category's members on
/// a circle of `member_radius` around their cluster centre.
///
/// A category with a single member places it on the cluster centre. With only
/// one category the cluster sits on `center`.
pub fn cluster_positions(
	graph: &RenderGraph,
	center: Point,
	radius: f64,
	member_radius: f64,
) -> HashMap<String, Point> {
	let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
	for node in &graph.nodes {
		match groups.iter_mut().find(|(c, _)| *c == node.category) {
			Some((_, members)) => members.push(node.id.as_str()),
			None => groups.push((node.category.as_str(), vec![node.id.as_str()])),
		}
	}

	let mut positions = HashMap::with_capacity(graph.nodes.len());
	let cluster_count = groups.len();
	for (i, (_, members)) in groups.iter().enumerate() {
		let cluster_center = if cluster_count == 1 {
			center
		} else {
			on_circle(center, radius, i, cluster_count)
		};
		for (j, id) in members.iter().enumerate() {
			let at = if members.len() == 1 {
				cluster_center
			} else {
				on_circle(cluster_center, member_radius, j, members.len())
			};
			positions.insert((*id).to_string(), at);
		}
	}
	positions
}

/// Starting positions for a fresh force simulation: nodes evenly spread on a ring.
pub fn seed_positions(count: usize, center: Point, radius: f64) -> Vec<Point> {
	(0..count).map(|i| on_circle(center, radius, i, count)).collect()
}

fn on_circle(center: Point, radius: f64, index: usize, count: usize) -> Point {
	let angle = (index as f64) * 2.0 * PI / count.max(1) as f64;
	Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::projector::project;
	use crate::components::knowledge_graph::types::KnowledgeNode;

	fn node(id: &str, category: &str) -> KnowledgeNode {
		KnowledgeNode {
			id: id.into(),
			title: id.into(),
			description: String::new(),
			category: category.into(),
			created_at: None,
		}
	}

	fn dist(a: Point, b: Point) -> f64 {
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	#[test]
	fn clusters_sit_on_the_outer_circle() {
		let graph = project(
			&[
				node("a1", "art"),
				node("s1", "science"),
				node("a2", "art"),
				node("s2", "science"),
				node("m1", "music"),
			],
			&[],
		);
		let positions = cluster_positions(&graph, Point::default(), 200.0, 50.0);

		assert_eq!(positions.len(), 5);
		// music has a single member, which sits on its cluster centre
		assert!((dist(positions["m1"], Point::default()) - 200.0).abs() < 1e-9);

		let art_center = Point::new(200.0, 0.0);
		assert!((dist(positions["a1"], art_center) - 50.0).abs() < 1e-9);
		assert!((dist(positions["a2"], art_center) - 50.0).abs() < 1e-9);
		assert!((dist(positions["a1"], positions["a2"]) - 100.0).abs() < 1e-9);
	}

	#[test]
	fn single_category_is_centered() {
		let graph = project(&[node("x", "history"), node("y", "history")], &[]);
		let center = Point::new(10.0, -5.0);
		let positions = cluster_positions(&graph, center, 200.0, 50.0);
		assert!((dist(positions["x"], center) - 50.0).abs() < 1e-9);
		assert!((dist(positions["y"], center) - 50.0).abs() < 1e-9);
	}

	#[test]
	fn force_plan_pins_nothing() {
		let graph = project(&[node("x", "history")], &[]);
		let config = GraphViewConfig::default();
		assert_eq!(plan(GraphLayout::Force, &graph, &config), LayoutPlan::Force);
		match plan(GraphLayout::Cluster, &graph, &config) {
			LayoutPlan::Pinned(p) => assert_eq!(p.len(), 1),
			other => panic!("unexpected plan {other:?}"),
		}
	}

	#[test]
	fn seed_ring_is_even() {
		let seeds = seed_positions(4, Point::default(), 100.0);
		assert_eq!(seeds.len(), 4);
		assert!((seeds[0].x - 100.0).abs() < 1e-9);
		assert!((seeds[2].x + 100.0).abs() < 1e-9);
		assert!(seed_positions(0, Point::default(), 100.0).is_empty());
	}
}
