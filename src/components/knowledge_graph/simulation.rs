use std::collections::HashMap;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::debug;

use super::config::{GraphViewConfig, SimulationConfig, ZoomRange};
use super::driver::{DriverCapabilities, GraphCanvasDriver, LayoutPlan, Point};
use super::encoder::node_radius;
use super::layout::seed_positions;
use super::projector::{BASE_NODE_VAL, RenderGraph};

/// Screen pixels within which a press-and-release still counts as a click.
const CLICK_SLOP: f64 = 4.0;
/// Screen-space distance from a link's centre line that still hits it.
const LINK_HIT_PX: f64 = 4.0;
const FIT_PADDING: f64 = 40.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
}

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<String>,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Point,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Result of releasing the pointer after a press.
#[derive(Clone, Debug, PartialEq)]
pub enum Release {
	/// Press and release on the same node without moving.
	ClickedNode(String),
	/// Press and release on empty canvas without moving.
	ClickedBackground,
	/// A drag or pan finished.
	Dragged,
	None,
}

struct EdgeRef {
	link_id: String,
	source: String,
	target: String,
}

/// `force_graph`-backed driver: physics, camera and hit testing.
pub struct ForceGraphDriver {
	graph: ForceGraph<NodeInfo, ()>,
	edges: Vec<EdgeRef>,
	positions: HashMap<String, Point>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	simulation: SimulationConfig,
	seed_radius: f64,
	hit_radius: f64,
	zoom_range: ZoomRange,
}

impl ForceGraphDriver {
	pub fn new(data: &RenderGraph, width: f64, height: f64, config: &GraphViewConfig) -> Self {
		let mut driver = Self {
			graph: ForceGraph::new(config.simulation.parameters()),
			edges: Vec::new(),
			positions: HashMap::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			simulation: config.simulation.clone(),
			seed_radius: config.seed_radius,
			hit_radius: node_radius(BASE_NODE_VAL * 1.5, config.node_rel_size) + 2.0,
			zoom_range: config.zoom_range(),
		};
		driver.load(data);
		driver
	}

	/// Replace the simulated graph, keeping positions and pins of nodes that
	/// survive the change.
	pub fn load(&mut self, data: &RenderGraph) {
		let mut previous: HashMap<String, (Point, bool)> = HashMap::new();
		self.graph.visit_nodes(|node| {
			previous.insert(
				node.data.user_data.id.clone(),
				(
					Point::new(node.x() as f64, node.y() as f64),
					node.data.is_anchor,
				),
			);
		});

		let mut graph = ForceGraph::new(self.simulation.parameters());
		let mut id_to_idx: HashMap<&str, DefaultNodeIdx> = HashMap::new();
		let seeds = seed_positions(data.nodes.len(), Point::default(), self.seed_radius);
		self.positions.clear();

		for (node, seed) in data.nodes.iter().zip(seeds) {
			let (at, is_anchor) = previous.get(&node.id).copied().unwrap_or((seed, false));
			let idx = graph.add_node(NodeData {
				x: at.x as f32,
				y: at.y as f32,
				mass: self.simulation.node_mass,
				is_anchor,
				user_data: NodeInfo {
					id: node.id.clone(),
				},
			});
			id_to_idx.insert(&node.id, idx);
			self.positions.insert(node.id.clone(), at);
		}

		self.edges.clear();
		for link in &data.links {
			if let (Some(&src), Some(&tgt)) = (
				id_to_idx.get(link.source.as_str()),
				id_to_idx.get(link.target.as_str()),
			) {
				graph.add_edge(src, tgt, EdgeData::default());
				self.edges.push(EdgeRef {
					link_id: link.id.clone(),
					source: link.source.clone(),
					target: link.target.clone(),
				});
			}
		}

		self.graph = graph;
		self.animation_running = true;
		debug!(
			"knowledge-graph: simulation loaded {} nodes, {} edges",
			self.positions.len(),
			self.edges.len()
		);
	}

	pub fn position(&self, id: &str) -> Option<Point> {
		self.positions.get(id).copied()
	}

	#[cfg(test)]
	pub fn graph_to_screen(&self, p: Point) -> Point {
		Point::new(
			p.x * self.transform.k + self.transform.x,
			p.y * self.transform.k + self.transform.y,
		)
	}

	fn to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Closest node within hit distance of a screen point.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<String> {
		let g = self.to_graph(sx, sy);
		self.positions
			.iter()
			.map(|(id, p)| (id, (p.x - g.x).hypot(p.y - g.y)))
			.filter(|(_, d)| *d < self.hit_radius)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(id, _)| id.clone())
	}

	/// Id of the connection whose line passes within a few pixels of a screen point.
	pub fn link_at(&self, sx: f64, sy: f64) -> Option<String> {
		let g = self.to_graph(sx, sy);
		let tolerance = LINK_HIT_PX / self.transform.k;
		self.edges
			.iter()
			.filter_map(|e| {
				let a = self.positions.get(&e.source)?;
				let b = self.positions.get(&e.target)?;
				Some((e, distance_to_segment(g, *a, *b)))
			})
			.filter(|(_, d)| *d < tolerance)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(e, _)| e.link_id.clone())
	}

	/// Pointer pressed: grab a node if one is under it, otherwise start panning.
	pub fn press(&mut self, sx: f64, sy: f64) {
		if let Some(id) = self.node_at(sx, sy) {
			let node_start = self.positions.get(&id).copied().unwrap_or_default();
			self.drag = DragState {
				active: true,
				node: Some(id),
				moved: false,
				start_x: sx,
				start_y: sy,
				node_start,
			};
		} else {
			self.pan = PanState {
				active: true,
				moved: false,
				start_x: sx,
				start_y: sy,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	/// Pointer moved while pressed. Returns whether a drag or pan is running.
	pub fn drag_to(&mut self, sx: f64, sy: f64) -> bool {
		if self.drag.active {
			if (sx - self.drag.start_x).hypot(sy - self.drag.start_y) > CLICK_SLOP {
				self.drag.moved = true;
			}
			if !self.drag.moved {
				return true;
			}
			let Some(id) = self.drag.node.clone() else {
				return true;
			};
			let at = Point::new(
				self.drag.node_start.x + (sx - self.drag.start_x) / self.transform.k,
				self.drag.node_start.y + (sy - self.drag.start_y) / self.transform.k,
			);
			self.pin(&id, at);
			true
		} else if self.pan.active {
			if (sx - self.pan.start_x).hypot(sy - self.pan.start_y) > CLICK_SLOP {
				self.pan.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
			true
		} else {
			false
		}
	}

	pub fn release(&mut self) -> Release {
		let drag = std::mem::take(&mut self.drag);
		let pan = std::mem::take(&mut self.pan);
		match (drag.active, drag.node, pan.active) {
			(true, Some(id), _) if !drag.moved => Release::ClickedNode(id),
			(true, _, _) => Release::Dragged,
			(false, _, true) if !pan.moved => Release::ClickedBackground,
			(false, _, true) => Release::Dragged,
			_ => Release::None,
		}
	}

	/// Pointer left the canvas: abandon any gesture.
	pub fn cancel_gesture(&mut self) {
		self.drag = DragState::default();
		self.pan = PanState::default();
	}

	/// Wheel zoom anchored at a screen point.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) -> f64 {
		let new_k = self.zoom_range.clamp(self.transform.k * factor);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
		new_k
	}

	fn pin(&mut self, id: &str, at: Point) {
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data.id == id {
				node.data.x = at.x as f32;
				node.data.y = at.y as f32;
				node.data.is_anchor = true;
			}
		});
		self.positions.insert(id.to_string(), at);
	}

	pub fn tick(&mut self, dt: f32) {
		self.flow_time += dt as f64;
		if !self.animation_running {
			return;
		}
		self.graph.update(dt);
		let positions = &mut self.positions;
		self.graph.visit_nodes(|node| {
			if let Some(p) = positions.get_mut(&node.data.user_data.id) {
				*p = Point::new(node.x() as f64, node.y() as f64);
			}
		});
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

impl GraphCanvasDriver for ForceGraphDriver {
	fn capabilities(&self) -> DriverCapabilities {
		DriverCapabilities {
			coordinate_mapping: true,
		}
	}

	fn set_layout(&mut self, plan: &LayoutPlan) {
		self.graph.visit_nodes_mut(|node| node.data.is_anchor = false);
		if let LayoutPlan::Pinned(targets) = plan {
			let positions = &mut self.positions;
			self.graph.visit_nodes_mut(|node| {
				if let Some(at) = targets.get(&node.data.user_data.id) {
					node.data.x = at.x as f32;
					node.data.y = at.y as f32;
					node.data.is_anchor = true;
					positions.insert(node.data.user_data.id.clone(), *at);
				}
			});
		}
	}

	fn focus_all(&mut self) {
		let mut points = self.positions.values();
		let Some(first) = points.next() else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		};
		let (mut min, mut max) = (*first, *first);
		for p in points {
			min = Point::new(min.x.min(p.x), min.y.min(p.y));
			max = Point::new(max.x.max(p.x), max.y.max(p.y));
		}
		let (bw, bh) = (
			(max.x - min.x).max(1.0) + 2.0 * self.hit_radius,
			(max.y - min.y).max(1.0) + 2.0 * self.hit_radius,
		);
		let (avail_w, avail_h) = (
			(self.width - 2.0 * FIT_PADDING).max(1.0),
			(self.height - 2.0 * FIT_PADDING).max(1.0),
		);
		let k = self.zoom_range.clamp((avail_w / bw).min(avail_h / bh));
		let center = Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - center.x * k,
			y: self.height / 2.0 - center.y * k,
			k,
		};
	}

	fn pan(&mut self, dx: f64, dy: f64) {
		self.transform.x += dx;
		self.transform.y += dy;
	}

	fn zoom(&mut self, factor: f64) -> f64 {
		self.zoom_at(self.width / 2.0, self.height / 2.0, factor)
	}

	fn refresh(&mut self) {
		self.animation_running = true;
	}

	fn screen_to_graph(&self, screen: Point) -> Option<Point> {
		Some(self.to_graph(screen.x, screen.y))
	}
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	if len_sq < f64::EPSILON {
		return (p.x - a.x).hypot(p.y - a.y);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
	(p.x - (a.x + t * dx)).hypot(p.y - (a.y + t * dy))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::layout::{GraphLayout, plan};
	use crate::components::knowledge_graph::projector::project;
	use crate::components::knowledge_graph::types::{Connection, KnowledgeNode};

	fn graph() -> RenderGraph {
		let node = |id: &str, category: &str| KnowledgeNode {
			id: id.into(),
			title: id.into(),
			description: String::new(),
			category: category.into(),
			created_at: None,
		};
		project(
			&[node("a", "art"), node("b", "art"), node("c", "science")],
			&[Connection {
				id: "ab".into(),
				source_node_id: "a".into(),
				target_node_id: "b".into(),
				relationship_type: None,
				description: String::new(),
				strength: Some(3),
				created_at: None,
			}],
		)
	}

	fn driver() -> ForceGraphDriver {
		let mut d = ForceGraphDriver::new(&graph(), 800.0, 600.0, &GraphViewConfig::default());
		d.animation_running = false;
		d
	}

	#[test]
	fn screen_and_graph_coordinates_round_trip() {
		let mut d = driver();
		d.zoom_at(100.0, 50.0, 2.0);
		let g = d.screen_to_graph(Point::new(300.0, 200.0)).unwrap();
		let s = d.graph_to_screen(g);
		assert!((s.x - 300.0).abs() < 1e-9 && (s.y - 200.0).abs() < 1e-9);
	}

	#[test]
	fn seeded_nodes_are_hit_at_their_screen_position() {
		let d = driver();
		let a = d.graph_to_screen(d.position("a").unwrap());
		assert_eq!(d.node_at(a.x + 1.0, a.y), Some("a".to_string()));
		assert_eq!(d.node_at(d.width / 2.0, d.height / 2.0), None);
	}

	#[test]
	fn link_hit_uses_segment_distance() {
		let d = driver();
		let a = d.graph_to_screen(d.position("a").unwrap());
		let b = d.graph_to_screen(d.position("b").unwrap());
		let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
		assert_eq!(d.link_at(mid.x, mid.y), Some("ab".to_string()));
	}

	#[test]
	fn press_release_without_motion_is_a_click() {
		let mut d = driver();
		let a = d.graph_to_screen(d.position("a").unwrap());
		d.press(a.x, a.y);
		assert_eq!(d.release(), Release::ClickedNode("a".into()));

		d.press(a.x, a.y);
		d.drag_to(a.x + 30.0, a.y);
		assert_eq!(d.release(), Release::Dragged);
		let moved = d.position("a").unwrap();
		assert!((d.graph_to_screen(moved).x - (a.x + 30.0)).abs() < 1e-3);
	}

	#[test]
	fn background_drag_pans() {
		let mut d = driver();
		let before = d.transform.x;
		d.press(5.0, 5.0);
		d.drag_to(25.0, 5.0);
		assert_eq!(d.release(), Release::Dragged);
		assert_eq!(d.transform.x, before + 20.0);
	}

	#[test]
	fn cluster_plan_pins_positions() {
		let mut d = driver();
		let g = graph();
		d.set_layout(&plan(GraphLayout::Cluster, &g, &GraphViewConfig::default()));
		let a = d.position("a").unwrap();
		let c = d.position("c").unwrap();
		assert!((c.x + 200.0).abs() < 1e-3);
		assert!((a.x - 250.0).abs() < 1e-3);
	}

	#[test]
	fn reload_keeps_surviving_positions() {
		let mut d = driver();
		d.set_layout(&LayoutPlan::Pinned(
			[("a".to_string(), Point::new(42.0, 7.0))].into_iter().collect(),
		));
		d.load(&graph());
		assert_eq!(d.position("a"), Some(Point::new(42.0, 7.0)));
	}

	#[test]
	fn focus_all_centres_the_bounds() {
		let mut d = driver();
		d.focus_all();
		let (min_x, max_x) = ["a", "b", "c"]
			.iter()
			.map(|id| d.graph_to_screen(d.position(id).unwrap()).x)
			.fold((f64::MAX, f64::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
		assert!(((min_x + max_x) / 2.0 - 400.0).abs() < 1e-6);
		assert!(min_x >= FIT_PADDING - 1e-6);
	}

	#[test]
	fn background_click_without_motion() {
		let mut d = driver();
		d.press(5.0, 5.0);
		assert_eq!(d.release(), Release::ClickedBackground);
		assert_eq!(d.release(), Release::None);
	}

	#[test]
	fn inverted_zoom_bounds_do_not_panic() {
		let config: GraphViewConfig =
			serde_json::from_str(r#"{"min_zoom": 5, "max_zoom": 2}"#).unwrap();
		let mut d = ForceGraphDriver::new(&graph(), 800.0, 600.0, &config);
		d.focus_all();
		assert!((2.0..=5.0).contains(&d.transform.k));
		assert_eq!(d.zoom(100.0), 5.0);
		assert_eq!(d.zoom_at(0.0, 0.0, 0.001), 2.0);
	}

	#[test]
	fn zoom_is_clamped() {
		let mut d = driver();
		assert_eq!(d.zoom(1000.0), 10.0);
		assert_eq!(d.zoom(0.0001), 0.1);
	}
}
