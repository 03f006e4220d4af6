//! Hover, connection mode, layout and camera state for one mounted view.
//!
//! All state lives in [`InteractionState`] and only changes through its named
//! transitions. Transitions that need the outside world return an [`Intent`]
//! for the view to carry out.

use log::{debug, info};

use super::config::{DisplayToggles, GraphViewConfig};
use super::driver::{GraphCanvasDriver, Point};
use super::layout::{self, GraphLayout};
use super::projector::RenderGraph;

/// Sub-states of connection mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionMode {
	#[default]
	Off,
	/// Waiting for the first endpoint.
	SelectingSource,
	/// First endpoint chosen, waiting for a different second one.
	SelectingTarget { source: String },
}

/// Something the view has to do on behalf of a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
	/// Open the node outside the graph (navigation).
	OpenNode(String),
	/// Persist a new connection between two distinct nodes.
	CreateConnection { source: String, target: String },
	/// Ask the user to confirm deleting this connection.
	ConfirmDelete(String),
	/// The user confirmed; delete the connection.
	DeleteConnection(String),
}

/// What the info overlay should describe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InfoTarget<'a> {
	Node(&'a str),
	Link(&'a str),
}

/// The in-progress edge drawn while a source is pending.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingEdge<'a> {
	pub source: &'a str,
	/// Last pointer position in graph coordinates, if known yet.
	pub pointer: Option<Point>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionState {
	hovered_node: Option<String>,
	hovered_link: Option<String>,
	mode: ConnectionMode,
	mouse_pos: Option<Point>,
	layout: GraphLayout,
	display: DisplayToggles,
	zoom_level: f64,
	pending_delete: Option<String>,
}

impl InteractionState {
	pub fn new(config: &GraphViewConfig) -> Self {
		Self {
			hovered_node: None,
			hovered_link: None,
			mode: ConnectionMode::Off,
			mouse_pos: None,
			layout: GraphLayout::default(),
			display: config.display,
			zoom_level: 1.0,
			pending_delete: None,
		}
	}

	pub fn hovered_node(&self) -> Option<&str> {
		self.hovered_node.as_deref()
	}

	pub fn hovered_link(&self) -> Option<&str> {
		self.hovered_link.as_deref()
	}

	pub fn mode(&self) -> &ConnectionMode {
		&self.mode
	}

	pub fn connection_mode(&self) -> bool {
		self.mode != ConnectionMode::Off
	}

	pub fn source_node(&self) -> Option<&str> {
		match &self.mode {
			ConnectionMode::SelectingTarget { source } => Some(source.as_str()),
			_ => None,
		}
	}

	pub fn mouse_pos(&self) -> Option<Point> {
		self.mouse_pos
	}

	pub fn layout(&self) -> GraphLayout {
		self.layout
	}

	pub fn display(&self) -> DisplayToggles {
		self.display
	}

	pub fn zoom_level(&self) -> f64 {
		self.zoom_level
	}

	pub fn pending_delete(&self) -> Option<&str> {
		self.pending_delete.as_deref()
	}

	/// Returns whether the hovered node changed.
	pub fn hover_node(&mut self, node: Option<&str>) -> bool {
		if self.hovered_node.as_deref() == node {
			return false;
		}
		self.hovered_node = node.map(str::to_string);
		true
	}

	/// Returns whether the hovered link changed.
	pub fn hover_link(&mut self, link: Option<&str>) -> bool {
		if self.hovered_link.as_deref() == link {
			return false;
		}
		self.hovered_link = link.map(str::to_string);
		true
	}

	/// Node wins over link when both are hovered.
	pub fn info_target(&self) -> Option<InfoTarget<'_>> {
		self.hovered_node
			.as_deref()
			.map(InfoTarget::Node)
			.or_else(|| self.hovered_link.as_deref().map(InfoTarget::Link))
	}

	pub fn toggle_connection_mode(&mut self) {
		let enable = !self.connection_mode();
		self.set_connection_mode(enable);
	}

	/// Entering or leaving connection mode always drops a pending source.
	pub fn set_connection_mode(&mut self, enabled: bool) {
		self.mode = if enabled {
			ConnectionMode::SelectingSource
		} else {
			ConnectionMode::Off
		};
		self.mouse_pos = None;
		info!(
			"knowledge-graph: connection mode {}",
			if enabled { "on" } else { "off" }
		);
	}

	/// Keyboard surface. Returns whether the key was handled.
	pub fn key_down(&mut self, key: &str) -> bool {
		match key {
			"c" | "C" => {
				self.toggle_connection_mode();
				true
			}
			"Escape" if self.connection_mode() => {
				self.set_connection_mode(false);
				true
			}
			_ => false,
		}
	}

	pub fn click_node(&mut self, id: &str) -> Option<Intent> {
		match &self.mode {
			ConnectionMode::Off => Some(Intent::OpenNode(id.to_string())),
			ConnectionMode::SelectingSource => {
				debug!("knowledge-graph: connection source {id}");
				self.mode = ConnectionMode::SelectingTarget {
					source: id.to_string(),
				};
				None
			}
			ConnectionMode::SelectingTarget { source } if source == id => None,
			ConnectionMode::SelectingTarget { source } => {
				let intent = Intent::CreateConnection {
					source: source.clone(),
					target: id.to_string(),
				};
				self.mode = ConnectionMode::SelectingSource;
				self.mouse_pos = None;
				Some(intent)
			}
		}
	}

	/// Outside connection mode a link click starts the delete confirmation.
	pub fn click_link(&mut self, id: &str) -> Option<Intent> {
		if self.connection_mode() {
			return None;
		}
		self.pending_delete = Some(id.to_string());
		Some(Intent::ConfirmDelete(id.to_string()))
	}

	pub fn resolve_delete(&mut self, confirmed: bool) -> Option<Intent> {
		let id = self.pending_delete.take()?;
		confirmed.then_some(Intent::DeleteConnection(id))
	}

	/// Tracks the pointer only while a source is pending.
	pub fn pointer_moved(&mut self, graph_pos: Point) -> bool {
		if self.source_node().is_none() {
			return false;
		}
		self.mouse_pos = Some(graph_pos);
		true
	}

	/// Present exactly when connection mode has a pending source.
	pub fn pending_edge(&self) -> Option<PendingEdge<'_>> {
		self.source_node().map(|source| PendingEdge {
			source,
			pointer: self.mouse_pos,
		})
	}

	/// Drop references to nodes or links that vanished from `graph`. A pending
	/// source that vanished is discarded, but connection mode stays on.
	pub fn retain_known(&mut self, graph: &RenderGraph) -> bool {
		let mut changed = false;
		if self.hovered_node.as_deref().is_some_and(|id| graph.node(id).is_none()) {
			self.hovered_node = None;
			changed = true;
		}
		if self.hovered_link.as_deref().is_some_and(|id| graph.link(id).is_none()) {
			self.hovered_link = None;
			changed = true;
		}
		if self.pending_delete.as_deref().is_some_and(|id| graph.link(id).is_none()) {
			self.pending_delete = None;
			changed = true;
		}
		if self.source_node().is_some_and(|id| graph.node(id).is_none()) {
			self.mode = ConnectionMode::SelectingSource;
			self.mouse_pos = None;
			changed = true;
		}
		changed
	}

	pub fn toggle_labels(&mut self) {
		self.display.show_labels = !self.display.show_labels;
	}

	pub fn toggle_arrows(&mut self) {
		self.display.show_arrows = !self.display.show_arrows;
	}

	pub fn toggle_highlight_connections(&mut self) {
		self.display.highlight_connections = !self.display.highlight_connections;
	}

	pub fn toggle_dark_mode(&mut self) {
		self.display.dark_mode = !self.display.dark_mode;
	}

	/// Switch layouts: pins are cleared, the new plan applied and the camera
	/// fitted to all nodes.
	pub fn switch_layout<D: GraphCanvasDriver + ?Sized>(
		&mut self,
		layout: GraphLayout,
		graph: &RenderGraph,
		driver: &mut D,
		config: &GraphViewConfig,
	) {
		self.layout = layout;
		self.reapply_layout(graph, driver, config);
		info!("knowledge-graph: layout {}", layout.label());
	}

	/// Re-run the current layout, e.g. after the graph data changed.
	pub fn reapply_layout<D: GraphCanvasDriver + ?Sized>(
		&self,
		graph: &RenderGraph,
		driver: &mut D,
		config: &GraphViewConfig,
	) {
		driver.set_layout(&layout::plan(self.layout, graph, config));
		driver.refresh();
		driver.focus_all();
	}

	pub fn zoom_by<D: GraphCanvasDriver + ?Sized>(&mut self, factor: f64, driver: &mut D) {
		self.zoom_level = driver.zoom(factor);
	}

	/// Record a zoom level the driver reached on its own (wheel zoom).
	pub fn sync_zoom(&mut self, level: f64) {
		self.zoom_level = level;
	}

	pub fn pan_by<D: GraphCanvasDriver + ?Sized>(&self, dx: f64, dy: f64, driver: &mut D) {
		driver.pan(dx, dy);
	}

	pub fn focus_all<D: GraphCanvasDriver + ?Sized>(&self, driver: &mut D) {
		driver.focus_all();
	}
}
