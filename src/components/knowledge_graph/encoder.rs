//! Stateless mapping from domain attributes to visual attributes.
//!
//! Every function here is total: unknown categories, relationship types and
//! glyphs resolve to a documented fallback instead of failing.

use std::collections::HashSet;

use super::interaction::InteractionState;
use super::projector::{RenderGraph, RenderLink, RenderNode};
use super::types::{Category, RelationshipType};

pub const FALLBACK_COLOR: &str = "#9ca3af";
pub const FALLBACK_ICON: &str = "tag";
pub const FALLBACK_SYMBOL: &str = "•";
pub const FALLBACK_RELATIONSHIP_ICON: &str = "link";
pub const UNRESOLVED_LINK_COLOR: &str = "rgba(156, 163, 175, 0.4)";

const HOVERED_SCALE: f64 = 1.5;
const NEIGHBOR_SCALE: f64 = 1.2;
const DIMMED_SCALE: f64 = 0.6;

pub fn category_color(category: &str) -> &'static str {
	match Category::parse(category) {
		Some(Category::Art) => "#ec4899",
		Some(Category::Science) => "#3b82f6",
		Some(Category::History) => "#f59e0b",
		Some(Category::Music) => "#8b5cf6",
		Some(Category::Literature) => "#10b981",
		Some(Category::Philosophy) => "#6366f1",
		Some(Category::Technology) => "#06b6d4",
		Some(Category::Hobby) => "#f97316",
		Some(Category::Other) | None => FALLBACK_COLOR,
	}
}

/// Icon glyph name for a category.
pub fn category_icon(category: &str) -> &'static str {
	match Category::parse(category) {
		Some(Category::Art) => "palette",
		Some(Category::Science) => "flask",
		Some(Category::History) => "landmark",
		Some(Category::Music) => "music",
		Some(Category::Literature) => "book",
		Some(Category::Philosophy) => "brain",
		Some(Category::Technology) => "cpu",
		Some(Category::Hobby) => "puzzle",
		Some(Category::Other) | None => FALLBACK_ICON,
	}
}

/// Unicode stand-in for an icon glyph, used where icons are drawn as canvas text.
pub fn icon_symbol(glyph: &str) -> &'static str {
	match glyph {
		"palette" => "🎨",
		"flask" => "🔬",
		"landmark" => "🏛",
		"music" => "🎵",
		"book" => "📚",
		"brain" => "🧠",
		"cpu" => "💻",
		"puzzle" => "🧩",
		"tag" => "🏷",
		"link" => "🔗",
		"arrow-right" => "➜",
		"sparkles" => "✨",
		"contrast" => "◐",
		"layers" => "☰",
		"handshake" => "🤝",
		_ => FALLBACK_SYMBOL,
	}
}

pub fn relationship_icon(relationship: Option<&str>) -> &'static str {
	match relationship.and_then(RelationshipType::parse) {
		Some(RelationshipType::Related) | None => FALLBACK_RELATIONSHIP_ICON,
		Some(RelationshipType::Influences) => "arrow-right",
		Some(RelationshipType::Inspires) => "sparkles",
		Some(RelationshipType::Contrasts) => "contrast",
		Some(RelationshipType::BuildsOn) => "layers",
		Some(RelationshipType::Complements) => "handshake",
	}
}

/// Human label for a relationship type: `builds_on` reads as "builds on",
/// a missing type reads as "related".
pub fn relationship_label(relationship: Option<&str>) -> String {
	match relationship.map(str::trim) {
		Some(raw) if !raw.is_empty() => raw.replace('_', " "),
		_ => RelationshipType::Related.as_str().to_string(),
	}
}

/// How a link stroke is painted.
#[derive(Clone, Debug, PartialEq)]
pub enum LinkPaint {
	/// Linear gradient from the source colour to the target colour.
	Gradient {
		from: &'static str,
		to: &'static str,
	},
	Solid(&'static str),
}

/// Stroke paint for a link between nodes of the given categories. `None`
/// means the endpoint could not be resolved.
pub fn link_paint(source_category: Option<&str>, target_category: Option<&str>) -> LinkPaint {
	match (source_category, target_category) {
		(Some(s), Some(t)) => LinkPaint::Gradient {
			from: category_color(s),
			to: category_color(t),
		},
		_ => LinkPaint::Solid(UNRESOLVED_LINK_COLOR),
	}
}

pub fn link_paint_in(graph: &RenderGraph, link: &RenderLink) -> LinkPaint {
	link_paint(
		graph.node(&link.source).map(|n| n.category.as_str()),
		graph.node(&link.target).map(|n| n.category.as_str()),
	)
}

/// The slice of interaction state that sizing and emphasis depend on.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoverFocus<'a> {
	pub hovered_node: Option<&'a str>,
	pub hovered_link: Option<&'a str>,
	pub neighbors: Option<&'a HashSet<String>>,
	pub highlight_connections: bool,
}

impl<'a> HoverFocus<'a> {
	pub fn new(state: &'a InteractionState, graph: &'a RenderGraph) -> Self {
		let hovered_node = state.hovered_node();
		Self {
			hovered_node,
			hovered_link: state.hovered_link(),
			neighbors: hovered_node.and_then(|id| graph.neighbors(id)),
			highlight_connections: state.display().highlight_connections,
		}
	}

	fn is_neighbor(&self, id: &str) -> bool {
		self.neighbors.is_some_and(|n| n.contains(id))
	}
}

/// Size a node is drawn at under the current hover focus.
pub fn node_display_val(node: &RenderNode, focus: &HoverFocus<'_>) -> f64 {
	let Some(hovered) = focus.hovered_node else {
		return node.val;
	};
	if node.id == hovered {
		node.val * HOVERED_SCALE
	} else if !focus.is_neighbor(&node.id) {
		node.val * DIMMED_SCALE
	} else if focus.highlight_connections {
		node.val * NEIGHBOR_SCALE
	} else {
		node.val
	}
}

pub fn node_radius(display_val: f64, rel_size: f64) -> f64 {
	display_val.max(0.0).sqrt() * rel_size
}

/// Whether a link touches the hovered node or is itself hovered.
pub fn link_emphasized(link: &RenderLink, focus: &HoverFocus<'_>) -> bool {
	focus.hovered_link == Some(link.id.as_str())
		|| focus
			.hovered_node
			.is_some_and(|h| link.source == h || link.target == h)
}

pub fn link_width(value: u8, emphasized: bool) -> f64 {
	let base = 0.5 + f64::from(value) * 0.5;
	if emphasized { base * 2.0 } else { base }
}

/// Number of particles flowing along a link.
pub fn flow_particles(value: u8, emphasized: bool) -> u32 {
	let base = u32::from(value.clamp(1, 5));
	if emphasized { base + 2 } else { base }
}

/// Fraction of the link length a particle travels per second.
pub fn particle_speed(value: u8) -> f64 {
	0.12 + 0.04 * f64::from(value.clamp(1, 5))
}

pub fn arrow_length(show_arrows: bool) -> f64 {
	if show_arrows { 6.0 } else { 0.0 }
}

/// Canvas colours for the current mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
	pub background: &'static str,
	pub label: &'static str,
	pub dimmed_label: &'static str,
	pub pending_edge: &'static str,
}

impl Theme {
	pub fn for_mode(dark: bool) -> Self {
		if dark {
			Self {
				background: "#0f172a",
				label: "rgba(255, 255, 255, 0.9)",
				dimmed_label: "rgba(255, 255, 255, 0.35)",
				pending_edge: "rgba(250, 204, 21, 0.9)",
			}
		} else {
			Self {
				background: "#f8fafc",
				label: "rgba(15, 23, 42, 0.9)",
				dimmed_label: "rgba(15, 23, 42, 0.35)",
				pending_edge: "rgba(202, 138, 4, 0.9)",
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::knowledge_graph::config::GraphViewConfig;
	use crate::components::knowledge_graph::projector::project;
	use crate::components::knowledge_graph::types::{Connection, KnowledgeNode};

	fn node(id: &str, category: &str) -> KnowledgeNode {
		KnowledgeNode {
			id: id.into(),
			title: id.to_uppercase(),
			description: String::new(),
			category: category.into(),
			created_at: None,
		}
	}

	fn conn(id: &str, source: &str, target: &str) -> Connection {
		Connection {
			id: id.into(),
			source_node_id: source.into(),
			target_node_id: target.into(),
			relationship_type: None,
			description: String::new(),
			strength: Some(2),
			created_at: None,
		}
	}

	fn star_graph() -> RenderGraph {
		project(
			&[node("hub", "science"), node("a", "art"), node("b", "music"), node("lone", "hobby")],
			&[conn("c1", "hub", "a"), conn("c2", "b", "hub")],
		)
	}

	#[test]
	fn unknown_category_falls_back() {
		assert_eq!(category_color("underwater_basket_weaving"), FALLBACK_COLOR);
		assert_eq!(category_icon("underwater_basket_weaving"), FALLBACK_ICON);
		assert_eq!(category_color(""), FALLBACK_COLOR);
		assert_eq!(category_color("other"), FALLBACK_COLOR);
	}

	#[test]
	fn known_categories_have_distinct_colors() {
		let colors: HashSet<_> = Category::ALL
			.iter()
			.filter(|c| **c != Category::Other)
			.map(|c| category_color(c.as_str()))
			.collect();
		assert_eq!(colors.len(), 8);
		assert!(!colors.contains(FALLBACK_COLOR));
	}

	#[test]
	fn every_icon_has_a_symbol() {
		for category in Category::ALL {
			assert_ne!(icon_symbol(category_icon(category.as_str())), FALLBACK_SYMBOL);
		}
		for rel in RelationshipType::ALL {
			assert_ne!(icon_symbol(relationship_icon(Some(rel.as_str()))), FALLBACK_SYMBOL);
		}
		assert_eq!(icon_symbol("no-such-glyph"), FALLBACK_SYMBOL);
	}

	#[test]
	fn relationship_labels() {
		assert_eq!(relationship_label(Some("builds_on")), "builds on");
		assert_eq!(relationship_label(None), "related");
		assert_eq!(relationship_label(Some("  ")), "related");
		assert_eq!(relationship_icon(Some("teleports")), FALLBACK_RELATIONSHIP_ICON);
		assert_eq!(relationship_icon(Some("inspires")), "sparkles");
	}

	#[test]
	fn link_paint_uses_endpoint_categories() {
		assert_eq!(
			link_paint(Some("art"), Some("science")),
			LinkPaint::Gradient {
				from: "#ec4899",
				to: "#3b82f6"
			}
		);
		assert_eq!(
			link_paint(Some("art"), None),
			LinkPaint::Solid(UNRESOLVED_LINK_COLOR)
		);
	}

	#[test]
	fn idle_focus_keeps_baseline_sizes() {
		let graph = star_graph();
		let focus = HoverFocus::default();
		for node in &graph.nodes {
			assert_eq!(node_display_val(node, &focus), node.val);
		}
	}

	#[test]
	fn hover_boosts_neighbors_and_dims_the_rest() {
		let graph = star_graph();
		let mut state = InteractionState::new(&GraphViewConfig::default());
		state.hover_node(Some("hub"));
		let focus = HoverFocus::new(&state, &graph);

		let val = |id: &str| node_display_val(graph.node(id).unwrap(), &focus);
		assert_eq!(val("hub"), 4.5);
		assert!((val("a") - 3.6).abs() < 1e-9);
		assert!((val("b") - 3.6).abs() < 1e-9);
		assert!((val("lone") - 1.8).abs() < 1e-9);

		let boosted = graph
			.nodes
			.iter()
			.filter(|n| node_display_val(n, &focus) == n.val * 1.5)
			.count();
		assert_eq!(boosted, 1);
	}

	#[test]
	fn hover_without_highlight_still_shrinks_unconnected() {
		let graph = star_graph();
		let mut state = InteractionState::new(&GraphViewConfig::default());
		state.toggle_highlight_connections();
		state.hover_node(Some("hub"));
		let focus = HoverFocus::new(&state, &graph);

		assert_eq!(node_display_val(graph.node("hub").unwrap(), &focus), 4.5);
		assert_eq!(node_display_val(graph.node("a").unwrap(), &focus), 3.0);
		assert!((node_display_val(graph.node("lone").unwrap(), &focus) - 1.8).abs() < 1e-9);
	}

	#[test]
	fn hover_exit_restores_every_baseline() {
		let graph = star_graph();
		let mut state = InteractionState::new(&GraphViewConfig::default());
		state.hover_node(Some("a"));
		state.hover_node(None);
		let focus = HoverFocus::new(&state, &graph);
		for node in &graph.nodes {
			assert_eq!(node_display_val(node, &focus), node.val);
		}
	}

	#[test]
	fn emphasis_follows_hovered_node_and_link() {
		let graph = star_graph();
		let mut state = InteractionState::new(&GraphViewConfig::default());
		state.hover_node(Some("a"));
		let focus = HoverFocus::new(&state, &graph);
		assert!(link_emphasized(graph.link("c1").unwrap(), &focus));
		assert!(!link_emphasized(graph.link("c2").unwrap(), &focus));

		assert!(link_width(2, true) > link_width(2, false));
		assert!(flow_particles(2, true) > flow_particles(2, false));
		assert_eq!(arrow_length(false), 0.0);
	}
}
