use leptos::prelude::*;

use super::encoder::{
	category_color, category_icon, icon_symbol, relationship_icon, relationship_label,
};
use super::interaction::{InfoTarget, InteractionState};
use super::projector::{Projection, RenderGraph};
use super::types::Category;

/// Everything the info card shows, resolved from the hovered node or link.
#[derive(Clone, Debug, PartialEq)]
enum InfoCard {
	Node {
		title: String,
		category: String,
		description: String,
		connections: usize,
	},
	Link {
		relationship: Option<String>,
		strength: u8,
		description: String,
		source: String,
		target: String,
	},
}

impl InfoCard {
	fn resolve(state: &InteractionState, graph: &RenderGraph) -> Option<Self> {
		match state.info_target()? {
			InfoTarget::Node(id) => graph.node(id).map(|n| InfoCard::Node {
				title: n.name.clone(),
				category: n.category.clone(),
				description: n.description.clone(),
				connections: n.connection_count,
			}),
			InfoTarget::Link(id) => graph.link(id).map(|l| {
				let name = |id: &str| graph.node(id).map_or_else(|| id.to_string(), |n| n.name.clone());
				InfoCard::Link {
					relationship: l.relationship_type.clone(),
					strength: l.value,
					description: l.description.clone(),
					source: name(&l.source),
					target: name(&l.target),
				}
			}),
		}
	}
}

/// Hover card for the node (preferred) or link under the pointer.
#[component]
pub fn InfoOverlay(
	interaction: RwSignal<InteractionState>,
	projection: Memo<Projection>,
) -> impl IntoView {
	let card = Memo::new(move |_| {
		projection.with(|p| interaction.with(|s| InfoCard::resolve(s, p.graph())))
	});

	move || {
		card.get().map(|card| match card {
			InfoCard::Node {
				title,
				category,
				description,
				connections,
			} => {
				let label = Category::parse(&category)
					.map_or_else(|| category.clone(), |c| c.display_name().to_string());
				view! {
					<div class="graph-info">
						<h4>{title}</h4>
						<p class="graph-info__category" style:color=category_color(&category)>
							{icon_symbol(category_icon(&category))}
							" "
							{label}
						</p>
						{(!description.is_empty()).then(|| view! { <p>{description}</p> })}
						<p class="graph-info__meta">
							{format!(
								"{connections} connection{}",
								if connections == 1 { "" } else { "s" },
							)}
						</p>
					</div>
				}
				.into_any()
			}
			InfoCard::Link {
				relationship,
				strength,
				description,
				source,
				target,
			} => {
				view! {
					<div class="graph-info">
						<h4>
							{icon_symbol(relationship_icon(relationship.as_deref()))}
							" "
							{relationship_label(relationship.as_deref())}
						</h4>
						<p class="graph-info__meta">{format!("{source} → {target}")}</p>
						<p class="graph-info__meta">{format!("Strength {strength}/5")}</p>
						{(!description.is_empty()).then(|| view! { <p>{description}</p> })}
						<p class="graph-info__hint">"Click to delete"</p>
					</div>
				}
				.into_any()
			}
		})
	}
}

/// Stand-in for the canvas when there is nothing to draw or drawing failed.
#[component]
pub fn GraphPlaceholder(
	title: &'static str,
	detail: String,
	#[prop(default = false)] error: bool,
) -> impl IntoView {
	view! {
		<div class="graph-placeholder" class:graph-placeholder--error=error>
			<h3>{title}</h3>
			<p>{detail}</p>
		</div>
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
			title: format!("Title {id}"),
			description: String::new(),
			category: category.into(),
			created_at: None,
		}
	}

	fn graph() -> RenderGraph {
		project(
			&[node("a", "art"), node("b", "science")],
			&[Connection {
				id: "c1".into(),
				source_node_id: "a".into(),
				target_node_id: "b".into(),
				relationship_type: Some("builds_on".into()),
				description: "shared roots".into(),
				strength: Some(4),
				created_at: None,
			}],
		)
	}

	#[test]
	fn nothing_hovered_shows_no_card() {
		let state = InteractionState::new(&GraphViewConfig::default());
		assert_eq!(InfoCard::resolve(&state, &graph()), None);
	}

	#[test]
	fn node_card_wins_over_link() {
		let mut state = InteractionState::new(&GraphViewConfig::default());
		state.hover_link(Some("c1"));
		state.hover_node(Some("b"));
		assert_eq!(
			InfoCard::resolve(&state, &graph()),
			Some(InfoCard::Node {
				title: "Title b".into(),
				category: "science".into(),
				description: String::new(),
				connections: 1,
			})
		);
	}

	#[test]
	fn link_card_names_endpoints() {
		let mut state = InteractionState::new(&GraphViewConfig::default());
		state.hover_link(Some("c1"));
		assert_eq!(
			InfoCard::resolve(&state, &graph()),
			Some(InfoCard::Link {
				relationship: Some("builds_on".into()),
				strength: 4,
				description: "shared roots".into(),
				source: "Title a".into(),
				target: "Title b".into(),
			})
		);
	}

	#[test]
	fn stale_hover_resolves_to_nothing() {
		let mut state = InteractionState::new(&GraphViewConfig::default());
		state.hover_node(Some("gone"));
		assert_eq!(InfoCard::resolve(&state, &graph()), None);
	}
}
