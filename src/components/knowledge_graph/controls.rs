use leptos::prelude::*;

use super::encoder::{category_color, category_icon, icon_symbol};
use super::interaction::{ConnectionMode, InteractionState};
use super::layout::GraphLayout;
use super::projector::Projection;
use super::types::Category;

/// Side panel: layout switch, display toggles, connection mode, camera and
/// the category legend.
#[component]
pub fn GraphControls(
	interaction: RwSignal<InteractionState>,
	on_layout: Callback<GraphLayout>,
	on_zoom: Callback<f64>,
	on_pan: Callback<(f64, f64)>,
	on_focus: Callback<()>,
	pan_step: f64,
	zoom_step: f64,
) -> impl IntoView {
	let layout = move || interaction.with(|s| s.layout());
	let display = move || interaction.with(|s| s.display());
	let connecting = move || interaction.with(|s| s.connection_mode());
	let zoom_pct = move || format!("{:.0}%", interaction.with(|s| s.zoom_level()) * 100.0);

	let layout_button = move |target: GraphLayout| {
		view! {
			<button
				class="graph-controls__button"
				class:graph-controls__button--active=move || layout() == target
				on:click=move |_| on_layout.run(target)
			>
				{target.label()}
			</button>
		}
	};

	view! {
		<aside class="graph-controls">
			<section class="graph-controls__group">
				<h3>"Layout"</h3>
				{layout_button(GraphLayout::Force)}
				{layout_button(GraphLayout::Cluster)}
			</section>

			<section class="graph-controls__group">
				<h3>"Display"</h3>
				<label>
					<input
						type="checkbox"
						prop:checked=move || display().show_labels
						on:change=move |_| interaction.update(InteractionState::toggle_labels)
					/>
					"Labels"
				</label>
				<label>
					<input
						type="checkbox"
						prop:checked=move || display().show_arrows
						on:change=move |_| interaction.update(InteractionState::toggle_arrows)
					/>
					"Arrows"
				</label>
				<label>
					<input
						type="checkbox"
						prop:checked=move || display().highlight_connections
						on:change=move |_| {
							interaction.update(InteractionState::toggle_highlight_connections)
						}
					/>
					"Highlight connections"
				</label>
				<label>
					<input
						type="checkbox"
						prop:checked=move || display().dark_mode
						on:change=move |_| interaction.update(InteractionState::toggle_dark_mode)
					/>
					"Dark mode"
				</label>
			</section>

			<section class="graph-controls__group">
				<h3>"Connect"</h3>
				<button
					class="graph-controls__button"
					class:graph-controls__button--active=connecting
					title="Toggle with C, leave with Esc"
					on:click=move |_| interaction.update(InteractionState::toggle_connection_mode)
				>
					{move || if connecting() { "Exit connection mode" } else { "Connect nodes" }}
				</button>
			</section>

			<section class="graph-controls__group">
				<h3>"View"</h3>
				<div class="graph-controls__pad">
					<button on:click=move |_| on_pan.run((0.0, pan_step))>"↑"</button>
					<button on:click=move |_| on_pan.run((pan_step, 0.0))>"←"</button>
					<button on:click=move |_| on_pan.run((-pan_step, 0.0))>"→"</button>
					<button on:click=move |_| on_pan.run((0.0, -pan_step))>"↓"</button>
				</div>
				<button on:click=move |_| on_zoom.run(zoom_step)>"+"</button>
				<span class="graph-controls__zoom">{zoom_pct}</span>
				<button on:click=move |_| on_zoom.run(1.0 / zoom_step)>"−"</button>
				<button on:click=move |_| on_focus.run(())>"Fit"</button>
			</section>

			<CategoryLegend />
		</aside>
	}
}

#[component]
fn CategoryLegend() -> impl IntoView {
	view! {
		<section class="graph-controls__group graph-legend">
			<h3>"Categories"</h3>
			<ul>
				{Category::ALL
					.into_iter()
					.map(|c| {
						view! {
							<li>
								<span
									class="graph-legend__swatch"
									style:background-color=category_color(c.as_str())
								/>
								{icon_symbol(category_icon(c.as_str()))}
								" "
								{c.display_name()}
							</li>
						}
					})
					.collect_view()}
			</ul>
		</section>
	}
}

/// Prompt shown while connection mode is on.
#[component]
pub fn ConnectionBanner(
	interaction: RwSignal<InteractionState>,
	projection: Memo<Projection>,
) -> impl IntoView {
	let message = move || {
		interaction.with(|s| match s.mode() {
			ConnectionMode::Off => None,
			ConnectionMode::SelectingSource => {
				Some("Click a node to start a connection. Esc to cancel.".to_string())
			}
			ConnectionMode::SelectingTarget { source } => {
				let name = projection.with(|p| {
					p.graph()
						.node(source)
						.map_or_else(|| source.clone(), |n| n.name.clone())
				});
				Some(format!("Connecting from \"{name}\": click the target node."))
			}
		})
	};

	move || {
		message().map(|text| {
			view! {
				<div class="graph-status" role="status">
					{text}
				</div>
			}
		})
	}
}
