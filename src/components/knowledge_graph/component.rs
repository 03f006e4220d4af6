use std::sync::Arc;

use leptos::prelude::*;
use log::error;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent};

use super::config::GraphViewConfig;
use super::controls::{ConnectionBanner, GraphControls};
use super::error::GraphError;
use super::interaction::InteractionState;
use super::layout::GraphLayout;
use super::overlay::{GraphPlaceholder, InfoOverlay};
use super::projector::Projection;
use super::session::{self, CanvasSession, CanvasSize, GraphCallbacks, SessionSlot};
use super::types::{Connection, KnowledgeNode};

/// Interactive knowledge graph: force-directed canvas, controls panel, hover
/// info and click-click connection mode.
#[component]
pub fn KnowledgeGraphView(
	/// Nodes to draw. Replacing the slice triggers a re-projection.
	#[prop(into)]
	nodes: Signal<Arc<[KnowledgeNode]>>,
	/// Connections to draw. Links with unknown endpoints are skipped.
	#[prop(into)]
	connections: Signal<Arc<[Connection]>>,
	/// Called with a node id when a node is clicked outside connection mode.
	#[prop(into)]
	on_node_click: Callback<String>,
	/// Called with a connection id after the user confirmed deletion.
	#[prop(into)]
	on_delete_connection: Callback<String>,
	/// Called with `(source_id, target_id)` when connection mode completes.
	#[prop(into)]
	on_create_connection: Callback<(String, String)>,
	#[prop(optional)] config: GraphViewConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let config = Arc::new(config.normalized());
	let size = CanvasSize {
		fullscreen,
		width,
		height,
	};
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let slot: SessionSlot = StoredValue::new_local(None);
	let interaction = RwSignal::new(InteractionState::new(&config));
	let fault = RwSignal::new(None::<GraphError>);
	let callbacks = GraphCallbacks {
		on_node_click,
		on_delete_connection,
		on_create_connection,
	};

	let projection = Memo::new(move |prev: Option<&Projection>| {
		Projection::reuse_or_project(prev, nodes.get(), connections.get())
	});
	let is_empty = Memo::new(move |_| projection.with(|p| p.graph().is_empty()));

	// Mount once the canvas element exists.
	let config_mount = config.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if slot.with_value(Option::is_some) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let graph = projection.with_untracked(|p| p.graph().clone());
		let opened = CanvasSession::open(canvas, graph, &config_mount, size).and_then(|s| {
			session::start(s, slot, interaction, fault, config_mount.clone(), size)
		});
		if let Err(e) = opened {
			error!("knowledge-graph: could not start canvas: {e}");
			slot.update_value(|s| *s = None);
			fault.set(Some(e));
		}
	});

	// Feed re-projected data into the running session.
	let config_data = config.clone();
	Effect::new(move |_| {
		let graph = projection.with(|p| p.graph().clone());
		slot.try_update_value(|s| {
			let Some(s) = s.as_mut() else {
				return;
			};
			if !s.replace_graph(graph.clone()) {
				return;
			}
			interaction.maybe_update(|state| {
				if state.layout() == GraphLayout::Cluster {
					state.reapply_layout(&graph, &mut s.driver, &config_data);
				}
				state.retain_known(&graph)
			});
		});
	});

	on_cleanup(move || {
		slot.try_update_value(|s| {
			if let Some(mut s) = s.take() {
				s.teardown();
			}
		});
	});

	let config_layout = config.clone();
	let on_layout = Callback::new(move |layout: GraphLayout| {
		slot.try_update_value(|s| {
			if let Some(s) = s.as_mut() {
				interaction.update(|state| {
					state.switch_layout(layout, &s.graph, &mut s.driver, &config_layout)
				});
			}
		});
	});
	let on_zoom = Callback::new(move |factor: f64| {
		slot.try_update_value(|s| {
			if let Some(s) = s.as_mut() {
				interaction.update(|state| state.zoom_by(factor, &mut s.driver));
			}
		});
	});
	let on_pan = Callback::new(move |(dx, dy): (f64, f64)| {
		slot.try_update_value(|s| {
			if let Some(s) = s.as_mut() {
				interaction.with_untracked(|state| state.pan_by(dx, dy, &mut s.driver));
			}
		});
	});
	let on_focus = Callback::new(move |()| {
		slot.try_update_value(|s| {
			if let Some(s) = s.as_mut() {
				interaction.update(|state| {
					state.focus_all(&mut s.driver);
					state.sync_zoom(s.driver.transform.k);
				});
			}
		});
	});

	let on_mousedown = move |ev: MouseEvent| {
		slot.try_update_value(|s| {
			if let Some(s) = s.as_mut() {
				s.on_press(&ev);
			}
		});
	};
	let on_mousemove = move |ev: MouseEvent| {
		slot.try_update_value(|s| {
			if let Some(s) = s.as_mut() {
				s.on_move(&ev, interaction);
			}
		});
	};
	let on_mouseup = move |ev: MouseEvent| {
		let intent = slot
			.try_update_value(|s| s.as_mut().and_then(|s| s.on_release(&ev, interaction)))
			.flatten();
		if let Some(intent) = intent {
			callbacks.dispatch(intent, interaction);
		}
	};
	let on_mouseleave = move |_: MouseEvent| {
		slot.try_update_value(|s| {
			if let Some(s) = s.as_mut() {
				s.on_leave(interaction);
			}
		});
	};
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		slot.try_update_value(|s| {
			if let Some(s) = s.as_mut() {
				s.on_wheel(&ev, interaction);
			}
		});
	};

	let cursor = move || {
		interaction.with(|s| {
			if s.connection_mode() {
				"crosshair"
			} else if s.hovered_node().is_some() || s.hovered_link().is_some() {
				"pointer"
			} else {
				"grab"
			}
		})
	};
	let hidden = move || is_empty.get() || fault.with(Option::is_some);
	let (pan_step, zoom_step) = (config.pan_step, config.zoom_step);

	view! {
		<div
			class="knowledge-graph"
			class:knowledge-graph--dark=move || interaction.with(|s| s.display().dark_mode)
		>
			<canvas
				node_ref=canvas_ref
				class="knowledge-graph__canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style:display=move || if hidden() { "none" } else { "block" }
				style:cursor=cursor
			/>
			{move || {
				fault
					.get()
					.map(|e| {
						view! {
							<GraphPlaceholder
								title="The graph could not be drawn"
								detail=e.to_string()
								error=true
							/>
						}
					})
			}}
			<Show when=move || fault.with(Option::is_none)>
				<Show
					when=move || !is_empty.get()
					fallback=|| {
						view! {
							<GraphPlaceholder
								title="No knowledge nodes yet"
								detail="Create a few nodes to see how your ideas connect.".to_string()
							/>
						}
					}
				>
					<ConnectionBanner interaction=interaction projection=projection />
					<GraphControls
						interaction=interaction
						on_layout=on_layout
						on_zoom=on_zoom
						on_pan=on_pan
						on_focus=on_focus
						pan_step=pan_step
						zoom_step=zoom_step
					/>
					<InfoOverlay interaction=interaction projection=projection />
				</Show>
			</Show>
		</div>
	}
}
