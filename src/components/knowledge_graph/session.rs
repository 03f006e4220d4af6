//! Browser resources owned by one mounted graph view.

use std::sync::Arc;

use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent,
	WheelEvent, Window,
};

use super::config::GraphViewConfig;
use super::driver::{GraphCanvasDriver, Point};
use super::error::GraphError;
use super::interaction::{Intent, InteractionState};
use super::projector::RenderGraph;
use super::render::{self, Frame};
use super::simulation::{ForceGraphDriver, Release};

/// Fixed simulation step per animation frame.
const FRAME_DT: f32 = 0.016;

pub type SessionSlot = StoredValue<Option<CanvasSession>, LocalStorage>;

/// How the canvas is sized.
#[derive(Clone, Copy, Debug)]
pub struct CanvasSize {
	pub fullscreen: bool,
	pub width: Option<f64>,
	pub height: Option<f64>,
}

pub struct CanvasSession {
	pub driver: ForceGraphDriver,
	pub graph: Arc<RenderGraph>,
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	window: Window,
	coordinate_mapping: bool,
	listeners: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
	frame_loop: Option<Closure<dyn FnMut()>>,
	frame_handle: Option<i32>,
	ready_timer: Option<(i32, Closure<dyn FnMut()>)>,
	torn_down: bool,
}

impl CanvasSession {
	/// Size the canvas, grab its 2d context and seed the simulation.
	pub fn open(
		canvas: HtmlCanvasElement,
		graph: Arc<RenderGraph>,
		config: &GraphViewConfig,
		size: CanvasSize,
	) -> Result<Self, GraphError> {
		let window = web_sys::window().ok_or(GraphError::MissingCanvas)?;
		let (w, h) = if size.fullscreen {
			window_size(&window)
		} else {
			(
				size.width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				size.height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")?
			.ok_or(GraphError::MissingContext)?
			.dyn_into()
			.map_err(|_| GraphError::MissingContext)?;

		let driver = ForceGraphDriver::new(&graph, w, h, config);
		let coordinate_mapping = driver.capabilities().coordinate_mapping;
		info!("knowledge-graph: canvas session opened at {w}x{h}");

		Ok(Self {
			driver,
			graph,
			canvas,
			ctx,
			window,
			coordinate_mapping,
			listeners: Vec::new(),
			frame_loop: None,
			frame_handle: None,
			ready_timer: None,
			torn_down: false,
		})
	}

	fn listen(
		&mut self,
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Result<(), GraphError> {
		let closure = Closure::<dyn FnMut(Event)>::new(handler);
		self.window
			.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
		self.listeners.push((event, closure));
		Ok(())
	}

	fn request_frame(&mut self) -> Result<(), GraphError> {
		if self.torn_down {
			return Ok(());
		}
		if let Some(cb) = &self.frame_loop {
			let handle = self
				.window
				.request_animation_frame(cb.as_ref().unchecked_ref())?;
			self.frame_handle = Some(handle);
		}
		Ok(())
	}

	fn draw(&mut self, state: &InteractionState, config: &GraphViewConfig) -> Result<(), GraphError> {
		self.driver.tick(FRAME_DT);
		render::render(
			&Frame {
				driver: &self.driver,
				graph: &self.graph,
				state,
				config,
			},
			&self.ctx,
		)
	}

	/// Swap in a newly projected graph.
	pub fn replace_graph(&mut self, graph: Arc<RenderGraph>) -> bool {
		if Arc::ptr_eq(&self.graph, &graph) {
			return false;
		}
		self.driver.load(&graph);
		self.graph = graph;
		true
	}

	fn local_point(&self, ev: &MouseEvent) -> (f64, f64) {
		let rect = self.canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	}

	pub fn on_press(&mut self, ev: &MouseEvent) {
		let (x, y) = self.local_point(ev);
		self.driver.press(x, y);
	}

	/// Drag/pan when pressed, otherwise track what is under the pointer.
	pub fn on_move(&mut self, ev: &MouseEvent, interaction: RwSignal<InteractionState>) {
		let (x, y) = self.local_point(ev);
		if self.driver.drag_to(x, y) {
			return;
		}
		let node = self.driver.node_at(x, y);
		let link = match node {
			Some(_) => None,
			None => self.driver.link_at(x, y),
		};
		interaction.maybe_update(|s| {
			let node_changed = s.hover_node(node.as_deref());
			let link_changed = s.hover_link(link.as_deref());
			node_changed || link_changed
		});
	}

	pub fn on_release(
		&mut self,
		ev: &MouseEvent,
		interaction: RwSignal<InteractionState>,
	) -> Option<Intent> {
		let (x, y) = self.local_point(ev);
		match self.driver.release() {
			Release::ClickedNode(id) => interaction.try_update(|s| s.click_node(&id)).flatten(),
			Release::ClickedBackground => {
				let link = self.driver.link_at(x, y)?;
				interaction.try_update(|s| s.click_link(&link)).flatten()
			}
			Release::Dragged | Release::None => None,
		}
	}

	pub fn on_leave(&mut self, interaction: RwSignal<InteractionState>) {
		self.driver.cancel_gesture();
		interaction.maybe_update(|s| {
			let node_changed = s.hover_node(None);
			let link_changed = s.hover_link(None);
			node_changed || link_changed
		});
	}

	pub fn on_wheel(&mut self, ev: &WheelEvent, interaction: RwSignal<InteractionState>) {
		let (x, y) = self.local_point(ev);
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		let level = self.driver.zoom_at(x, y, factor);
		interaction.update(|s| s.sync_zoom(level));
	}

	fn on_window_pointer(&mut self, ev: &MouseEvent, interaction: RwSignal<InteractionState>) {
		if !self.coordinate_mapping || interaction.with_untracked(|s| s.source_node().is_none()) {
			return;
		}
		let (x, y) = self.local_point(ev);
		if let Some(at) = self.driver.screen_to_graph(Point::new(x, y)) {
			interaction.maybe_update(|s| s.pointer_moved(at));
		}
	}

	fn on_resize(&mut self) {
		let (w, h) = window_size(&self.window);
		self.canvas.set_width(w as u32);
		self.canvas.set_height(h as u32);
		self.driver.resize(w, h);
	}

	/// Cancel the pending frame and timer and detach every window listener.
	/// Safe to call more than once.
	pub fn teardown(&mut self) {
		if self.torn_down {
			return;
		}
		self.torn_down = true;
		if let Some(handle) = self.frame_handle.take() {
			let _ = self.window.cancel_animation_frame(handle);
		}
		if let Some((handle, _)) = self.ready_timer.take() {
			self.window.clear_timeout_with_handle(handle);
		}
		for (event, closure) in self.listeners.drain(..) {
			let _ = self
				.window
				.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
		}
		self.frame_loop = None;
		debug!("knowledge-graph: canvas session torn down");
	}
}

impl Drop for CanvasSession {
	fn drop(&mut self) {
		self.teardown();
	}
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

/// Whether an element with this tag takes typed text.
fn is_text_entry(tag_name: &str, content_editable: bool) -> bool {
	content_editable
		|| ["INPUT", "TEXTAREA", "SELECT"]
			.iter()
			.any(|t| t.eq_ignore_ascii_case(tag_name))
}

fn typing_into(ev: &KeyboardEvent) -> bool {
	ev.target()
		.and_then(|t| t.dyn_into::<HtmlElement>().ok())
		.is_some_and(|el| is_text_entry(&el.tag_name(), el.is_content_editable()))
}

/// Wire the window listeners, readiness timer and frame loop of a freshly
/// opened session, then hand it to `slot`.
pub fn start(
	mut session: CanvasSession,
	slot: SessionSlot,
	interaction: RwSignal<InteractionState>,
	fault: RwSignal<Option<GraphError>>,
	config: Arc<GraphViewConfig>,
	size: CanvasSize,
) -> Result<(), GraphError> {
	session.listen("mousemove", move |ev| {
		let Some(ev) = ev.dyn_ref::<MouseEvent>() else {
			return;
		};
		slot.try_update_value(|s| {
			if let Some(s) = s.as_mut() {
				s.on_window_pointer(ev, interaction);
			}
		});
	})?;

	session.listen("keydown", move |ev| {
		let Some(ev) = ev.dyn_ref::<KeyboardEvent>() else {
			return;
		};
		if ev.ctrl_key() || ev.meta_key() || ev.alt_key() || typing_into(ev) {
			return;
		}
		let live = slot.try_with_value(|s| s.as_ref().is_some_and(|s| !s.graph.is_empty()));
		if live != Some(true) {
			return;
		}
		let key = ev.key();
		if interaction.try_update(|s| s.key_down(&key)) == Some(true) && key == "Escape" {
			ev.prevent_default();
		}
	})?;

	if size.fullscreen {
		session.listen("resize", move |_| {
			slot.try_update_value(|s| {
				if let Some(s) = s.as_mut() {
					s.on_resize();
				}
			});
		})?;
	}

	let ready = Closure::<dyn FnMut()>::new(move || {
		slot.try_update_value(|s| {
			if let Some(s) = s.as_mut() {
				let state = interaction.get_untracked();
				state.focus_all(&mut s.driver);
				interaction.update(|i| i.sync_zoom(s.driver.transform.k));
			}
		});
	});
	let timer = session
		.window
		.set_timeout_with_callback_and_timeout_and_arguments_0(
			ready.as_ref().unchecked_ref(),
			config.ready_delay_ms,
		)?;
	session.ready_timer = Some((timer, ready));

	session.frame_loop = Some(Closure::new(move || {
		let outcome = slot.try_update_value(|s| {
			let Some(s) = s.as_mut() else {
				return Ok(());
			};
			s.frame_handle = None;
			if s.torn_down {
				return Ok(());
			}
			interaction.with_untracked(|state| s.draw(state, &config))?;
			s.request_frame()
		});
		if let Some(Err(e)) = outcome {
			error!("knowledge-graph: render stopped: {e}");
			fault.set(Some(e));
		}
	}));

	slot.update_value(|s| *s = Some(session));
	slot.try_update_value(|s| s.as_mut().map(CanvasSession::request_frame))
		.flatten()
		.unwrap_or(Ok(()))
}

/// Carry out an intent through the view's collaborator callbacks.
#[derive(Clone, Copy)]
pub struct GraphCallbacks {
	pub on_node_click: Callback<String>,
	pub on_delete_connection: Callback<String>,
	pub on_create_connection: Callback<(String, String)>,
}

impl GraphCallbacks {
	pub fn dispatch(&self, intent: Intent, interaction: RwSignal<InteractionState>) {
		match intent {
			Intent::OpenNode(id) => self.on_node_click.run(id),
			Intent::CreateConnection { source, target } => {
				info!("knowledge-graph: create connection {source} -> {target}");
				self.on_create_connection.run((source, target));
			}
			Intent::ConfirmDelete(_) => {
				let confirmed = web_sys::window()
					.and_then(|w| w.confirm_with_message("Delete this connection?").ok())
					.unwrap_or(false);
				if let Some(next) = interaction.try_update(|s| s.resolve_delete(confirmed)).flatten() {
					self.dispatch(next, interaction);
				}
			}
			Intent::DeleteConnection(id) => {
				info!("knowledge-graph: delete connection {id}");
				self.on_delete_connection.run(id);
			}
		}
	}
}
