use force_graph::SimulationParameters;
use log::warn;
use serde::Deserialize;
use wasm_bindgen::JsCast;
use web_sys::HtmlScriptElement;

/// Physics knobs forwarded to the force simulation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
	pub force_charge: f32,
	pub force_spring: f32,
	pub force_max: f32,
	pub node_speed: f32,
	pub damping_factor: f32,
	pub node_mass: f32,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		Self {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			node_mass: 10.0,
		}
	}
}

impl SimulationConfig {
	pub fn parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

/// Initial state of the display toggles in the controls panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayToggles {
	pub show_labels: bool,
	pub show_arrows: bool,
	pub highlight_connections: bool,
	pub dark_mode: bool,
}

impl Default for DisplayToggles {
	fn default() -> Self {
		Self {
			show_labels: true,
			show_arrows: true,
			highlight_connections: true,
			dark_mode: true,
		}
	}
}

/// Tunables for one graph view instance.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphViewConfig {
	pub simulation: SimulationConfig,
	pub display: DisplayToggles,
	/// Pixel radius multiplier applied to `sqrt(val)`.
	pub node_rel_size: f64,
	/// Distance from the canvas centre to each category cluster.
	pub cluster_radius: f64,
	/// Distance from a cluster centre to its members.
	pub cluster_member_radius: f64,
	/// Radius of the ring the force layout seeds nodes on.
	pub seed_radius: f64,
	/// Delay before the first fit-to-bounds, giving the simulation time to spread.
	pub ready_delay_ms: i32,
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Screen pixels moved per pan button press.
	pub pan_step: f64,
	/// Multiplicative zoom step for the zoom buttons.
	pub zoom_step: f64,
}

impl Default for GraphViewConfig {
	fn default() -> Self {
		Self {
			simulation: SimulationConfig::default(),
			display: DisplayToggles::default(),
			node_rel_size: 4.0,
			cluster_radius: 200.0,
			cluster_member_radius: 50.0,
			seed_radius: 100.0,
			ready_delay_ms: 400,
			min_zoom: 0.1,
			max_zoom: 10.0,
			pan_step: 80.0,
			zoom_step: 1.2,
		}
	}
}

/// Ordered, positive zoom bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomRange {
	min: f64,
	max: f64,
}

impl ZoomRange {
	pub fn clamp(self, k: f64) -> f64 {
		k.clamp(self.min, self.max)
	}
}

impl GraphViewConfig {
	/// Zoom bounds with non-positive or non-finite values replaced by the
	/// defaults and inverted bounds swapped.
	pub fn zoom_range(&self) -> ZoomRange {
		let defaults = Self::default();
		let usable = |k: f64| k.is_finite() && k > 0.0;
		let min = if usable(self.min_zoom) { self.min_zoom } else { defaults.min_zoom };
		let max = if usable(self.max_zoom) { self.max_zoom } else { defaults.max_zoom };
		ZoomRange {
			min: min.min(max),
			max: min.max(max),
		}
	}

	/// Rewrite fields that would misbehave downstream.
	pub fn normalized(mut self) -> Self {
		let range = self.zoom_range();
		if (range.min, range.max) != (self.min_zoom, self.max_zoom) {
			warn!(
				"knowledge-graph: zoom bounds {}..{} replaced by {}..{}",
				self.min_zoom, self.max_zoom, range.min, range.max
			);
			self.min_zoom = range.min;
			self.max_zoom = range.max;
		}
		self
	}

	/// Read a JSON config from `<script id="{element_id}">`, falling back to
	/// defaults when the element is absent or unparsable.
	pub fn from_dom(element_id: &str) -> Self {
		let Some(text) = script_text(element_id) else {
			return Self::default();
		};
		match serde_json::from_str::<Self>(&text) {
			Ok(config) => config.normalized(),
			Err(e) => {
				warn!("knowledge-graph: ignoring bad #{element_id}: {e}");
				Self::default()
			}
		}
	}
}

/// Text content of a `<script>` element, if the page carries one under `id`.
pub fn script_text(id: &str) -> Option<String> {
	let document = web_sys::window()?.document()?;
	let script: HtmlScriptElement = document.get_element_by_id(id)?.dyn_into().ok()?;
	script.text().ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config: GraphViewConfig = serde_json::from_str(
			r#"{"cluster_radius": 320, "display": {"dark_mode": false}, "simulation": {"force_charge": 90}}"#,
		)
		.unwrap();

		assert_eq!(config.cluster_radius, 320.0);
		assert_eq!(config.cluster_member_radius, 50.0);
		assert!(!config.display.dark_mode);
		assert!(config.display.show_labels);
		assert_eq!(config.simulation.force_charge, 90.0);
		assert_eq!(config.simulation.damping_factor, 0.9);
	}

	#[test]
	fn zoom_is_clamped_to_bounds() {
		let range = GraphViewConfig::default().zoom_range();
		assert_eq!(range.clamp(50.0), 10.0);
		assert_eq!(range.clamp(0.01), 0.1);
		assert_eq!(range.clamp(2.0), 2.0);
	}

	#[test]
	fn inverted_zoom_bounds_are_swapped() {
		let config: GraphViewConfig =
			serde_json::from_str(r#"{"min_zoom": 5, "max_zoom": 2}"#).unwrap();
		assert_eq!(config.zoom_range().clamp(10.0), 5.0);
		assert_eq!(config.zoom_range().clamp(1.0), 2.0);

		let config = config.normalized();
		assert_eq!((config.min_zoom, config.max_zoom), (2.0, 5.0));
	}

	#[test]
	fn non_positive_zoom_bounds_fall_back_to_defaults() {
		let config: GraphViewConfig =
			serde_json::from_str(r#"{"min_zoom": 0, "max_zoom": -3}"#).unwrap();
		assert_eq!(config.zoom_range(), ZoomRange { min: 0.1, max: 10.0 });
	}
}
