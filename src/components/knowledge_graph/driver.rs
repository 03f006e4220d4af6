//! The seam between the interaction logic and whatever draws the graph.

use std::collections::HashMap;

/// A position in graph (world) coordinates unless stated otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Optional features a driver may or may not provide. Resolved once when the
/// driver is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverCapabilities {
	/// The driver can map screen pixels to graph coordinates.
	pub coordinate_mapping: bool,
}

/// Positions a driver should apply when switching layouts.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutPlan {
	/// Free simulation: all pins released, simulation reheated.
	Force,
	/// Every listed node pinned at the given coordinates.
	Pinned(HashMap<String, Point>),
}

/// Camera, layout and redraw operations on a rendered graph.
pub trait GraphCanvasDriver {
	fn capabilities(&self) -> DriverCapabilities;

	/// Clear every pinned coordinate, then apply `plan`.
	fn set_layout(&mut self, plan: &LayoutPlan);

	/// Fit the camera to the bounds of all nodes.
	fn focus_all(&mut self);

	/// Move the camera by a screen-space offset.
	fn pan(&mut self, dx: f64, dy: f64);

	/// Multiply the zoom level by `factor` around the viewport centre and
	/// return the resulting level after clamping.
	fn zoom(&mut self, factor: f64) -> f64;

	/// Request a redraw / simulation reheat.
	fn refresh(&mut self);

	/// Map a screen point into graph coordinates. Only meaningful when
	/// [`DriverCapabilities::coordinate_mapping`] is set.
	fn screen_to_graph(&self, _screen: Point) -> Option<Point> {
		None
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use super::*;

	/// Driver double that records every call.
	#[derive(Debug, Default)]
	pub struct RecordingDriver {
		pub calls: Vec<String>,
		pub last_plan: Option<LayoutPlan>,
		pub zoom: f64,
		pub mapping: bool,
	}

	impl RecordingDriver {
		pub fn new() -> Self {
			Self {
				zoom: 1.0,
				..Self::default()
			}
		}
	}

	impl GraphCanvasDriver for RecordingDriver {
		fn capabilities(&self) -> DriverCapabilities {
			DriverCapabilities {
				coordinate_mapping: self.mapping,
			}
		}

		fn set_layout(&mut self, plan: &LayoutPlan) {
			self.calls.push("set_layout".into());
			self.last_plan = Some(plan.clone());
		}

		fn focus_all(&mut self) {
			self.calls.push("focus_all".into());
		}

		fn pan(&mut self, dx: f64, dy: f64) {
			self.calls.push(format!("pan({dx},{dy})"));
		}

		fn zoom(&mut self, factor: f64) -> f64 {
			self.calls.push("zoom".into());
			self.zoom = (self.zoom * factor).clamp(0.1, 10.0);
			self.zoom
		}

		fn refresh(&mut self) {
			self.calls.push("refresh".into());
		}

		fn screen_to_graph(&self, screen: Point) -> Option<Point> {
			self.mapping.then(|| Point::new(screen.x / 2.0, screen.y / 2.0))
		}
	}
}
