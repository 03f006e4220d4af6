use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::config::GraphViewConfig;
use super::driver::Point;
use super::encoder::{
	self, HoverFocus, LinkPaint, Theme, arrow_length, category_color, category_icon,
	flow_particles, icon_symbol, link_emphasized, link_width, node_display_val, node_radius,
	particle_speed,
};
use super::error::GraphError;
use super::interaction::InteractionState;
use super::projector::{BASE_NODE_VAL, RenderGraph, RenderLink};
use super::simulation::ForceGraphDriver;

/// Everything one frame is drawn from.
pub struct Frame<'a> {
	pub driver: &'a ForceGraphDriver,
	pub graph: &'a RenderGraph,
	pub state: &'a InteractionState,
	pub config: &'a GraphViewConfig,
}

impl Frame<'_> {
	fn radius_of(&self, id: &str, focus: &HoverFocus<'_>) -> f64 {
		let val = self
			.graph
			.node(id)
			.map_or(BASE_NODE_VAL, |n| node_display_val(n, focus));
		node_radius(val, self.config.node_rel_size)
	}
}

pub fn render(frame: &Frame<'_>, ctx: &CanvasRenderingContext2d) -> Result<(), GraphError> {
	let display = frame.state.display();
	let theme = Theme::for_mode(display.dark_mode);
	let focus = HoverFocus::new(frame.state, frame.graph);
	let transform = &frame.driver.transform;

	ctx.set_fill_style_str(theme.background);
	ctx.fill_rect(0.0, 0.0, frame.driver.width, frame.driver.height);
	ctx.save();
	ctx.translate(transform.x, transform.y)?;
	ctx.scale(transform.k, transform.k)?;
	let drawn = draw_links(frame, &focus, &theme, ctx)
		.and_then(|()| draw_pending_edge(frame, &focus, &theme, ctx))
		.and_then(|()| draw_nodes(frame, &focus, &theme, ctx));
	ctx.set_global_alpha(1.0);
	ctx.restore();
	drawn
}

fn draw_links(
	frame: &Frame<'_>,
	focus: &HoverFocus<'_>,
	theme: &Theme,
	ctx: &CanvasRenderingContext2d,
) -> Result<(), GraphError> {
	let display = frame.state.display();
	let dim_others = focus.hovered_node.is_some() && display.highlight_connections;

	for link in &frame.graph.links {
		let (Some(a), Some(b)) = (
			frame.driver.position(&link.source),
			frame.driver.position(&link.target),
		) else {
			continue;
		};
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = dx.hypot(dy);
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let emphasized = link_emphasized(link, focus);
		let target_radius = frame.radius_of(&link.target, focus);
		let arrow = arrow_length(display.show_arrows);

		ctx.set_global_alpha(match (emphasized, dim_others) {
			(true, _) => 1.0,
			(false, true) => 0.2,
			(false, false) => 0.75,
		});

		match encoder::link_paint_in(frame.graph, link) {
			LinkPaint::Gradient { from, to } => {
				let gradient = ctx.create_linear_gradient(a.x, a.y, b.x, b.y);
				gradient.add_color_stop(0.0, from)?;
				gradient.add_color_stop(1.0, to)?;
				#[allow(deprecated)]
				ctx.set_stroke_style(&gradient);
			}
			LinkPaint::Solid(color) => ctx.set_stroke_style_str(color),
		}
		ctx.set_line_width(link_width(link.value, emphasized));
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(
			b.x - ux * (target_radius + arrow),
			b.y - uy * (target_radius + arrow),
		);
		ctx.stroke();

		if arrow > 0.0 {
			let target_color = frame
				.graph
				.node(&link.target)
				.map_or(encoder::FALLBACK_COLOR, |n| category_color(&n.category));
			ctx.set_fill_style_str(target_color);
			let (tip_x, tip_y) = (b.x - ux * target_radius, b.y - uy * target_radius);
			let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);
			let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}

		draw_particles(frame, link, a, b, emphasized, theme, ctx)?;
	}
	Ok(())
}

fn draw_particles(
	frame: &Frame<'_>,
	link: &RenderLink,
	a: Point,
	b: Point,
	emphasized: bool,
	theme: &Theme,
	ctx: &CanvasRenderingContext2d,
) -> Result<(), GraphError> {
	let count = flow_particles(link.value, emphasized);
	let speed = particle_speed(link.value);
	let size = if emphasized { 1.8 } else { 1.2 };
	ctx.set_fill_style_str(theme.label);
	for i in 0..count {
		let t = (frame.driver.flow_time * speed + f64::from(i) / f64::from(count)).fract();
		ctx.begin_path();
		ctx.arc(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t, size, 0.0, 2.0 * PI)?;
		ctx.fill();
	}
	Ok(())
}

/// The in-progress edge from the pending source to the pointer. Drawn straight
/// from interaction state, never from the render graph.
fn draw_pending_edge(
	frame: &Frame<'_>,
	focus: &HoverFocus<'_>,
	theme: &Theme,
	ctx: &CanvasRenderingContext2d,
) -> Result<(), GraphError> {
	let Some(pending) = frame.state.pending_edge() else {
		return Ok(());
	};
	let Some(source) = frame.driver.position(pending.source) else {
		return Ok(());
	};
	let k = frame.driver.transform.k;

	ctx.set_global_alpha(1.0);
	ctx.set_stroke_style_str(theme.pending_edge);
	ctx.set_line_width(2.0 / k);
	ctx.begin_path();
	ctx.arc(
		source.x,
		source.y,
		frame.radius_of(pending.source, focus) + 3.0 / k,
		0.0,
		2.0 * PI,
	)?;
	ctx.stroke();

	let Some(pointer) = pending.pointer else {
		return Ok(());
	};
	ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0 / k),
		&JsValue::from_f64(4.0 / k),
	))?;
	ctx.begin_path();
	ctx.move_to(source.x, source.y);
	ctx.line_to(pointer.x, pointer.y);
	ctx.stroke();
	ctx.set_line_dash(&js_sys::Array::new())?;

	ctx.set_fill_style_str(theme.pending_edge);
	ctx.begin_path();
	ctx.arc(pointer.x, pointer.y, 4.0 / k, 0.0, 2.0 * PI)?;
	ctx.fill();
	Ok(())
}

fn draw_nodes(
	frame: &Frame<'_>,
	focus: &HoverFocus<'_>,
	theme: &Theme,
	ctx: &CanvasRenderingContext2d,
) -> Result<(), GraphError> {
	let display = frame.state.display();
	let k = frame.driver.transform.k;
	let source = frame.state.source_node();

	ctx.set_text_align("center");
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));

	for node in &frame.graph.nodes {
		let Some(at) = frame.driver.position(&node.id) else {
			continue;
		};
		let val = node_display_val(node, focus);
		let radius = node_radius(val, frame.config.node_rel_size);
		let dimmed = val < node.val;

		ctx.set_global_alpha(if dimmed { 0.45 } else { 1.0 });
		ctx.begin_path();
		ctx.arc(at.x, at.y, radius, 0.0, 2.0 * PI)?;
		ctx.set_fill_style_str(category_color(&node.category));
		ctx.fill();

		if focus.hovered_node == Some(node.id.as_str()) || source == Some(node.id.as_str()) {
			ctx.begin_path();
			ctx.arc(at.x, at.y, radius + 1.5 / k, 0.0, 2.0 * PI)?;
			ctx.set_stroke_style_str(theme.label);
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		if display.show_labels {
			let label = format!(
				"{} {}",
				icon_symbol(category_icon(&node.category)),
				node.name
			);
			ctx.set_fill_style_str(if dimmed { theme.dimmed_label } else { theme.label });
			ctx.fill_text(&label, at.x, at.y + radius + 10.0 / k.max(0.5))?;
		}
	}
	Ok(())
}
