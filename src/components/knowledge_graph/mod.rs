//! Interactive knowledge graph view.
//!
//! Records are projected into a render graph, styled by the encoder and drawn
//! on a canvas driven by a force simulation. Hover, connection mode and camera
//! state live in an explicit state machine.

mod component;
mod config;
mod controls;
mod driver;
mod encoder;
mod error;
mod interaction;
mod layout;
mod overlay;
mod projector;
mod render;
mod session;
mod simulation;
mod types;

pub use component::KnowledgeGraphView;
pub use config::{DisplayToggles, GraphViewConfig, SimulationConfig, script_text};
pub use error::GraphError;
pub use layout::GraphLayout;
pub use overlay::GraphPlaceholder;
pub use projector::{GraphProjector, RenderGraph, RenderLink, RenderNode, project};
pub use types::{Category, Connection, GraphInput, KnowledgeNode, RelationshipType};
