mod clock;
mod component;
mod config;
mod error;
mod gl;
mod graph;
mod lifecycle;
mod render;
mod shaders;
mod simulation;
mod types;
mod vertices;
mod viewport;

pub use component::SynapseFlowCanvas;
pub use config::SynapseConfig;
pub use error::SynapseError;
pub use lifecycle::SynapseFlow;
