use thiserror::Error;
use wasm_bindgen::JsValue;

/// Result alias for the network background.
pub type Result<T> = std::result::Result<T, SynapseError>;

/// Failures that keep the background from starting.
///
/// Context loss is not represented here: it is recovered through the restore
/// path. Inconsistent pulse references are dropped silently by the simulation.
#[derive(Debug, Error)]
pub enum SynapseError {
	/// No global `window`.
	#[error("no window available")]
	NoWindow,

	/// The window has no document.
	#[error("no document available")]
	NoDocument,

	/// No element with the requested id.
	#[error("canvas \"{0}\" not found")]
	CanvasNotFound(String),

	/// The element with the requested id is not a `<canvas>`.
	#[error("element \"{0}\" is not a canvas")]
	NotACanvas(String),

	/// Neither `webgl` nor `experimental-webgl` could be acquired.
	#[error("WebGL not supported")]
	WebGlUnavailable,

	/// A shader failed to compile.
	#[error("{program} {stage} shader failed to compile: {log}")]
	ShaderCompile {
		/// Program the shader belongs to.
		program: &'static str,
		/// `vertex` or `fragment`.
		stage: &'static str,
		/// Driver info log.
		log: String,
	},

	/// A program failed to link.
	#[error("{program} program failed to link: {log}")]
	ProgramLink {
		/// Program name.
		program: &'static str,
		/// Driver info log.
		log: String,
	},

	/// An attribute is missing or inactive in a linked program.
	#[error("attribute \"{name}\" not found in {program} program")]
	MissingAttribute {
		/// Program name.
		program: &'static str,
		/// Attribute name.
		name: &'static str,
	},

	/// A uniform is missing or inactive in a linked program.
	#[error("uniform \"{name}\" not found in {program} program")]
	MissingUniform {
		/// Program name.
		program: &'static str,
		/// Uniform name.
		name: &'static str,
	},

	/// `createBuffer` returned null.
	#[error("failed to create {0} buffer")]
	BufferAllocation(&'static str),

	/// Rejected configuration.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// A DOM call threw.
	#[error("javascript error: {0}")]
	Js(String),
}

impl SynapseError {
	pub(crate) fn from_js(value: JsValue) -> Self {
		Self::Js(
			value
				.as_string()
				.unwrap_or_else(|| format!("{value:?}")),
		)
	}
}
