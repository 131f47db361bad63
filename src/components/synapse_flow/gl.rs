use log::{debug, warn};
use wasm_bindgen::JsCast;
use web_sys::{
	HtmlCanvasElement, WebGlContextAttributes, WebGlProgram, WebGlRenderingContext as Gl,
	WebGlShader, WebGlUniformLocation,
};

use super::error::{Result, SynapseError};
use super::shaders;

/// Acquires a WebGL 1 context, falling back to `experimental-webgl`.
pub fn acquire_context(canvas: &HtmlCanvasElement) -> Result<Gl> {
	let attributes = WebGlContextAttributes::new();
	attributes.set_antialias(true);
	attributes.set_preserve_drawing_buffer(false);

	for kind in ["webgl", "experimental-webgl"] {
		let context = canvas
			.get_context_with_context_options(kind, &attributes)
			.map_err(SynapseError::from_js)?;
		if let Some(gl) = context.and_then(|c| c.dyn_into::<Gl>().ok()) {
			debug!("Acquired {kind} context");
			return Ok(gl);
		}
	}
	Err(SynapseError::WebGlUnavailable)
}

/// Discards pending errors so later checks only see new ones.
pub fn drain_errors(gl: &Gl) {
	while gl.get_error() != Gl::NO_ERROR {}
}

/// Logs a warning if the context has a pending error.
pub fn check_errors(gl: &Gl, when: &str) {
	let error = gl.get_error();
	if error != Gl::NO_ERROR {
		warn!("GL error 0x{error:04x} after {when}");
	}
}

fn compile_shader(
	gl: &Gl,
	program: &'static str,
	kind: u32,
	source: &str,
) -> Result<WebGlShader> {
	let stage = if kind == Gl::VERTEX_SHADER {
		"vertex"
	} else {
		"fragment"
	};
	let shader = gl.create_shader(kind).ok_or_else(|| SynapseError::ShaderCompile {
		program,
		stage,
		log: "createShader returned null".into(),
	})?;
	gl.shader_source(&shader, source);
	gl.compile_shader(&shader);

	if gl
		.get_shader_parameter(&shader, Gl::COMPILE_STATUS)
		.as_bool()
		.unwrap_or(false)
	{
		Ok(shader)
	} else {
		let log = gl.get_shader_info_log(&shader).unwrap_or_default();
		gl.delete_shader(Some(&shader));
		Err(SynapseError::ShaderCompile {
			program,
			stage,
			log,
		})
	}
}

/// Compiles both stages and links them. Shaders are released once linked.
fn build_program(
	gl: &Gl,
	name: &'static str,
	vertex_source: &str,
	fragment_source: &str,
) -> Result<WebGlProgram> {
	let vertex = compile_shader(gl, name, Gl::VERTEX_SHADER, vertex_source)?;
	let fragment = match compile_shader(gl, name, Gl::FRAGMENT_SHADER, fragment_source) {
		Ok(shader) => shader,
		Err(err) => {
			gl.delete_shader(Some(&vertex));
			return Err(err);
		}
	};

	let release_shaders = |program: Option<&WebGlProgram>| {
		if let Some(program) = program {
			gl.detach_shader(program, &vertex);
			gl.detach_shader(program, &fragment);
		}
		gl.delete_shader(Some(&vertex));
		gl.delete_shader(Some(&fragment));
	};

	let Some(program) = gl.create_program() else {
		release_shaders(None);
		return Err(SynapseError::ProgramLink {
			program: name,
			log: "createProgram returned null".into(),
		});
	};
	gl.attach_shader(&program, &vertex);
	gl.attach_shader(&program, &fragment);
	gl.link_program(&program);

	let linked = gl
		.get_program_parameter(&program, Gl::LINK_STATUS)
		.as_bool()
		.unwrap_or(false);
	release_shaders(Some(&program));
	if linked {
		Ok(program)
	} else {
		let log = gl.get_program_info_log(&program).unwrap_or_default();
		gl.delete_program(Some(&program));
		Err(SynapseError::ProgramLink { program: name, log })
	}
}

fn attribute(gl: &Gl, program: &WebGlProgram, owner: &'static str, name: &'static str) -> Result<u32> {
	u32::try_from(gl.get_attrib_location(program, name))
		.map_err(|_| SynapseError::MissingAttribute { program: owner, name })
}

fn uniform(
	gl: &Gl,
	program: &WebGlProgram,
	owner: &'static str,
	name: &'static str,
) -> Result<WebGlUniformLocation> {
	gl.get_uniform_location(program, name)
		.ok_or(SynapseError::MissingUniform { program: owner, name })
}

/// Flat-colored line program.
pub struct LineProgram {
	pub program: WebGlProgram,
	pub a_pos: u32,
	pub u_color: WebGlUniformLocation,
}

impl LineProgram {
	const NAME: &'static str = "line";

	pub fn new(gl: &Gl) -> Result<Self> {
		let program = build_program(gl, Self::NAME, shaders::LINE_VERTEX, shaders::LINE_FRAGMENT)?;
		let locations = attribute(gl, &program, Self::NAME, "a_pos")
			.and_then(|a_pos| Ok((a_pos, uniform(gl, &program, Self::NAME, "u_color")?)));
		match locations {
			Ok((a_pos, u_color)) => Ok(Self {
				program,
				a_pos,
				u_color,
			}),
			Err(err) => {
				gl.delete_program(Some(&program));
				Err(err)
			}
		}
	}
}

/// Glowing point-sprite program used for nodes and pulses.
pub struct PointProgram {
	pub program: WebGlProgram,
	pub a_vertex_data: u32,
	pub u_point_size: WebGlUniformLocation,
}

impl PointProgram {
	const NAME: &'static str = "point";

	pub fn new(gl: &Gl) -> Result<Self> {
		let program =
			build_program(gl, Self::NAME, shaders::POINT_VERTEX, shaders::POINT_FRAGMENT)?;
		let locations = attribute(gl, &program, Self::NAME, "a_vertex_data").and_then(
			|a_vertex_data| Ok((a_vertex_data, uniform(gl, &program, Self::NAME, "u_point_size")?)),
		);
		match locations {
			Ok((a_vertex_data, u_point_size)) => Ok(Self {
				program,
				a_vertex_data,
				u_point_size,
			}),
			Err(err) => {
				gl.delete_program(Some(&program));
				Err(err)
			}
		}
	}
}
