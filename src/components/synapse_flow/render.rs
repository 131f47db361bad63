use js_sys::Float32Array;
use log::{debug, info};
use web_sys::{WebGlBuffer, WebGlRenderingContext as Gl, WebGlUniformLocation};

use super::config::SynapseConfig;
use super::error::{Result, SynapseError};
use super::gl::{LineProgram, PointProgram, check_errors, drain_errors};
use super::graph::Network;
use super::types::Pulse;
use super::vertices::{FrameVertices, LINE_COMPONENTS, POINT_COMPONENTS};

const FLOAT_BYTES: usize = std::mem::size_of::<f32>();

struct Buffers {
	edges: WebGlBuffer,
	active_edges: WebGlBuffer,
	nodes: WebGlBuffer,
	pulses: WebGlBuffer,
}

impl Buffers {
	fn delete(&self, gl: &Gl) {
		for buffer in [&self.edges, &self.active_edges, &self.nodes, &self.pulses] {
			gl.delete_buffer(Some(buffer));
		}
	}
}

#[derive(Clone, Copy, Debug)]
struct Style {
	edge_color: [f32; 4],
	active_edge_color: [f32; 4],
	node_point_size: f32,
	pulse_point_size: f32,
}

/// GPU side of the background: two programs, four vertex buffers.
///
/// Reads simulation state, never mutates it. Rebuilt from scratch after a
/// context restore.
pub struct Renderer {
	gl: Gl,
	line: LineProgram,
	point: PointProgram,
	buffers: Buffers,
	vertices: FrameVertices,
	style: Style,
}

impl Renderer {
	pub fn new(gl: &Gl, network: &Network, config: &SynapseConfig) -> Result<Self> {
		drain_errors(gl);

		let line = LineProgram::new(gl)?;
		let point = match PointProgram::new(gl) {
			Ok(point) => point,
			Err(err) => {
				gl.delete_program(Some(&line.program));
				return Err(err);
			}
		};
		info!("Programs initialized");

		let node_count = network.nodes.len();
		let edge_count = network.edges.len();
		let mut vertices = FrameVertices::with_capacity(node_count, edge_count, config.max_pulses);
		vertices.fill(network, &[]);

		let line_bytes = edge_count * 2 * LINE_COMPONENTS * FLOAT_BYTES;
		let buffers = (|| {
			Ok::<_, SynapseError>(Buffers {
				edges: allocate(gl, "edge", line_bytes)?,
				active_edges: allocate(gl, "active edge", line_bytes)?,
				nodes: allocate(gl, "node", node_count * POINT_COMPONENTS * FLOAT_BYTES)?,
				pulses: allocate(
					gl,
					"pulse",
					config.max_pulses * POINT_COMPONENTS * FLOAT_BYTES,
				)?,
			})
		})();
		let buffers = match buffers {
			Ok(buffers) => buffers,
			Err(err) => {
				gl.delete_program(Some(&line.program));
				gl.delete_program(Some(&point.program));
				return Err(err);
			}
		};
		upload(gl, &buffers.edges, &vertices.edges);
		upload(gl, &buffers.nodes, &vertices.nodes);
		debug!("Buffers created");

		check_errors(gl, "initialization");

		Ok(Self {
			gl: gl.clone(),
			line,
			point,
			buffers,
			vertices,
			style: Style {
				edge_color: config.edge_color,
				active_edge_color: config.active_edge_color,
				node_point_size: config.node_point_size,
				pulse_point_size: config.pulse_point_size,
			},
		})
	}

	/// Uploads the current state and draws edges, active edges, nodes, then pulses.
	pub fn draw(&mut self, network: &Network, pulses: &[Pulse]) {
		self.vertices.fill(network, pulses);
		let gl = &self.gl;
		let vertices = &self.vertices;

		upload(gl, &self.buffers.edges, &vertices.edges);
		upload(gl, &self.buffers.active_edges, &vertices.active_edges);
		upload(gl, &self.buffers.nodes, &vertices.nodes);
		upload(gl, &self.buffers.pulses, &vertices.pulses);

		gl.viewport(0, 0, gl.drawing_buffer_width(), gl.drawing_buffer_height());
		gl.clear_color(0.0, 0.0, 0.0, 0.0);
		gl.clear(Gl::COLOR_BUFFER_BIT);
		gl.enable(Gl::BLEND);
		gl.blend_func(Gl::SRC_ALPHA, Gl::ONE);

		gl.use_program(Some(&self.line.program));
		gl.enable_vertex_attrib_array(self.line.a_pos);
		draw_lines(
			gl,
			&self.line,
			&self.buffers.edges,
			self.style.edge_color,
			vertices.edge_vertex_count(),
		);
		draw_lines(
			gl,
			&self.line,
			&self.buffers.active_edges,
			self.style.active_edge_color,
			vertices.active_edge_vertex_count(),
		);
		gl.disable_vertex_attrib_array(self.line.a_pos);

		gl.use_program(Some(&self.point.program));
		gl.enable_vertex_attrib_array(self.point.a_vertex_data);
		draw_points(
			gl,
			&self.point,
			&self.buffers.nodes,
			self.style.node_point_size,
			vertices.node_count(),
		);
		draw_points(
			gl,
			&self.point,
			&self.buffers.pulses,
			self.style.pulse_point_size,
			vertices.pulse_count(),
		);
		gl.disable_vertex_attrib_array(self.point.a_vertex_data);

		gl.disable(Gl::BLEND);
	}

	/// Deletes programs and buffers. Harmless on a lost context.
	pub fn dispose(self) {
		let gl = &self.gl;
		self.buffers.delete(gl);
		gl.delete_program(Some(&self.line.program));
		gl.delete_program(Some(&self.point.program));
		debug!("Renderer disposed");
	}
}

fn allocate(gl: &Gl, kind: &'static str, bytes: usize) -> Result<WebGlBuffer> {
	let buffer = gl
		.create_buffer()
		.ok_or(SynapseError::BufferAllocation(kind))?;
	gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
	gl.buffer_data_with_i32(Gl::ARRAY_BUFFER, bytes as i32, Gl::DYNAMIC_DRAW);
	Ok(buffer)
}

fn upload(gl: &Gl, buffer: &WebGlBuffer, data: &[f32]) {
	if data.is_empty() {
		return;
	}
	gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
	gl.buffer_sub_data_with_i32_and_array_buffer_view(
		Gl::ARRAY_BUFFER,
		0,
		&Float32Array::from(data),
	);
}

fn draw_lines(gl: &Gl, program: &LineProgram, buffer: &WebGlBuffer, color: [f32; 4], count: i32) {
	if count == 0 {
		return;
	}
	set_color(gl, &program.u_color, color);
	gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
	gl.vertex_attrib_pointer_with_i32(program.a_pos, LINE_COMPONENTS as i32, Gl::FLOAT, false, 0, 0);
	gl.draw_arrays(Gl::LINES, 0, count);
}

fn draw_points(gl: &Gl, program: &PointProgram, buffer: &WebGlBuffer, size: f32, count: i32) {
	if count == 0 {
		return;
	}
	gl.uniform1f(Some(&program.u_point_size), size);
	gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buffer));
	gl.vertex_attrib_pointer_with_i32(
		program.a_vertex_data,
		POINT_COMPONENTS as i32,
		Gl::FLOAT,
		false,
		0,
		0,
	);
	gl.draw_arrays(Gl::POINTS, 0, count);
}

fn set_color(gl: &Gl, location: &WebGlUniformLocation, [r, g, b, a]: [f32; 4]) {
	gl.uniform4f(Some(location), r, g, b, a);
}
