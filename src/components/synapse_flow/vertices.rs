use super::graph::Network;
use super::types::Pulse;

/// Floats per line vertex: x, y.
pub const LINE_COMPONENTS: usize = 2;
/// Floats per point vertex: x, y, brightness.
pub const POINT_COMPONENTS: usize = 3;

/// Flat vertex arrays mirroring the simulation for one frame.
///
/// Capacities are fixed when the network is built; only the filled prefix of
/// each array is uploaded and drawn.
#[derive(Clone, Debug, Default)]
pub struct FrameVertices {
	pub edges: Vec<f32>,
	pub active_edges: Vec<f32>,
	pub nodes: Vec<f32>,
	pub pulses: Vec<f32>,
	highlighted: Vec<bool>,
}

impl FrameVertices {
	pub fn with_capacity(node_count: usize, edge_count: usize, max_pulses: usize) -> Self {
		Self {
			edges: Vec::with_capacity(edge_count * 2 * LINE_COMPONENTS),
			active_edges: Vec::with_capacity(edge_count * 2 * LINE_COMPONENTS),
			nodes: Vec::with_capacity(node_count * POINT_COMPONENTS),
			pulses: Vec::with_capacity(max_pulses * POINT_COMPONENTS),
			highlighted: vec![false; edge_count],
		}
	}

	/// Rebuilds every array from the current network and pulses.
	///
	/// An edge carrying several pulses is highlighted once. Pulses whose edge
	/// cannot be resolved are skipped.
	pub fn fill(&mut self, network: &Network, pulses: &[Pulse]) {
		self.edges.clear();
		for edge in 0..network.edges.len() {
			if let Some((a, b)) = network.endpoints(edge) {
				self.edges.extend_from_slice(&[a.x, a.y, b.x, b.y]);
			}
		}

		self.nodes.clear();
		for node in &network.nodes {
			self.nodes
				.extend_from_slice(&[node.pos.x, node.pos.y, node.brightness]);
		}

		self.pulses.clear();
		self.active_edges.clear();
		self.highlighted.clear();
		self.highlighted.resize(network.edges.len(), false);
		for pulse in pulses {
			let (Some(pos), Some((a, b))) =
				(network.pulse_position(pulse), network.endpoints(pulse.edge))
			else {
				continue;
			};
			self.pulses
				.extend_from_slice(&[pos.x, pos.y, pulse.brightness]);
			if !self.highlighted[pulse.edge] {
				self.highlighted[pulse.edge] = true;
				self.active_edges.extend_from_slice(&[a.x, a.y, b.x, b.y]);
			}
		}
	}

	pub fn edge_vertex_count(&self) -> i32 {
		(self.edges.len() / LINE_COMPONENTS) as i32
	}

	pub fn active_edge_vertex_count(&self) -> i32 {
		(self.active_edges.len() / LINE_COMPONENTS) as i32
	}

	pub fn node_count(&self) -> i32 {
		(self.nodes.len() / POINT_COMPONENTS) as i32
	}

	pub fn pulse_count(&self) -> i32 {
		(self.pulses.len() / POINT_COMPONENTS) as i32
	}
}
