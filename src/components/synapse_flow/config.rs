use super::error::{Result, SynapseError};

/// Tunables for the network background.
///
/// All distances are in the normalized `[-1, 1]` clip space the nodes live in.
/// Probabilities are per node, per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SynapseConfig {
	/// Number of nodes generated at startup.
	pub node_count: usize,
	/// Nodes closer than this are candidates for a static connection.
	pub connection_radius: f32,
	/// Upper bound on the number of connections of any node.
	pub max_degree: usize,
	/// Maximum number of pulses travelling at the same time.
	pub max_pulses: usize,
	/// Pulse travel speed in units per second.
	pub pulse_speed: f32,
	/// Spontaneous fire chance.
	pub base_fire_probability: f32,
	/// Added fire chance for a node that received a pulse this frame.
	pub stimulated_fire_boost: f32,
	/// Pointer influence radius.
	pub pointer_influence_radius: f32,
	/// Added fire chance for a node right under the pointer, falling off linearly to the radius.
	pub pointer_fire_boost: f32,
	/// Brightness floor every node decays toward.
	pub node_base_brightness: f32,
	/// Brightness ceiling applied when a boost is added.
	pub node_max_brightness: f32,
	/// Multiplicative brightness decay applied every frame.
	pub node_brightness_decay: f32,
	/// Brightness added to a node when a pulse arrives.
	pub node_receive_boost: f32,
	/// Brightness added to a node when it fires.
	pub node_fire_boost: f32,
	/// Brightness of a travelling pulse.
	pub pulse_brightness: f32,
	/// Initial velocity components are drawn from `[-spread / 2, spread / 2)`.
	pub initial_velocity_spread: f32,
	/// RGBA of the faint static edges.
	pub edge_color: [f32; 4],
	/// RGBA of edges carrying a pulse.
	pub active_edge_color: [f32; 4],
	/// Node sprite size in pixels.
	pub node_point_size: f32,
	/// Pulse sprite size in pixels.
	pub pulse_point_size: f32,
	/// Quiet period before a burst of window resizes is applied.
	pub resize_debounce_ms: i32,
	/// Longest elapsed time a single frame may simulate, in seconds.
	pub max_frame_delta: f32,
}

impl Default for SynapseConfig {
	fn default() -> Self {
		Self {
			node_count: 25,
			connection_radius: 0.5,
			max_degree: 7,
			max_pulses: 50,
			pulse_speed: 0.6,
			base_fire_probability: 0.001,
			stimulated_fire_boost: 0.8,
			pointer_influence_radius: 0.3,
			pointer_fire_boost: 0.02,
			node_base_brightness: 0.15,
			node_max_brightness: 2.0,
			node_brightness_decay: 0.94,
			node_receive_boost: 1.5,
			node_fire_boost: 1.0,
			pulse_brightness: 1.8,
			initial_velocity_spread: 0.0005,
			edge_color: [0.15, 0.15, 0.15, 0.1],
			active_edge_color: [0.9, 0.9, 0.9, 0.7],
			node_point_size: 4.0,
			pulse_point_size: 5.0,
			resize_debounce_ms: 100,
			max_frame_delta: 0.25,
		}
	}
}

impl SynapseConfig {
	/// Rejects values the simulation cannot run with.
	pub fn validate(&self) -> Result<()> {
		let non_negative = [
			("connection_radius", self.connection_radius),
			("pulse_speed", self.pulse_speed),
			("base_fire_probability", self.base_fire_probability),
			("stimulated_fire_boost", self.stimulated_fire_boost),
			("pointer_fire_boost", self.pointer_fire_boost),
			("node_base_brightness", self.node_base_brightness),
			("node_receive_boost", self.node_receive_boost),
			("node_fire_boost", self.node_fire_boost),
			("pulse_brightness", self.pulse_brightness),
			("initial_velocity_spread", self.initial_velocity_spread),
			("node_point_size", self.node_point_size),
			("pulse_point_size", self.pulse_point_size),
			("max_frame_delta", self.max_frame_delta),
		];
		for (name, value) in non_negative {
			if !value.is_finite() || value < 0.0 {
				return Err(SynapseError::InvalidConfig(format!(
					"{name} must be a finite, non-negative number (got {value})"
				)));
			}
		}
		if !(self.pointer_influence_radius.is_finite() && self.pointer_influence_radius > 0.0) {
			return Err(SynapseError::InvalidConfig(format!(
				"pointer_influence_radius must be positive (got {})",
				self.pointer_influence_radius
			)));
		}
		if !(self.node_brightness_decay > 0.0 && self.node_brightness_decay <= 1.0) {
			return Err(SynapseError::InvalidConfig(format!(
				"node_brightness_decay must be in (0, 1] (got {})",
				self.node_brightness_decay
			)));
		}
		if !self.node_max_brightness.is_finite()
			|| self.node_max_brightness < self.node_base_brightness
		{
			return Err(SynapseError::InvalidConfig(format!(
				"node_max_brightness ({}) must not be below node_base_brightness ({})",
				self.node_max_brightness, self.node_base_brightness
			)));
		}
		if self.resize_debounce_ms < 0 {
			return Err(SynapseError::InvalidConfig(
				"resize_debounce_ms must not be negative".into(),
			));
		}
		Ok(())
	}

	pub(crate) fn pointer_influence_radius_sq(&self) -> f32 {
		self.pointer_influence_radius * self.pointer_influence_radius
	}
}
