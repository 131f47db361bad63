use glam::Vec2;
use log::debug;
use rand::Rng;

use super::config::SynapseConfig;
use super::graph::Network;
use super::types::{Direction, Pulse};

/// Velocities are tuned per frame at this rate; positions advance by `velocity * dt * REFERENCE_FPS`.
pub const REFERENCE_FPS: f32 = 60.0;

/// Nodes leaving `[-WRAP_BOUND, WRAP_BOUND]` reappear on the opposite side.
pub const WRAP_BOUND: f32 = 1.1;

/// Edges shorter than this cannot carry a pulse.
pub const MIN_EDGE_LENGTH: f32 = 0.001;

/// Why a pulse was dropped without arriving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidPulse {
	/// Edge index out of range, or an endpoint index out of range.
	MissingEdge,
	/// Endpoints closer than [`MIN_EDGE_LENGTH`].
	DegenerateEdge,
}

/// Outcome of moving one pulse forward by one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PulseStep {
	Traveling,
	Arrived { destination: usize },
	Invalid(InvalidPulse),
}

/// Outcome of asking a node to fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireOutcome {
	Fired { edge: usize },
	AtCapacity,
	NoConnections,
	/// The picked neighbour has no edge back to the node.
	EdgeNotFound,
}

/// Pulses in flight plus the per-frame bookkeeping around them.
#[derive(Clone, Debug, Default)]
pub struct Simulation {
	pub pulses: Vec<Pulse>,
	received: Vec<bool>,
}

impl Simulation {
	pub fn new() -> Self {
		Self::default()
	}

	/// One frame: move nodes, move pulses, then fire.
	pub fn step(
		&mut self,
		network: &mut Network,
		config: &SynapseConfig,
		dt: f32,
		pointer: Vec2,
		rng: &mut impl Rng,
	) {
		advance_nodes(network, config, dt);
		self.advance_pulses(network, config, dt);
		self.fire(network, config, pointer, rng);
	}

	/// Moves every pulse along its edge and resolves arrivals.
	///
	/// Destinations of pulses that arrived are remembered until the next call
	/// and raise those nodes' fire chance in [`Simulation::fire`].
	pub fn advance_pulses(&mut self, network: &mut Network, config: &SynapseConfig, dt: f32) {
		self.received.clear();
		self.received.resize(network.nodes.len(), false);

		let received = &mut self.received;
		self.pulses.retain_mut(|pulse| {
			match advance_pulse(network, config, pulse, dt) {
				PulseStep::Traveling => true,
				PulseStep::Arrived { destination } => {
					network.nodes[destination]
						.boost(config.node_receive_boost, config.node_max_brightness);
					received[destination] = true;
					false
				}
				PulseStep::Invalid(reason) => {
					debug!("Dropping pulse on edge {}: {reason:?}", pulse.edge);
					false
				}
			}
		});
	}

	/// Rolls every node's fire chance and emits pulses while under the cap.
	pub fn fire(
		&mut self,
		network: &mut Network,
		config: &SynapseConfig,
		pointer: Vec2,
		rng: &mut impl Rng,
	) {
		for index in 0..network.nodes.len() {
			let node = &network.nodes[index];
			let stimulated = self.received.get(index).copied().unwrap_or(false);
			let probability = fire_probability(config, node.pos, pointer, stimulated);

			if self.pulses.len() < config.max_pulses
				&& node.degree() > 0
				&& rng.gen_range(0.0..1.0) < probability
			{
				self.fire_from_node(network, config, index, rng);
			}
		}
	}

	/// Sends a pulse from `index` along a random one of its connections.
	pub fn fire_from_node(
		&mut self,
		network: &mut Network,
		config: &SynapseConfig,
		index: usize,
		rng: &mut impl Rng,
	) -> FireOutcome {
		if self.pulses.len() >= config.max_pulses {
			return FireOutcome::AtCapacity;
		}
		let Some(node) = network.nodes.get(index) else {
			return FireOutcome::NoConnections;
		};
		if node.connections.is_empty() {
			return FireOutcome::NoConnections;
		}

		let target = node.connections[rng.gen_range(0..node.connections.len())];
		let Some(edge) = network.find_edge(index, target) else {
			return FireOutcome::EdgeNotFound;
		};
		let direction = if network.edges[edge].a == index {
			Direction::Forward
		} else {
			Direction::Reverse
		};

		network.nodes[index].boost(config.node_fire_boost, config.node_max_brightness);
		self.pulses.push(Pulse {
			edge,
			direction,
			progress: 0.0,
			brightness: config.pulse_brightness,
		});
		FireOutcome::Fired { edge }
	}
}

/// Per-frame chance that a node at `pos` fires.
///
/// Base rate, plus a pointer boost falling off linearly to zero at the
/// influence radius, plus the stimulation boost for nodes that just received
/// a pulse.
pub fn fire_probability(config: &SynapseConfig, pos: Vec2, pointer: Vec2, stimulated: bool) -> f32 {
	let mut probability = config.base_fire_probability;
	let pointer_dist_sq = pos.distance_squared(pointer);
	if pointer_dist_sq < config.pointer_influence_radius_sq() {
		probability +=
			config.pointer_fire_boost * (1.0 - pointer_dist_sq.sqrt() / config.pointer_influence_radius);
	}
	if stimulated {
		probability += config.stimulated_fire_boost;
	}
	probability
}

/// Drifts nodes with toroidal wrap and decays their brightness toward the floor.
pub fn advance_nodes(network: &mut Network, config: &SynapseConfig, dt: f32) {
	for node in &mut network.nodes {
		node.pos += node.velocity * dt * REFERENCE_FPS;
		node.pos.x = wrap(node.pos.x);
		node.pos.y = wrap(node.pos.y);
		node.brightness =
			(node.brightness * config.node_brightness_decay).max(config.node_base_brightness);
	}
}

fn wrap(v: f32) -> f32 {
	if v > WRAP_BOUND {
		-WRAP_BOUND
	} else if v < -WRAP_BOUND {
		WRAP_BOUND
	} else {
		v
	}
}

/// Moves one pulse by `pulse_speed * dt` along its edge's current length.
pub fn advance_pulse(
	network: &Network,
	config: &SynapseConfig,
	pulse: &mut Pulse,
	dt: f32,
) -> PulseStep {
	let Some(edge) = network.edges.get(pulse.edge) else {
		return PulseStep::Invalid(InvalidPulse::MissingEdge);
	};
	let Some((a, b)) = network.endpoints(pulse.edge) else {
		return PulseStep::Invalid(InvalidPulse::MissingEdge);
	};
	let length = a.distance(b);
	if length < MIN_EDGE_LENGTH {
		return PulseStep::Invalid(InvalidPulse::DegenerateEdge);
	}

	pulse.progress += config.pulse_speed * dt / length;
	if pulse.progress >= 1.0 {
		PulseStep::Arrived {
			destination: pulse.direction.destination(edge),
		}
	} else {
		pulse.brightness = config.pulse_brightness;
		PulseStep::Traveling
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::components::synapse_flow::types::Node;

	const EPS: f32 = 1e-5;

	fn quiet_config() -> SynapseConfig {
		SynapseConfig {
			base_fire_probability: 0.0,
			stimulated_fire_boost: 0.0,
			pointer_fire_boost: 0.0,
			..Default::default()
		}
	}

	fn segment(length: f32) -> Network {
		let mut network = Network::new(vec![
			Node::new(Vec2::new(0.0, 0.0), Vec2::ZERO, 0.15),
			Node::new(Vec2::new(length, 0.0), Vec2::ZERO, 0.15),
		]);
		network.connect(0, 1);
		network
	}

	fn pulse_on(edge: usize, direction: Direction) -> Pulse {
		Pulse {
			edge,
			direction,
			progress: 0.0,
			brightness: 0.0,
		}
	}

	#[test]
	fn pulse_keeps_travelling_below_full_progress() {
		let config = quiet_config();
		let mut network = segment(0.4);
		let mut sim = Simulation::new();
		sim.pulses.push(pulse_on(0, Direction::Forward));

		sim.advance_pulses(&mut network, &config, 0.5);

		assert_eq!(sim.pulses.len(), 1);
		assert!((sim.pulses[0].progress - 0.75).abs() < EPS);
		assert_eq!(sim.pulses[0].brightness, config.pulse_brightness);
	}

	#[test]
	fn arriving_pulse_is_removed_and_boosts_destination() {
		let config = quiet_config();
		let mut network = segment(0.4);
		let mut sim = Simulation::new();
		sim.pulses.push(pulse_on(0, Direction::Forward));

		sim.advance_pulses(&mut network, &config, 1.0);

		assert!(sim.pulses.is_empty());
		assert!((network.nodes[1].brightness - 1.65).abs() < EPS);
		assert_eq!(network.nodes[0].brightness, 0.15);
		assert!(sim.received[1]);
		assert!(!sim.received[0]);
	}

	#[test]
	fn reverse_pulse_arrives_at_first_endpoint() {
		let config = quiet_config();
		let mut network = segment(0.4);
		let mut pulse = pulse_on(0, Direction::Reverse);
		assert_eq!(
			advance_pulse(&network, &config, &mut pulse, 1.0),
			PulseStep::Arrived { destination: 0 }
		);
		network.nodes[0].brightness = 1.9;
		let mut sim = Simulation::new();
		sim.pulses.push(pulse_on(0, Direction::Reverse));
		sim.advance_pulses(&mut network, &config, 1.0);
		assert_eq!(network.nodes[0].brightness, config.node_max_brightness);
	}

	#[test]
	fn invalid_pulses_are_dropped() {
		let config = quiet_config();
		let mut network = segment(0.0005);
		let mut missing = pulse_on(3, Direction::Forward);
		assert_eq!(
			advance_pulse(&network, &config, &mut missing, 0.1),
			PulseStep::Invalid(InvalidPulse::MissingEdge)
		);
		let mut short = pulse_on(0, Direction::Forward);
		assert_eq!(
			advance_pulse(&network, &config, &mut short, 0.1),
			PulseStep::Invalid(InvalidPulse::DegenerateEdge)
		);

		let mut sim = Simulation::new();
		sim.pulses.push(missing);
		sim.pulses.push(short);
		sim.advance_pulses(&mut network, &config, 0.1);
		assert!(sim.pulses.is_empty());
		assert!(network.nodes.iter().all(|n| n.brightness == 0.15));
	}

	#[test]
	fn node_wraps_to_opposite_boundary() {
		let config = quiet_config();
		let mut network = Network::new(vec![Node::new(
			Vec2::new(1.09, 0.0),
			Vec2::new(0.001, 0.0),
			0.15,
		)]);
		// 1.09 + 0.001 * 1.0 * 60 = 1.15
		advance_nodes(&mut network, &config, 1.0);
		assert_eq!(network.nodes[0].pos.x, -1.1);

		network.nodes[0].pos = Vec2::new(0.0, -1.09);
		network.nodes[0].velocity = Vec2::new(0.0, -0.001);
		advance_nodes(&mut network, &config, 1.0);
		assert_eq!(network.nodes[0].pos.y, 1.1);
	}

	#[test]
	fn brightness_decays_to_floor() {
		let config = quiet_config();
		let mut network = Network::new(vec![Node::new(Vec2::ZERO, Vec2::ZERO, 2.0)]);
		advance_nodes(&mut network, &config, 0.016);
		assert!((network.nodes[0].brightness - 1.88).abs() < EPS);
		for _ in 0..200 {
			advance_nodes(&mut network, &config, 0.016);
		}
		assert_eq!(network.nodes[0].brightness, config.node_base_brightness);
	}

	#[test]
	fn fire_from_node_resolves_direction_and_boosts() {
		let config = quiet_config();
		let mut network = segment(0.4);
		let mut sim = Simulation::new();
		let mut rng = StdRng::seed_from_u64(1);

		assert_eq!(
			sim.fire_from_node(&mut network, &config, 1, &mut rng),
			FireOutcome::Fired { edge: 0 }
		);
		let pulse = sim.pulses[0];
		assert_eq!(pulse.direction, Direction::Reverse);
		assert_eq!(pulse.progress, 0.0);
		assert_eq!(pulse.brightness, config.pulse_brightness);
		assert!((network.nodes[1].brightness - 1.15).abs() < EPS);

		sim.fire_from_node(&mut network, &config, 0, &mut rng);
		assert_eq!(sim.pulses[1].direction, Direction::Forward);
	}

	#[test]
	fn isolated_node_never_fires() {
		let config = SynapseConfig {
			base_fire_probability: 1.0,
			..Default::default()
		};
		let mut network = Network::new(vec![Node::new(Vec2::ZERO, Vec2::ZERO, 0.15)]);
		let mut sim = Simulation::new();
		let mut rng = StdRng::seed_from_u64(2);
		assert_eq!(
			sim.fire_from_node(&mut network, &config, 0, &mut rng),
			FireOutcome::NoConnections
		);
		sim.fire(&mut network, &config, Vec2::splat(-5.0), &mut rng);
		assert!(sim.pulses.is_empty());
	}

	#[test]
	fn missing_edge_abandons_fire() {
		let config = quiet_config();
		let mut network = segment(0.4);
		network.edges.clear();
		let mut sim = Simulation::new();
		let mut rng = StdRng::seed_from_u64(3);
		assert_eq!(
			sim.fire_from_node(&mut network, &config, 0, &mut rng),
			FireOutcome::EdgeNotFound
		);
		assert!(sim.pulses.is_empty());
		assert_eq!(network.nodes[0].brightness, 0.15);
	}

	#[test]
	fn pulse_count_never_exceeds_cap() {
		let config = SynapseConfig {
			node_count: 60,
			connection_radius: 0.8,
			max_pulses: 5,
			base_fire_probability: 1.0,
			..Default::default()
		};
		let mut rng = StdRng::seed_from_u64(9);
		let mut network = Network::generate(&config, &mut rng);
		let mut sim = Simulation::new();

		for _ in 0..50 {
			sim.step(&mut network, &config, 0.016, Vec2::ZERO, &mut rng);
			assert!(sim.pulses.len() <= config.max_pulses);
		}
		assert_eq!(
			sim.fire_from_node(&mut network, &config, 0, &mut rng),
			FireOutcome::AtCapacity
		);
	}

	#[test]
	fn pointer_proximity_makes_nodes_fire() {
		let config = SynapseConfig {
			base_fire_probability: 0.0,
			pointer_fire_boost: 1.0,
			..Default::default()
		};
		let mut network = segment(0.4);
		let mut sim = Simulation::new();
		let mut rng = StdRng::seed_from_u64(4);

		sim.fire(&mut network, &config, Vec2::splat(-5.0), &mut rng);
		assert!(sim.pulses.is_empty());

		// Exactly on node 0: boost of 1.0 always beats the draw.
		sim.fire(&mut network, &config, Vec2::ZERO, &mut rng);
		assert!(!sim.pulses.is_empty());
	}

	#[test]
	fn pointer_boost_falls_off_linearly() {
		let config = SynapseConfig {
			base_fire_probability: 0.0,
			pointer_fire_boost: 0.02,
			pointer_influence_radius: 0.3,
			stimulated_fire_boost: 0.8,
			..Default::default()
		};
		let node = Vec2::new(0.2, -0.1);

		let at_node = fire_probability(&config, node, node, false);
		assert!((at_node - 0.02).abs() < EPS);
		let halfway = fire_probability(&config, node, node + Vec2::new(0.15, 0.0), false);
		assert!((halfway - 0.01).abs() < EPS);
		let edge = fire_probability(&config, node, node + Vec2::new(0.0, 0.3), false);
		assert!(edge.abs() < EPS);
		assert_eq!(fire_probability(&config, node, Vec2::splat(-5.0), false), 0.0);

		let stimulated = fire_probability(&config, node, node + Vec2::new(0.15, 0.0), true);
		assert!((stimulated - 0.81).abs() < EPS);
	}

	#[test]
	fn arrival_makes_destination_fire_in_same_step() {
		let config = SynapseConfig {
			base_fire_probability: 0.0,
			pointer_fire_boost: 0.0,
			stimulated_fire_boost: 1.0,
			..Default::default()
		};
		let mut network = segment(0.4);
		let mut sim = Simulation::new();
		let mut rng = StdRng::seed_from_u64(5);
		sim.pulses.push(pulse_on(0, Direction::Forward));

		sim.step(&mut network, &config, 1.0, Vec2::splat(-5.0), &mut rng);

		assert_eq!(sim.pulses.len(), 1);
		let reply = sim.pulses[0];
		assert_eq!(reply.edge, 0);
		assert_eq!(reply.direction, Direction::Reverse);
		assert_eq!(reply.progress, 0.0);
	}

	#[test]
	fn unstimulated_quiet_network_stays_silent() {
		let config = quiet_config();
		let mut network = segment(0.4);
		let mut sim = Simulation::new();
		let mut rng = StdRng::seed_from_u64(5);
		sim.pulses.push(pulse_on(0, Direction::Forward));

		sim.step(&mut network, &config, 1.0, Vec2::splat(-5.0), &mut rng);

		assert!(sim.pulses.is_empty());
	}

	#[test]
	fn invariants_hold_over_long_run() {
		let config = SynapseConfig::default();
		let dt = 1.0 / 60.0;
		let mut rng = StdRng::seed_from_u64(11);
		let mut network = Network::generate(&config, &mut rng);
		let mut sim = Simulation::new();

		for frame in 0..2000 {
			let pointer = if frame % 3 == 0 {
				Vec2::splat(-5.0)
			} else {
				network.nodes[frame % network.nodes.len()].pos
			};

			advance_nodes(&mut network, &config, dt);
			let before = sim.pulses.clone();
			sim.advance_pulses(&mut network, &config, dt);

			let expected: Vec<(f32, f32)> = before
				.iter()
				.filter_map(|pulse| {
					let mut moved = *pulse;
					let step = advance_pulse(&network, &config, &mut moved, dt);
					(step == PulseStep::Traveling).then_some((pulse.progress, moved.progress))
				})
				.collect();
			assert_eq!(expected.len(), sim.pulses.len());
			for (pulse, &(old, new)) in sim.pulses.iter().zip(&expected) {
				assert!(pulse.progress >= old);
				assert_eq!(pulse.progress, new);
				assert!(pulse.progress < 1.0);
			}

			sim.fire(&mut network, &config, pointer, &mut rng);
			assert!(sim.pulses.len() <= config.max_pulses);
			for node in &network.nodes {
				assert!(node.brightness >= config.node_base_brightness);
				assert!(node.brightness <= config.node_max_brightness);
			}
		}
	}
}
