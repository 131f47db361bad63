use glam::Vec2;
use log::info;
use rand::Rng;

use super::config::SynapseConfig;
use super::types::{Direction, Edge, Node, Pulse};

/// Nodes plus the static edge list connecting them.
///
/// Built once. Node positions and brightness change every frame, the
/// adjacency never does.
#[derive(Clone, Debug, Default)]
pub struct Network {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

impl Network {
	pub fn new(nodes: Vec<Node>) -> Self {
		Self {
			nodes,
			edges: Vec::new(),
		}
	}

	/// Scatters `node_count` nodes over `[-1, 1]²` and links near neighbours.
	///
	/// For each node, every other node within `connection_radius` is a
	/// candidate. Candidates are taken closest first until the node reaches
	/// `max_degree`; a candidate that is already connected, or whose own degree
	/// is already at the limit, is skipped.
	pub fn generate(config: &SynapseConfig, rng: &mut impl Rng) -> Self {
		let spread = config.initial_velocity_spread;
		let nodes = (0..config.node_count)
			.map(|_| {
				let pos = Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
				let velocity = Vec2::new(
					rng.gen_range(-0.5..0.5) * spread,
					rng.gen_range(-0.5..0.5) * spread,
				);
				Node::new(pos, velocity, config.node_base_brightness)
			})
			.collect();

		let mut network = Self::new(nodes);
		let radius_sq = config.connection_radius * config.connection_radius;

		for i in 0..network.nodes.len() {
			let origin = network.nodes[i].pos;
			let mut candidates: Vec<(usize, f32)> = network
				.nodes
				.iter()
				.enumerate()
				.filter(|&(j, _)| j != i)
				.map(|(j, node)| (j, origin.distance_squared(node.pos)))
				.filter(|&(_, dist_sq)| dist_sq < radius_sq)
				.collect();
			candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

			for (j, _) in candidates {
				if network.nodes[i].degree() >= config.max_degree {
					break;
				}
				if network.nodes[j].degree() >= config.max_degree
					|| network.nodes[j].connections.contains(&i)
				{
					continue;
				}
				network.connect(i, j);
			}
		}

		info!(
			"Generated {} nodes and {} edges",
			network.nodes.len(),
			network.edges.len()
		);
		network
	}

	/// Adds the edge `a`–`b` and records the connection on both nodes.
	///
	/// Returns the new edge index, or `None` for a self-loop or an unknown node.
	pub fn connect(&mut self, a: usize, b: usize) -> Option<usize> {
		if a == b || a >= self.nodes.len() || b >= self.nodes.len() {
			return None;
		}
		self.edges.push(Edge { a, b });
		self.nodes[a].connections.push(b);
		self.nodes[b].connections.push(a);
		Some(self.edges.len() - 1)
	}

	/// Index of the edge joining `from` and `to`, by linear scan.
	pub fn find_edge(&self, from: usize, to: usize) -> Option<usize> {
		self.edges.iter().position(|edge| edge.joins(from, to))
	}

	/// Current endpoint positions of an edge.
	pub fn endpoints(&self, edge: usize) -> Option<(Vec2, Vec2)> {
		let edge = self.edges.get(edge)?;
		let a = self.nodes.get(edge.a)?;
		let b = self.nodes.get(edge.b)?;
		Some((a.pos, b.pos))
	}

	/// Where a pulse currently sits between its edge's endpoints.
	pub fn pulse_position(&self, pulse: &Pulse) -> Option<Vec2> {
		let (a, b) = self.endpoints(pulse.edge)?;
		let t = match pulse.direction {
			Direction::Forward => pulse.progress,
			Direction::Reverse => 1.0 - pulse.progress,
		};
		Some(a.lerp(b, t))
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;

	fn build(seed: u64, node_count: usize, radius: f32, max_degree: usize) -> Network {
		let config = SynapseConfig {
			node_count,
			connection_radius: radius,
			max_degree,
			..Default::default()
		};
		Network::generate(&config, &mut StdRng::seed_from_u64(seed))
	}

	#[test]
	fn reference_scenario_bounds_edges_and_degree() {
		let network = build(42, 25, 0.5, 7);
		assert_eq!(network.nodes.len(), 25);
		assert!(network.edges.len() <= 25 * 7);
		for node in &network.nodes {
			assert!(node.degree() <= 7);
		}
	}

	#[test]
	fn edges_have_distinct_endpoints_and_are_unique() {
		for seed in 0..20 {
			let network = build(seed, 40, 0.6, 5);
			for (idx, edge) in network.edges.iter().enumerate() {
				assert_ne!(edge.a, edge.b);
				assert_eq!(network.find_edge(edge.a, edge.b), Some(idx));
			}
		}
	}

	#[test]
	fn adjacency_is_symmetric_and_matches_edges() {
		for seed in 0..20 {
			let network = build(seed, 40, 0.6, 5);
			let mut degree_sum = 0;
			for (i, node) in network.nodes.iter().enumerate() {
				degree_sum += node.degree();
				for &j in &node.connections {
					assert!(network.nodes[j].connections.contains(&i));
					assert!(network.find_edge(i, j).is_some());
				}
			}
			assert_eq!(degree_sum, network.edges.len() * 2);
		}
	}

	#[test]
	fn dense_graph_respects_max_degree() {
		for seed in 0..10 {
			let network = build(seed, 80, 3.0, 3);
			assert!(network.nodes.iter().all(|n| n.degree() <= 3));
		}
	}

	#[test]
	fn nodes_start_inside_unit_square_at_floor_brightness() {
		let network = build(7, 100, 0.3, 4);
		for node in &network.nodes {
			assert!((-1.0..=1.0).contains(&node.pos.x));
			assert!((-1.0..=1.0).contains(&node.pos.y));
			assert!(node.velocity.x.abs() <= 0.00025);
			assert_eq!(node.brightness, 0.15);
		}
	}

	#[test]
	fn zero_radius_leaves_nodes_isolated() {
		let network = build(3, 10, 0.0, 7);
		assert!(network.edges.is_empty());
		assert!(network.nodes.iter().all(|n| n.connections.is_empty()));
	}

	#[test]
	fn connect_rejects_self_loops_and_unknown_nodes() {
		let mut network = Network::new(vec![
			Node::new(Vec2::ZERO, Vec2::ZERO, 0.1),
			Node::new(Vec2::X, Vec2::ZERO, 0.1),
		]);
		assert_eq!(network.connect(0, 0), None);
		assert_eq!(network.connect(0, 5), None);
		assert_eq!(network.connect(1, 0), Some(0));
		assert_eq!(network.find_edge(0, 1), Some(0));
	}

	#[test]
	fn pulse_position_interpolates_by_direction() {
		let mut network = Network::new(vec![
			Node::new(Vec2::new(0.0, 0.0), Vec2::ZERO, 0.1),
			Node::new(Vec2::new(1.0, 0.0), Vec2::ZERO, 0.1),
		]);
		let edge = network.connect(0, 1).unwrap();
		let mut pulse = Pulse {
			edge,
			direction: Direction::Forward,
			progress: 0.25,
			brightness: 1.8,
		};
		assert_eq!(network.pulse_position(&pulse), Some(Vec2::new(0.25, 0.0)));
		pulse.direction = Direction::Reverse;
		assert_eq!(network.pulse_position(&pulse), Some(Vec2::new(0.75, 0.0)));
		pulse.edge = 9;
		assert_eq!(network.pulse_position(&pulse), None);
	}
}
