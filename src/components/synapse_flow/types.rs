use glam::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub pos: Vec2,
	pub velocity: Vec2,
	pub brightness: f32,
	/// Indices of connected nodes. Fixed once the network is built.
	pub connections: Vec<usize>,
}

impl Node {
	pub fn new(pos: Vec2, velocity: Vec2, brightness: f32) -> Self {
		Self {
			pos,
			velocity,
			brightness,
			connections: Vec::new(),
		}
	}

	pub fn degree(&self) -> usize {
		self.connections.len()
	}

	/// Adds `amount` and clamps to `ceiling`.
	pub fn boost(&mut self, amount: f32, ceiling: f32) {
		self.brightness = (self.brightness + amount).min(ceiling);
	}
}

/// Undirected connection between `a` and `b`, `a != b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
	pub a: usize,
	pub b: usize,
}

impl Edge {
	pub fn joins(&self, i: usize, j: usize) -> bool {
		(self.a == i && self.b == j) || (self.a == j && self.b == i)
	}
}

/// Which endpoint of its edge a pulse started from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	/// `a` to `b`.
	Forward,
	/// `b` to `a`.
	Reverse,
}

impl Direction {
	pub fn destination(self, edge: &Edge) -> usize {
		match self {
			Direction::Forward => edge.b,
			Direction::Reverse => edge.a,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
	pub edge: usize,
	pub direction: Direction,
	/// Fraction of the edge travelled, starting at 0.
	pub progress: f32,
	pub brightness: f32,
}
