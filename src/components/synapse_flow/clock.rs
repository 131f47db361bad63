/// Whether the frame loop should schedule another frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
	Continue,
	Stop,
}

/// Turns host frame timestamps (milliseconds) into elapsed seconds.
///
/// The first tick after a reset reports zero and every tick is capped at
/// `max_delta`, so a throttled background tab resumes without a jump.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
	last: Option<f64>,
	max_delta: f32,
}

impl FrameClock {
	pub fn new(max_delta: f32) -> Self {
		Self {
			last: None,
			max_delta,
		}
	}

	/// Forgets the previous timestamp so the next tick reports zero.
	pub fn reset(&mut self) {
		self.last = None;
	}

	/// Seconds since the previous tick, capped at `max_delta`.
	pub fn tick(&mut self, now_ms: f64) -> f32 {
		let elapsed = match self.last {
			Some(last) => ((now_ms - last) / 1000.0).max(0.0) as f32,
			None => 0.0,
		};
		self.last = Some(now_ms);
		elapsed.min(self.max_delta)
	}
}

/// Whether the loop runs, and whether it should run again once a lost
/// context comes back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunState {
	running: bool,
	resume_on_restore: bool,
}

impl RunState {
	pub fn is_running(self) -> bool {
		self.running
	}

	/// Returns `false` if the loop was already running.
	pub fn start(&mut self) -> bool {
		self.resume_on_restore = false;
		!std::mem::replace(&mut self.running, true)
	}

	/// Caller-requested stop; a later restore leaves the loop stopped.
	pub fn stop(&mut self) {
		self.running = false;
		self.resume_on_restore = false;
	}

	/// A start requested while the context is unusable runs once it returns.
	pub fn defer_start(&mut self) {
		self.resume_on_restore = true;
	}

	/// Halts the loop because the context went away.
	pub fn context_lost(&mut self) {
		if self.running {
			self.resume_on_restore = true;
		}
		self.running = false;
	}

	/// Whether the restored context should restart the loop. Clears the flag.
	pub fn take_resume(&mut self) -> bool {
		std::mem::take(&mut self.resume_on_restore)
	}
}
