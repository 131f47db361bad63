use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlCanvasElement, MouseEvent, WebGlRenderingContext as Gl};

use super::clock::{FrameClock, LoopControl, RunState};
use super::config::SynapseConfig;
use super::error::{Result, SynapseError};
use super::gl::acquire_context;
use super::graph::Network;
use super::render::Renderer;
use super::simulation::Simulation;
use super::viewport::{POINTER_SENTINEL, SurfaceSize, backing_size, normalize_pointer};

/// Everything one frame touches. Owned by the frame loop and the event handlers
/// through a shared `Rc<RefCell<_>>`.
struct Scene {
	config: SynapseConfig,
	canvas: HtmlCanvasElement,
	gl: Gl,
	network: Network,
	simulation: Simulation,
	renderer: Option<Renderer>,
	surface: SurfaceSize,
	clock: FrameClock,
	pointer: Vec2,
	rng: StdRng,
	run: RunState,
	frame_request: Option<i32>,
}

impl Scene {
	fn frame(&mut self, timestamp: f64) -> LoopControl {
		self.frame_request = None;
		if !self.run.is_running() {
			return LoopControl::Stop;
		}
		if self.gl.is_context_lost() {
			debug!("Context lost, frame loop stopping");
			self.run.context_lost();
			return LoopControl::Stop;
		}
		let Some(renderer) = self.renderer.as_mut() else {
			debug!("No renderer, frame loop stopping");
			self.run.context_lost();
			return LoopControl::Stop;
		};

		let dt = self.clock.tick(timestamp);
		self.simulation.step(
			&mut self.network,
			&self.config,
			dt,
			self.pointer,
			&mut self.rng,
		);
		renderer.draw(&self.network, &self.simulation.pulses);
		LoopControl::Continue
	}

	/// Matches the drawing buffer to the parent's layout box times the device pixel ratio.
	fn resize(&mut self) {
		if self.gl.is_context_lost() {
			return;
		}
		let (Some(window), Some(parent)) = (web_sys::window(), self.canvas.parent_element()) else {
			return;
		};
		let rect = parent.get_bounding_client_rect();
		let size = backing_size(rect.width(), rect.height(), window.device_pixel_ratio());
		if !self.surface.resize(size) {
			return;
		}

		self.canvas.set_width(size.0);
		self.canvas.set_height(size.1);
		let style = self.canvas.style();
		let _ = style.set_property("width", &format!("{}px", rect.width()));
		let _ = style.set_property("height", &format!("{}px", rect.height()));
		self.apply_viewport();
		debug!("Canvas resized to {}x{}", size.0, size.1);
	}

	fn cancel_frame(&mut self) {
		if let Some(handle) = self.frame_request.take() {
			if let Some(window) = web_sys::window() {
				let _ = window.cancel_animation_frame(handle);
			}
		}
	}

	fn apply_viewport(&self) {
		self.gl
			.viewport(0, 0, self.surface.width as i32, self.surface.height as i32);
	}

	/// Recreates GPU resources from the unchanged network and picks up any
	/// resize missed while the context was gone.
	fn rebuild_renderer(&mut self) -> Result<()> {
		if let Some(stale) = self.renderer.take() {
			stale.dispose();
		}
		self.renderer = Some(Renderer::new(&self.gl, &self.network, &self.config)?);
		self.apply_viewport();
		self.resize();
		Ok(())
	}
}

/// The animation-frame callback and the scene it drives.
#[derive(Clone)]
struct FrameLoop {
	scene: Rc<RefCell<Scene>>,
	callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl FrameLoop {
	fn new(scene: Rc<RefCell<Scene>>) -> Self {
		let frame_loop = Self {
			scene,
			callback: Rc::new(RefCell::new(None)),
		};
		let inner = frame_loop.clone();
		*frame_loop.callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			let control = inner.scene.borrow_mut().frame(timestamp);
			if control == LoopControl::Continue {
				inner.request();
			}
		}));
		frame_loop
	}

	fn request(&self) {
		let Some(window) = web_sys::window() else {
			return;
		};
		let callback = self.callback.borrow();
		let Some(cb) = callback.as_ref() else {
			return;
		};
		match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
			Ok(handle) => self.scene.borrow_mut().frame_request = Some(handle),
			Err(err) => {
				warn!("requestAnimationFrame failed: {err:?}");
				self.scene.borrow_mut().run.stop();
			}
		}
	}

	fn start(&self) {
		{
			let mut scene = self.scene.borrow_mut();
			if scene.run.is_running() {
				return;
			}
			if scene.renderer.is_none() || scene.gl.is_context_lost() {
				warn!("Frame loop deferred until the context is restored");
				scene.run.defer_start();
				return;
			}
			scene.run.start();
			scene.clock.reset();
		}
		debug!("Frame loop started");
		self.request();
	}

	fn stop(&self) {
		let mut scene = self.scene.borrow_mut();
		if scene.run.is_running() {
			debug!("Frame loop stopped");
		}
		scene.run.stop();
		scene.cancel_frame();
	}
}

/// A DOM event listener removed when dropped.
struct Listener {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
	fn new(
		target: &EventTarget,
		event: &'static str,
		handler: impl FnMut(Event) + 'static,
	) -> Result<Self> {
		let callback = Closure::<dyn FnMut(Event)>::new(handler);
		target
			.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
			.map_err(SynapseError::from_js)?;
		Ok(Self {
			target: target.clone(),
			event,
			callback,
		})
	}
}

impl Drop for Listener {
	fn drop(&mut self) {
		let _ = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

/// Animated network background bound to one canvas.
///
/// Created stopped; call [`SynapseFlow::start`] to begin animating. Dropping it
/// (or calling [`SynapseFlow::dispose`]) stops the loop, detaches every event
/// listener and releases GPU resources.
pub struct SynapseFlow {
	frame_loop: FrameLoop,
	listeners: Vec<Listener>,
	resize_timer: Rc<Cell<Option<i32>>>,
}

impl SynapseFlow {
	/// Looks up the canvas with id `canvas_id` in the current document and
	/// initializes on it.
	pub fn mount(canvas_id: &str, config: SynapseConfig) -> Result<Self> {
		let document = web_sys::window()
			.ok_or(SynapseError::NoWindow)?
			.document()
			.ok_or(SynapseError::NoDocument)?;
		let canvas = document
			.get_element_by_id(canvas_id)
			.ok_or_else(|| SynapseError::CanvasNotFound(canvas_id.into()))?
			.dyn_into::<HtmlCanvasElement>()
			.map_err(|_| SynapseError::NotACanvas(canvas_id.into()))?;
		Self::new(canvas, config)
	}

	/// Builds the network, the GPU pipeline and the event wiring for `canvas`.
	///
	/// Any error here is fatal: nothing is left attached and no frame is
	/// scheduled.
	pub fn new(canvas: HtmlCanvasElement, config: SynapseConfig) -> Result<Self> {
		config.validate()?;
		let window = web_sys::window().ok_or(SynapseError::NoWindow)?;
		let gl = acquire_context(&canvas)?;

		let mut rng = StdRng::from_entropy();
		let network = Network::generate(&config, &mut rng);
		let renderer = Renderer::new(&gl, &network, &config)?;

		let scene = Rc::new(RefCell::new(Scene {
			surface: SurfaceSize::new(canvas.width(), canvas.height()),
			clock: FrameClock::new(config.max_frame_delta),
			config,
			canvas: canvas.clone(),
			gl,
			network,
			simulation: Simulation::new(),
			renderer: Some(renderer),
			pointer: POINTER_SENTINEL,
			rng,
			run: RunState::default(),
			frame_request: None,
		}));
		scene.borrow_mut().resize();

		let mut flow = Self {
			frame_loop: FrameLoop::new(scene),
			listeners: Vec::with_capacity(5),
			resize_timer: Rc::new(Cell::new(None)),
		};
		// On error `flow` is dropped, which detaches whatever was attached.
		flow.attach_listeners(&window, &canvas)?;
		info!("Synapse flow initialized");
		Ok(flow)
	}

	fn attach_listeners(&mut self, window: &web_sys::Window, canvas: &HtmlCanvasElement) -> Result<()> {
		let scene = &self.frame_loop.scene;

		let resize_callback: Rc<Closure<dyn FnMut()>> = {
			let scene = scene.clone();
			let timer = self.resize_timer.clone();
			Rc::new(Closure::new(move || {
				timer.set(None);
				scene.borrow_mut().resize();
			}))
		};
		{
			let window_handle = window.clone();
			let timer = self.resize_timer.clone();
			let delay = scene.borrow().config.resize_debounce_ms;
			self.listeners.push(Listener::new(window, "resize", move |_| {
				if let Some(pending) = timer.take() {
					window_handle.clear_timeout_with_handle(pending);
				}
				let handler: &Closure<dyn FnMut()> = &resize_callback;
				match window_handle.set_timeout_with_callback_and_timeout_and_arguments_0(
					handler.as_ref().unchecked_ref(),
					delay,
				) {
					Ok(handle) => timer.set(Some(handle)),
					Err(err) => warn!("Failed to schedule resize: {err:?}"),
				}
			})?);
		}

		{
			let scene = scene.clone();
			self.listeners.push(Listener::new(window, "mousemove", move |event| {
				let Some(event) = event.dyn_ref::<MouseEvent>() else {
					return;
				};
				let mut scene = scene.borrow_mut();
				let rect = scene.canvas.get_bounding_client_rect();
				scene.pointer = normalize_pointer(
					event.client_x() as f64,
					event.client_y() as f64,
					(rect.left(), rect.top(), rect.width(), rect.height()),
				);
			})?);
		}

		{
			let scene = scene.clone();
			self.listeners.push(Listener::new(canvas, "mouseleave", move |_| {
				scene.borrow_mut().pointer = POINTER_SENTINEL;
			})?);
		}

		{
			let frame_loop = self.frame_loop.clone();
			self.listeners
				.push(Listener::new(canvas, "webglcontextlost", move |event| {
					// Without this the browser never restores the context.
					event.prevent_default();
					warn!("WebGL context lost");
					let mut scene = frame_loop.scene.borrow_mut();
					scene.run.context_lost();
					scene.cancel_frame();
					// The old handles died with the context.
					scene.renderer = None;
				})?);
		}

		{
			let frame_loop = self.frame_loop.clone();
			self.listeners
				.push(Listener::new(canvas, "webglcontextrestored", move |_| {
					info!("WebGL context restored");
					let rebuilt = frame_loop.scene.borrow_mut().rebuild_renderer();
					let resume = frame_loop.scene.borrow_mut().run.take_resume();
					match rebuilt {
						Ok(()) if resume => frame_loop.start(),
						Ok(()) => debug!("Frame loop left stopped after restore"),
						Err(err) => error!("Failed to reinitialize after context restore: {err}"),
					}
				})?);
		}

		Ok(())
	}

	/// Starts the frame loop. Does nothing if it is already running; while
	/// the context is lost the start waits for the restore.
	pub fn start(&self) {
		self.frame_loop.start();
	}

	/// Stops scheduling frames. The simulation state is kept, and a context
	/// restore does not restart the loop.
	pub fn stop(&self) {
		self.frame_loop.stop();
	}

	/// Whether frames are currently being scheduled.
	pub fn is_running(&self) -> bool {
		self.frame_loop.scene.borrow().run.is_running()
	}

	/// Number of nodes and edges in the network.
	pub fn graph_size(&self) -> (usize, usize) {
		let scene = self.frame_loop.scene.borrow();
		(scene.network.nodes.len(), scene.network.edges.len())
	}

	/// Stops the loop and releases every listener, timer and GPU resource.
	pub fn dispose(mut self) {
		self.shutdown();
		info!("Synapse flow disposed");
	}

	fn shutdown(&mut self) {
		self.frame_loop.stop();
		if let Some(pending) = self.resize_timer.take() {
			if let Some(window) = web_sys::window() {
				window.clear_timeout_with_handle(pending);
			}
		}
		self.listeners.clear();
		// Breaks the callback's reference to its own loop.
		self.frame_loop.callback.borrow_mut().take();
		if let Some(renderer) = self.frame_loop.scene.borrow_mut().renderer.take() {
			renderer.dispose();
		}
	}
}

impl Drop for SynapseFlow {
	fn drop(&mut self) {
		self.shutdown();
	}
}
