use glam::Vec2;

/// Pointer position used while the pointer is outside the canvas. Far enough
/// from `[-1, 1]²` that no node is ever within the influence radius.
pub const POINTER_SENTINEL: Vec2 = Vec2::new(-5.0, -5.0);

/// Drawing-buffer size in device pixels for a container of `css_width` ×
/// `css_height` CSS pixels.
pub fn backing_size(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> (u32, u32) {
	let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
		device_pixel_ratio
	} else {
		1.0
	};
	let scale = |v: f64| (v.max(0.0) * dpr).round() as u32;
	(scale(css_width), scale(css_height))
}

/// Current drawing-buffer size; only reports a change when the size differs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SurfaceSize {
	pub width: u32,
	pub height: u32,
}

impl SurfaceSize {
	pub fn new(width: u32, height: u32) -> Self {
		Self { width, height }
	}

	/// Adopts `size`, returning `true` if it differs from the current one.
	pub fn resize(&mut self, (width, height): (u32, u32)) -> bool {
		if self.width == width && self.height == height {
			return false;
		}
		self.width = width;
		self.height = height;
		true
	}
}

/// Maps a client-space pointer position to the node coordinate space, y up.
///
/// `rect` is the canvas bounding box as `(left, top, width, height)`.
pub fn normalize_pointer(client_x: f64, client_y: f64, rect: (f64, f64, f64, f64)) -> Vec2 {
	let (left, top, width, height) = rect;
	if width <= 0.0 || height <= 0.0 {
		return POINTER_SENTINEL;
	}
	let x = (client_x - left) / width * 2.0 - 1.0;
	let y = (client_y - top) / height * -2.0 + 1.0;
	Vec2::new(x as f32, y as f32)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn backing_size_scales_by_dpr() {
		assert_eq!(backing_size(800.0, 600.0, 2.0), (1600, 1200));
		assert_eq!(backing_size(333.3, 100.2, 1.5), (500, 150));
		assert_eq!(backing_size(10.0, 10.0, 0.0), (10, 10));
		assert_eq!(backing_size(-4.0, 10.0, 1.0), (0, 10));
	}

	#[test]
	fn resize_is_idempotent() {
		let mut surface = SurfaceSize::new(300, 150);
		assert!(surface.resize(backing_size(640.0, 480.0, 1.0)));
		assert!(!surface.resize(backing_size(640.0, 480.0, 1.0)));
		assert_eq!(surface, SurfaceSize::new(640, 480));
		assert!(surface.resize((640, 481)));
	}

	#[test]
	fn size_missed_while_paused_applies_on_next_resize() {
		let mut surface = SurfaceSize::new(640, 480);
		// Layout changed while no resize ran; the stored size is still the old one.
		let current = backing_size(1024.0, 768.0, 1.0);
		assert_eq!(surface, SurfaceSize::new(640, 480));
		assert!(surface.resize(current));
		assert_eq!(surface, SurfaceSize::new(1024, 768));
	}

	#[test]
	fn pointer_maps_corners_and_centre() {
		let rect = (10.0, 20.0, 200.0, 100.0);
		assert_eq!(normalize_pointer(10.0, 20.0, rect), Vec2::new(-1.0, 1.0));
		assert_eq!(normalize_pointer(210.0, 120.0, rect), Vec2::new(1.0, -1.0));
		assert_eq!(normalize_pointer(110.0, 70.0, rect), Vec2::ZERO);
	}

	#[test]
	fn empty_canvas_yields_sentinel() {
		assert_eq!(normalize_pointer(5.0, 5.0, (0.0, 0.0, 0.0, 100.0)), POINTER_SENTINEL);
	}
}
