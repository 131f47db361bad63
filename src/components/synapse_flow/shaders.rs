//! GLSL ES 1.00 sources.

pub const LINE_VERTEX: &str = r#"
attribute vec2 a_pos;

void main() {
	gl_Position = vec4(a_pos, 0.0, 1.0);
}
"#;

pub const LINE_FRAGMENT: &str = r#"
precision lowp float;
uniform vec4 u_color;

void main() {
	gl_FragColor = u_color;
}
"#;

/// Shared by nodes and pulses. `a_vertex_data` is x, y, brightness.
pub const POINT_VERTEX: &str = r#"
attribute vec3 a_vertex_data;
uniform float u_point_size;
varying float v_brightness;

void main() {
	gl_PointSize = u_point_size;
	gl_Position = vec4(a_vertex_data.xy, 0.0, 1.0);
	v_brightness = a_vertex_data.z;
}
"#;

/// Bright core plus a soft falloff toward the sprite edge.
pub const POINT_FRAGMENT: &str = r#"
precision highp float;
varying float v_brightness;

void main() {
	float dist = distance(gl_PointCoord, vec2(0.5));
	float core = smoothstep(0.0, 0.15, 1.0 - dist) * 1.5;
	float glow = 1.0 - smoothstep(0.3, 0.5, dist);
	float intensity = min(1.0, (glow + core) * v_brightness);
	gl_FragColor = vec4(intensity, intensity, intensity, intensity);
}
"#;
