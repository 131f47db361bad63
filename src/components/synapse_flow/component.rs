use leptos::prelude::*;
use log::error;
use web_sys::HtmlCanvasElement;

use super::config::SynapseConfig;
use super::lifecycle::SynapseFlow;

/// Canvas hosting the animated network background.
///
/// The canvas fills its parent; the parent's layout box decides the drawing
/// buffer size. If initialization fails the canvas is hidden.
#[component]
pub fn SynapseFlowCanvas(
	/// Tunables; the defaults when omitted.
	#[prop(optional)]
	config: Option<SynapseConfig>,
	/// Element id of the canvas.
	#[prop(into, default = "synapseCanvas".to_string())]
	id: String,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	// Dropped with the owning scope, which tears down the loop and listeners.
	let flow = StoredValue::new_local(None::<SynapseFlow>);
	let config = config.unwrap_or_default();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if flow.with_value(Option::is_some) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();

		match SynapseFlow::new(canvas.clone(), config.clone()) {
			Ok(instance) => {
				instance.start();
				flow.set_value(Some(instance));
			}
			Err(err) => {
				error!("Failed to initialize synapse flow: {err}");
				let _ = web_sys::HtmlElement::style(&canvas).set_property("display", "none");
			}
		}
	});

	view! {
		<canvas
			node_ref=canvas_ref
			id=id
			class="synapse-flow-canvas"
			style="display: block; width: 100%; height: 100%;"
		/>
	}
}
