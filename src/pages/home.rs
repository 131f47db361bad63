use leptos::prelude::*;

use crate::components::synapse_flow::SynapseFlowCanvas;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<div class="synapse-background">
			<SynapseFlowCanvas />
			<div class="synapse-overlay">
				<h1>"Synapse Flow"</h1>
				<p class="subtitle">"Move the pointer over the network to excite nearby nodes."</p>
			</div>
		</div>
	}
}
