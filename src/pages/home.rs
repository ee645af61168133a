use leptos::prelude::*;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::components::editor::EditorHandle;
use crate::components::mind_map::{MindMapCanvas, MindMapState, ROOT_LABEL};
use crate::components::notices::Notices;
use crate::components::properties::PropertiesPanel;
use crate::components::toolbar::Toolbar;
use crate::config::EditorConfig;
use crate::graph::Graph;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = EditorConfig::load();
	info!("starting editor, {} layout", config.direction.as_str());

	let state = MindMapState::new(
		Graph::with_root(ROOT_LABEL),
		config.direction,
		800.0,
		600.0,
		StdRng::from_entropy(),
	);
	provide_context(EditorHandle::new(state, config.notice_ms));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<div class="editor">
				<Toolbar generation=config.generation />
				<main class="workspace">
					<div class="fullscreen-map">
						<MindMapCanvas />
					</div>
					<PropertiesPanel />
				</main>
				<Notices />
			</div>
		</ErrorBoundary>
	}
}
