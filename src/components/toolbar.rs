//! Generation form and map-level commands: new, undo/redo, layout, import/export.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, HtmlInputElement, Url};

use super::editor::EditorHandle;
use super::mind_map::Notice;
use crate::config::GenerationConfig;
use crate::document;
use crate::generate::generate;

const EXPORT_FILE_NAME: &str = "mindmap.json";

fn alert(message: &str) {
	if let Some(window) = web_sys::window() {
		let _ = window.alert_with_message(message);
	}
}

fn download(file_name: &str, contents: &str) -> Result<(), JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let document = window
		.document()
		.ok_or_else(|| JsValue::from_str("no document"))?;

	let options = BlobPropertyBag::new();
	options.set_type("application/json");
	let parts = js_sys::Array::of1(&JsValue::from_str(contents));
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(&url);
	anchor.set_download(file_name);
	anchor.click();
	Url::revoke_object_url(&url)
}

#[component]
pub fn Toolbar(generation: GenerationConfig) -> impl IntoView {
	let editor = expect_context::<EditorHandle>();
	let input = RwSignal::new(String::new());
	let generation = StoredValue::new(generation);

	let on_generate = move |_| {
		if editor.busy.get_untracked() {
			return;
		}
		let text = input.get_untracked();
		if text.trim().is_empty() {
			editor.notify(Notice::warning("Enter some text or a URL first."));
			return;
		}
		editor.busy.set(true);
		let config = generation.get_value();
		spawn_local(async move {
			match generate(&config, &text).await {
				Ok(nodes) => match editor.update(|s| s.load_generated(nodes)) {
					Some(Err(err)) => editor.notify(Notice::error(err.to_string())),
					_ => input.set(String::new()),
				},
				Err(err) => {
					warn!("generation failed: {}", err);
					editor.notify(Notice::error(err.to_string()));
				}
			}
			editor.busy.set(false);
		});
	};

	let on_export = move |_| {
		let exported = editor
			.try_with_untracked(|s| document::export(s.graph(), s.direction))
			.transpose();
		match exported {
			Ok(Some(text)) => {
				if let Err(err) = download(EXPORT_FILE_NAME, &text) {
					warn!("export failed: {:?}", err);
					editor.notify(Notice::error("Could not start the download."));
				} else {
					info!("exported {} bytes", text.len());
				}
			}
			Ok(None) => {}
			Err(err) => editor.notify(Notice::error(err.to_string())),
		}
	};

	let on_import = move |ev: web_sys::Event| {
		let Some(field) = ev
			.target()
			.and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
		else {
			return;
		};
		let Some(file) = field.files().and_then(|files| files.get(0)) else {
			return;
		};
		field.set_value("");
		spawn_local(async move {
			let text = match JsFuture::from(file.text()).await {
				Ok(text) => text.as_string().unwrap_or_default(),
				Err(err) => {
					warn!("could not read {}: {:?}", file.name(), err);
					alert("Could not read the selected file.");
					return;
				}
			};
			match document::import(&text) {
				Ok(imported) => {
					info!("imported {} ({} nodes)", file.name(), imported.graph.nodes().len());
					editor.update(|s| s.load_imported(imported));
				}
				Err(err) => {
					warn!("rejected {}: {}", file.name(), err);
					alert(&err.to_string());
				}
			}
		});
	};

	let can_undo = move || editor.with(|s| s.history.can_undo());
	let can_redo = move || editor.with(|s| s.history.can_redo());
	let direction = move || editor.with(|s| s.direction.toggled().as_str());

	view! {
		<div class="toolbar">
			<div class="generate">
				<textarea
					placeholder="Paste text or a URL to generate a mind map"
					prop:value=move || input.get()
					on:input=move |ev| input.set(event_target_value(&ev))
					disabled=move || editor.busy.get()
				/>
				<button on:click=on_generate disabled=move || editor.busy.get()>
					{move || if editor.busy.get() { "Generating…" } else { "Generate" }}
				</button>
			</div>
			<div class="commands">
				<button on:click=move |_| {
					editor.update(|s| s.reset());
				}>"New map"</button>
				<button
					on:click=move |_| {
						editor.update(|s| s.undo());
					}
					disabled=move || !can_undo()
				>
					"Undo"
				</button>
				<button
					on:click=move |_| {
						editor.update(|s| s.redo());
					}
					disabled=move || !can_redo()
				>
					"Redo"
				</button>
				<button on:click=move |_| {
					editor.update(|s| s.auto_layout());
				}>"Auto layout"</button>
				<button on:click=move |_| {
					editor.update(|s| s.set_direction(s.direction.toggled()));
				}>{move || format!("Switch to {}", direction())}</button>
				<button on:click=move |_| {
					editor.update(|s| s.reset_view());
				}>"Reset view"</button>
				<button on:click=on_export>"Export"</button>
				<label class="import">
					"Import"
					<input type="file" accept="application/json,.json" on:change=on_import />
				</label>
			</div>
		</div>
	}
}
