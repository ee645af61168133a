//! Side panel editing the selected node: text, style and secondary links.

use leptos::prelude::*;

use super::editor::EditorHandle;
use crate::graph::{FontSize, Node, Shape};

fn edit(editor: EditorHandle, id: &str, change: impl FnOnce(&mut Node)) {
	let id = id.to_owned();
	editor.update(move |s| {
		let Some(mut patch) = s.graph().node(&id).cloned() else {
			return false;
		};
		change(&mut patch);
		s.update_node(patch)
	});
}

fn optional_color(value: String) -> Option<String> {
	let value = value.trim();
	(!value.is_empty()).then(|| value.to_owned())
}

/// Blank descriptions are stored as absent. Other text is kept as typed.
fn optional_description(value: String) -> Option<String> {
	(!value.trim().is_empty()).then_some(value)
}

#[component]
pub fn PropertiesPanel() -> impl IntoView {
	let editor = expect_context::<EditorHandle>();
	let selected = Memo::new(move |_| editor.with(|s| s.selected_node().cloned()));

	move || {
		let Some(node) = selected.get() else {
			return view! {
				<aside class="properties empty">
					<p>"Select a node to edit it. Tab adds a child, Enter a sibling."</p>
				</aside>
			}
			.into_any();
		};
		let id = StoredValue::new(node.id.clone());
		let links = editor.with(|s| {
			s.graph()
				.links()
				.iter()
				.filter_map(|link| {
					let other = link.other(&node.id)?;
					let label = s.graph().node(other).map(|n| n.label.clone())?;
					Some((link.source_id.clone(), link.target_id.clone(), label))
				})
				.collect::<Vec<_>>()
		});

		view! {
			<aside class="properties">
				<label>
					"Label"
					<input
						type="text"
						prop:value=node.label.clone()
						on:change=move |ev| {
							let label = event_target_value(&ev);
							edit(editor, &id.get_value(), |n| n.label = label);
						}
					/>
				</label>
				<label>
					"Description"
					<textarea
						prop:value=node.description.clone().unwrap_or_default()
						on:change=move |ev| {
							let description = optional_description(event_target_value(&ev));
							edit(editor, &id.get_value(), |n| n.description = description);
						}
					/>
				</label>
				<label>
					"Shape"
					<select on:change=move |ev| {
						let shape = Shape::parse(&event_target_value(&ev));
						edit(editor, &id.get_value(), |n| n.style.shape = shape);
					}>
						{Shape::ALL
							.into_iter()
							.map(|shape| {
								view! {
									<option value=shape.as_str() selected=shape == node.style.shape>
										{shape.as_str()}
									</option>
								}
							})
							.collect_view()}
					</select>
				</label>
				<label>
					"Font size"
					<select on:change=move |ev| {
						let size = FontSize::parse(&event_target_value(&ev));
						edit(editor, &id.get_value(), |n| n.style.font_size = size);
					}>
						{FontSize::ALL
							.into_iter()
							.map(|size| {
								view! {
									<option value=size.as_str() selected=size == node.style.font_size>
										{size.as_str()}
									</option>
								}
							})
							.collect_view()}
					</select>
				</label>
				<label>
					"Background"
					<input
						type="text"
						placeholder="#ffffff"
						prop:value=node.style.background.clone().unwrap_or_default()
						on:change=move |ev| {
							let color = optional_color(event_target_value(&ev));
							edit(editor, &id.get_value(), |n| n.style.background = color);
						}
					/>
				</label>
				<label>
					"Border"
					<input
						type="text"
						placeholder="#4a5568"
						prop:value=node.style.border.clone().unwrap_or_default()
						on:change=move |ev| {
							let color = optional_color(event_target_value(&ev));
							edit(editor, &id.get_value(), |n| n.style.border = color);
						}
					/>
				</label>
				<h3>"Links"</h3>
				<ul class="links">
					{links
						.into_iter()
						.map(|(source, target, label)| {
							view! {
								<li>
									<span>{label}</span>
									<button on:click=move |_| {
										editor.update(|s| s.remove_link(&source, &target));
									}>"Remove"</button>
								</li>
							}
						})
						.collect_view()}
				</ul>
				<p class="hint">"Alt-drag a node onto another to link them."</p>
			</aside>
		}
		.into_any()
	}
}
