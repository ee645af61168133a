use leptos::prelude::*;

use super::editor::EditorHandle;
use super::mind_map::NoticeLevel;

fn level_class(level: NoticeLevel) -> &'static str {
	match level {
		NoticeLevel::Info => "notice info",
		NoticeLevel::Warning => "notice warning",
		NoticeLevel::Error => "notice error",
	}
}

#[component]
pub fn Notices() -> impl IntoView {
	let editor = expect_context::<EditorHandle>();
	let notices = editor.notices();

	view! {
		<div class="notices">
			<For each=move || notices.get() key=|shown| shown.id let:shown>
				<div class=level_class(shown.notice.level)>
					<span>{shown.notice.message.clone()}</span>
					<button on:click=move |_| editor.dismiss(shown.id)>"×"</button>
				</div>
			</For>
		</div>
	}
}
