use leptos::prelude::*;
use mindmap_canvas::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}
