use leptos::prelude::*;
use memgraph_viewer::{App, init_logging};

fn main() {
	init_logging();
	mount_to_body(App)
}
