use crate::api::client::Api;
use crate::ui::log_strip::LogStrip;
use leptos::prelude::*;

mod api;
mod ui;

#[component]
pub fn App() -> impl IntoView {
    view! {
        <main style="display:flex; flex-direction:column; height:100vh; margin:0;">
            <h1 style="font-family: system-ui, sans-serif; font-size:18px; padding:8px; margin:0;">
                "Process stdout"
            </h1>
            <LogStrip/>
        </main>
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    // same-origin API, the server also serves the client bundle
    Api::init(String::new());
    leptos::mount::mount_to_body(|| view! { <App/> });
}
