use crate::api::client::Api;
use futures_util::StreamExt;
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;
use shared::types::{
    announcement::Announcement, log_message::LogMessage, recent_log::RecentLog,
};

/// Live view of the watched process's stdout: the last ten lines, one
/// paragraph per line, oldest first. The whole display region is replaced on
/// every message.
#[component]
pub fn LogStrip() -> impl IntoView {
    let (log, set_log) = signal(RecentLog::new());

    Effect::new(move |_| {
        spawn_local(async move {
            let api = Api::instance();
            let mut source = match api.log_stream() {
                Ok(source) => source,
                Err(e) => {
                    warn!("log stream unavailable: {e}");
                    return;
                }
            };
            let mut stream = match source.subscribe("process_stdout") {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("log stream subscription failed: {e:?}");
                    return;
                }
            };

            // announce once per established channel
            let _ = api.announce(&Announcement::connected()).await;

            while let Some(Ok((_, event))) = stream.next().await {
                let raw = event.data().as_string().unwrap_or_default();
                let text = match LogMessage::from_json(&raw) {
                    Ok(msg) => msg.text(),
                    Err(_) => raw,
                };
                set_log.update(|entries| entries.push(text));
            }
            // the EventSource closes when `source` drops here; no reconnect
        });
    });

    view! {
        <div
            id="stdout_log"
            style="flex:1; background:#0b1020; color:#e5e7eb; font-family: ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, Liberation Mono, monospace; font-size:12px; padding:8px; overflow:auto;"
            inner_html=move || log.get().render_html()
        ></div>
    }
}
