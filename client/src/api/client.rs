use gloo_net::{eventsource::futures::EventSource, http::Request};
use once_cell::sync::OnceCell;
use shared::types::announcement::Announcement;
use std::sync::Arc;

static INSTANCE: OnceCell<Arc<Api>> = OnceCell::new();

pub struct Api {
    base_url: String,
}

impl Api {
    pub fn init(base_url: String) {
        let _ = INSTANCE.set(Arc::new(Api { base_url }));
    }

    pub fn instance() -> Arc<Self> {
        INSTANCE.get().unwrap().clone()
    }

    pub async fn announce(&self, announcement: &Announcement) -> Result<(), String> {
        let resp = Request::post(format!("{}/api/announce", self.base_url).as_str())
            .json(announcement)
            .map_err(|e| e.to_string())?
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.ok() {
            return Err(format!("HTTP {}", resp.status()));
        }
        Ok(())
    }

    pub fn log_stream(&self) -> Result<EventSource, String> {
        let url = format!("{}/api/logstream", self.base_url);
        EventSource::new(&url).map_err(|e| format!("{e:?}"))
    }
}
