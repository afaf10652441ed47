use serde::{Deserialize, Serialize};

/// Payload a viewer sends back once the log channel is established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub data: String,
}

impl Announcement {
    /// The fixed connection notice, sent exactly once per connect.
    pub fn connected() -> Self {
        Self {
            data: "connected to the log stream".to_string(),
        }
    }
}
