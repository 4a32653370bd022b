use serde_json::{Map, Value};
use std::path::PathBuf;

/// Read-only snapshot used when the live provider cannot be reached.
#[derive(Debug, Clone)]
pub struct FallbackLoader {
    path: PathBuf,
}

impl FallbackLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the snapshot, or an empty object when the file is missing or malformed.
    pub async fn load(&self) -> Value {
        tracing::info!(path = %self.path.display(), "loading fallback data");

        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "fallback file unreadable");
                return empty();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(v) => v,
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "fallback file is not valid JSON");
                empty()
            }
        }
    }
}

fn empty() -> Value {
    Value::Object(Map::new())
}
