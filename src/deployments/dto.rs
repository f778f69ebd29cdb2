use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: String,
}
