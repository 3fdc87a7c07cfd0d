use serde::Serialize;

/// Shape returned by both entry points when a run completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl Response {
    pub fn success() -> Self {
        Response {
            status_code: 200,
            body: serde_json::Value::from("success").to_string(),
        }
    }
}
