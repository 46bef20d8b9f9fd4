use serde::{Deserialize, Serialize};

use crate::filters::FilterSelection;
use crate::session::SessionInfo;

fn create_action() -> String {
    "create".to_string()
}

fn get_range_action() -> String {
    "get-range".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    #[serde(default = "create_action")]
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GetRangeRequest {
    #[serde(default = "get_range_action")]
    pub action: String,
    pub session_id: String,
    #[serde(flatten)]
    pub filters: FilterSelection,
}

#[derive(Debug, Serialize)]
pub struct GetRangeResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
    pub action_performed: String,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionInfo>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct CloseResponse {
    pub message: String,
}
