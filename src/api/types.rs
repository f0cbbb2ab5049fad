use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SessionFromTokenRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct WidgetSessionRequest {
    pub api_key: String,
    pub vendor_id: String,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailableCouponsQuery {
    pub vendor: String,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub coupon_id: String,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub coupon_code: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
