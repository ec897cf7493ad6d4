//! `POST /api/lead` — acknowledge captured contact details.
//!
//! Leads are logged and acknowledged, not stored.

use axum::http::StatusCode;
use axum::response::Json;
use tracing::info;

use crate::protocol::{LeadRequest, LeadResponse};

pub async fn capture_lead(Json(body): Json<LeadRequest>) -> (StatusCode, Json<LeadResponse>) {
    if let Some(field) = body.missing_field() {
        return (
            StatusCode::BAD_REQUEST,
            Json(LeadResponse { success: false, error: Some(format!("{field} is required")) }),
        );
    }

    let domain = body.email.rsplit_once('@').map_or("", |(_, d)| d);
    info!(email_domain = domain, "lead: received");
    (StatusCode::OK, Json(LeadResponse { success: true, error: None }))
}
