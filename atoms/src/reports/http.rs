use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::model::{CreateReportPayload, Report};
use super::service;
use catalog_shared::error::{error_response, ApiError};

/// POST /api/reports - raw report-record creation (legacy path).
pub async fn create_report_record(
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: CreateReportPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => {
            return error_response(&ApiError::validation(format!("Invalid request body: {}", e)))
        }
    };

    let report = Report {
        report_id: uuid::Uuid::new_v4().to_string(),
        user_id: payload.user_id,
        products: payload.products,
        report_type: payload.report_type,
        file_name: payload.file_name,
        file_url: payload.file_url,
        email_sent: payload.email_sent,
        sent_to_email: payload.sent_to_email,
        created_at: chrono::Utc::now().to_rfc3339(),
        file_size: payload.file_size,
        status: payload.status,
    };

    match service::create_report(client, table_name, &report).await {
        Ok(()) => Ok(Response::builder()
            .status(StatusCode::CREATED)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&report)?.into())
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}

/// GET /export/history/{userId} - report records, newest-first.
pub async fn list_user_reports(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    match service::load_reports_for_user(client, table_name, user_id).await {
        Ok(reports) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&reports)?.into())
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}
