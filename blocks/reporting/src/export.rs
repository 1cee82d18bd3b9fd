use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sesv2::Client as SesClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use crate::encoder;
use crate::types::{ExportOutcome, ExportRequest};
use catalog_atoms::products;
use catalog_atoms::reports::{self, Report, ReportKind, ReportStatus};
use catalog_atoms::users;
use catalog_shared::email::send_report_email;
use catalog_shared::error::{error_response, ApiError};

/// POST /export/{kind} - body {userId, email?}
pub async fn handle_export(
    dynamo: &DynamoClient,
    s3: &S3Client,
    ses: &SesClient,
    table_name: &str,
    bucket_name: &str,
    kind: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let kind: ReportKind = match kind.parse() {
        Ok(k) => k,
        Err(message) => return error_response(&ApiError::Validation(message)),
    };

    let request: ExportRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => {
            return error_response(&ApiError::validation(format!("Invalid request body: {}", e)))
        }
    };

    match generate_export(
        dynamo,
        s3,
        ses,
        table_name,
        bucket_name,
        &request.user_id,
        kind,
        request.email.as_deref().filter(|e| !e.is_empty()),
    )
    .await
    {
        Ok(outcome) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&outcome)?.into())
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}

/// Generate one export artifact for a user.
///
/// A Report record is written first at `generating` and always ends at
/// `completed` or `failed`; email delivery is tracked on the record but
/// never fails the export.
#[allow(clippy::too_many_arguments)]
pub async fn generate_export(
    dynamo: &DynamoClient,
    s3: &S3Client,
    ses: &SesClient,
    table_name: &str,
    bucket_name: &str,
    user_id: &str,
    kind: ReportKind,
    target_email: Option<&str>,
) -> Result<ExportOutcome, ApiError> {
    if uuid::Uuid::parse_str(user_id).is_err() {
        return Err(ApiError::InvalidIdentifier(user_id.to_string()));
    }
    if users::service::load_user(dynamo, table_name, user_id)
        .await?
        .is_none()
    {
        return Err(ApiError::UserNotFound);
    }

    let owned = products::service::load_products_for_user(dynamo, table_name, user_id).await?;

    let now = chrono::Utc::now();
    let file_name = encoder::export_file_name(kind, now);
    let report = Report {
        report_id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        products: owned.iter().map(|p| p.product_id.clone()).collect(),
        report_type: kind,
        file_name: file_name.clone(),
        file_url: None,
        email_sent: false,
        sent_to_email: None,
        created_at: now.to_rfc3339(),
        file_size: None,
        status: ReportStatus::Generating,
    };
    reports::service::create_report(dynamo, table_name, &report).await?;

    let bytes = match encoder::encode(kind, &owned) {
        Ok(bytes) => bytes,
        Err(e) => {
            fail_report(dynamo, table_name, &report.report_id).await;
            return Err(e);
        }
    };

    let key = format!("exports/{}/{}", user_id, file_name);
    let file_size = bytes.len() as i64;
    if let Err(e) = s3
        .put_object()
        .bucket(bucket_name)
        .key(&key)
        .content_type(encoder::content_type(kind))
        .body(ByteStream::from(bytes))
        .send()
        .await
    {
        tracing::error!("S3 put_object failed for {}: {}", key, e);
        fail_report(dynamo, table_name, &report.report_id).await;
        return Err(ApiError::external(e));
    }

    let download_url = format!("/exports/{}/{}", user_id, file_name);
    reports::service::mark_completed(
        dynamo,
        table_name,
        &report.report_id,
        &download_url,
        file_size,
    )
    .await?;

    let mut email_sent = false;
    if let Some(address) = target_email {
        email_sent = send_report_email(ses, address, &file_name, &download_url)
            .await
            .is_ok();
        record_email_delivery(dynamo, table_name, &report.report_id, email_sent, address).await;
    }

    tracing::info!(
        "Export {} generated for user {} ({} bytes)",
        file_name,
        user_id,
        file_size
    );

    Ok(ExportOutcome {
        success: true,
        file_name,
        download_url,
        email_sent,
        report_id: report.report_id,
    })
}

async fn fail_report(dynamo: &DynamoClient, table_name: &str, report_id: &str) {
    if let Err(e) = reports::service::mark_failed(dynamo, table_name, report_id).await {
        tracing::error!("Failed to mark report {} as failed: {}", report_id, e);
    }
}

/// Record the delivery flag on the report. The artifact already exists and
/// the report is `completed`, so a bookkeeping failure never fails the
/// export itself.
async fn record_email_delivery(
    dynamo: &DynamoClient,
    table_name: &str,
    report_id: &str,
    email_sent: bool,
    address: &str,
) {
    if let Err(e) =
        reports::service::set_email_delivery(dynamo, table_name, report_id, email_sent, address)
            .await
    {
        tracing::error!(
            "Failed to record email delivery for report {}: {}",
            report_id,
            e
        );
    }
}

/// GET /exports/{userId}/{fileName} - stream a stored artifact back out.
pub async fn proxy_artifact(
    s3: &S3Client,
    bucket_name: &str,
    user_id: &str,
    file_name: &str,
) -> Result<Response<Body>, Error> {
    let key = format!("exports/{}/{}", user_id, file_name);

    let object = match s3.get_object().bucket(bucket_name).key(&key).send().await {
        Ok(o) => o,
        Err(e) => {
            let service_err = e.into_service_error();
            if service_err.is_no_such_key() {
                return error_response(&ApiError::NotFound("Export"));
            }
            return error_response(&ApiError::external(service_err));
        }
    };

    let content_type = if file_name.ends_with(".pdf") {
        "application/pdf"
    } else if file_name.ends_with(".csv") {
        "text/csv"
    } else {
        "application/octet-stream"
    };

    let data = object
        .body
        .collect()
        .await
        .map_err(|e| Box::new(e) as Error)?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", file_name),
        )
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Binary(data.into_bytes().to_vec()))
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::config::retry::RetryConfig;
    use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};

    // Nothing listens on port 1, so every call fails at dispatch.
    fn unreachable_dynamo() -> DynamoClient {
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("akid", "secret", None, None, "static"))
            .endpoint_url("http://127.0.0.1:1")
            .retry_config(RetryConfig::disabled())
            .build();
        DynamoClient::from_conf(config)
    }

    #[tokio::test]
    async fn email_bookkeeping_failure_does_not_bubble_up() {
        let dynamo = unreachable_dynamo();
        record_email_delivery(&dynamo, "catalog", "r-1", true, "ada@example.com").await;
    }

    #[tokio::test]
    async fn failure_marking_failure_does_not_bubble_up() {
        let dynamo = unreachable_dynamo();
        fail_report(&dynamo, "catalog", "r-1").await;
    }
}
