use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{Report, ReportKind, ReportStatus};
use catalog_shared::ApiError;

/// Item written at creation; `parse_report` is its inverse.
fn report_item(report: &Report) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        ("PK".to_string(), AttributeValue::S("REPORT".to_string())),
        (
            "SK".to_string(),
            AttributeValue::S(format!("REPORT#{}", report.report_id)),
        ),
        (
            "user_id".to_string(),
            AttributeValue::S(report.user_id.clone()),
        ),
        (
            "products".to_string(),
            AttributeValue::L(
                report
                    .products
                    .iter()
                    .map(|id| AttributeValue::S(id.clone()))
                    .collect(),
            ),
        ),
        (
            "report_type".to_string(),
            AttributeValue::S(report.report_type.to_string()),
        ),
        (
            "file_name".to_string(),
            AttributeValue::S(report.file_name.clone()),
        ),
        (
            "email_sent".to_string(),
            AttributeValue::Bool(report.email_sent),
        ),
        (
            "created_at".to_string(),
            AttributeValue::S(report.created_at.clone()),
        ),
        (
            "status".to_string(),
            AttributeValue::S(report.status.to_string()),
        ),
    ]);

    if let Some(url) = &report.file_url {
        item.insert("file_url".to_string(), AttributeValue::S(url.clone()));
    }
    if let Some(email) = &report.sent_to_email {
        item.insert("sent_to_email".to_string(), AttributeValue::S(email.clone()));
    }
    if let Some(size) = report.file_size {
        item.insert("file_size".to_string(), AttributeValue::N(size.to_string()));
    }

    item
}

fn parse_report(item: &HashMap<String, AttributeValue>, report_id: &str) -> Report {
    Report {
        report_id: report_id.to_string(),
        user_id: item
            .get("user_id")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        products: item
            .get("products")
            .and_then(|v| v.as_l().ok())
            .map(|l| {
                l.iter()
                    .filter_map(|v| v.as_s().ok().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default(),
        report_type: item
            .get("report_type")
            .and_then(|v| v.as_s().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(ReportKind::Pdf),
        file_name: item
            .get("file_name")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        file_url: item
            .get("file_url")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string()),
        email_sent: item
            .get("email_sent")
            .and_then(|v| v.as_bool().ok())
            .copied()
            .unwrap_or(false),
        sent_to_email: item
            .get("sent_to_email")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string()),
        created_at: item
            .get("created_at")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        file_size: item
            .get("file_size")
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse().ok()),
        status: item
            .get("status")
            .and_then(|v| v.as_s().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default(),
    }
}

/// Persist a new report record:
/// PK = "REPORT"
/// SK = "REPORT#{report_id}"
pub async fn create_report(
    client: &DynamoClient,
    table_name: &str,
    report: &Report,
) -> Result<(), ApiError> {
    client
        .put_item()
        .table_name(table_name)
        .set_item(Some(report_item(report)))
        .send()
        .await
        .map_err(ApiError::store)?;

    Ok(())
}

/// All reports owned by one user, newest-first.
pub async fn load_reports_for_user(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Vec<Report>, ApiError> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .filter_expression("user_id = :uid")
        .expression_attribute_values(":pk", AttributeValue::S("REPORT".to_string()))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("REPORT#".to_string()))
        .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
        .send()
        .await
        .map_err(ApiError::store)?;

    let mut reports = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(report_id) = sk.strip_prefix("REPORT#") {
                reports.push(parse_report(item, report_id));
            }
        }
    }

    reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(reports)
}

/// generating -> completed, recording the stored file and its size.
/// Condition-guarded so no other transition can happen.
pub async fn mark_completed(
    client: &DynamoClient,
    table_name: &str,
    report_id: &str,
    file_url: &str,
    file_size: i64,
) -> Result<(), ApiError> {
    transition(
        client,
        table_name,
        report_id,
        ReportStatus::Completed,
        Some((file_url, file_size)),
    )
    .await
}

/// generating -> failed.
pub async fn mark_failed(
    client: &DynamoClient,
    table_name: &str,
    report_id: &str,
) -> Result<(), ApiError> {
    transition(client, table_name, report_id, ReportStatus::Failed, None).await
}

async fn transition(
    client: &DynamoClient,
    table_name: &str,
    report_id: &str,
    to: ReportStatus,
    stored_file: Option<(&str, i64)>,
) -> Result<(), ApiError> {
    let sk = format!("REPORT#{}", report_id);

    let mut update_expr = vec!["#status = :status"];
    let mut builder = client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("REPORT".to_string()))
        .key("SK", AttributeValue::S(sk))
        .condition_expression("#status = :generating")
        .expression_attribute_names("#status", "status")
        .expression_attribute_values(":status", AttributeValue::S(to.to_string()))
        .expression_attribute_values(
            ":generating",
            AttributeValue::S(ReportStatus::Generating.to_string()),
        );

    if let Some((file_url, file_size)) = stored_file {
        update_expr.push("#file_url = :file_url");
        update_expr.push("#file_size = :file_size");
        builder = builder
            .expression_attribute_names("#file_url", "file_url")
            .expression_attribute_names("#file_size", "file_size")
            .expression_attribute_values(":file_url", AttributeValue::S(file_url.to_string()))
            .expression_attribute_values(":file_size", AttributeValue::N(file_size.to_string()));
    }

    builder
        .update_expression(format!("SET {}", update_expr.join(", ")))
        .send()
        .await
        .map_err(ApiError::store)?;

    Ok(())
}

/// Record the email-delivery outcome. Tracked independently of `status`.
pub async fn set_email_delivery(
    client: &DynamoClient,
    table_name: &str,
    report_id: &str,
    email_sent: bool,
    sent_to_email: &str,
) -> Result<(), ApiError> {
    let sk = format!("REPORT#{}", report_id);

    client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("REPORT".to_string()))
        .key("SK", AttributeValue::S(sk))
        .update_expression("SET #email_sent = :email_sent, #sent_to_email = :sent_to_email")
        .expression_attribute_names("#email_sent", "email_sent")
        .expression_attribute_names("#sent_to_email", "sent_to_email")
        .expression_attribute_values(":email_sent", AttributeValue::Bool(email_sent))
        .expression_attribute_values(":sent_to_email", AttributeValue::S(sent_to_email.to_string()))
        .send()
        .await
        .map_err(ApiError::store)?;

    Ok(())
}
