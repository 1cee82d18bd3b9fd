use aws_sdk_sesv2::types::{Body as EmailBody, Content, Destination, EmailContent, Message};
use aws_sdk_sesv2::Client as SesClient;
use std::env;

use crate::error::ApiError;

/// Send the "your report is ready" notice for a generated export.
///
/// Delivery is best-effort bookkeeping: callers record the outcome on the
/// report but never fail the export because of it.
pub async fn send_report_email(
    ses_client: &SesClient,
    to_address: &str,
    file_name: &str,
    download_url: &str,
) -> Result<(), ApiError> {
    let from_address =
        env::var("SES_FROM_ADDRESS").unwrap_or_else(|_| "reports@catalog.local".to_string());

    let subject = Content::builder()
        .data(format!("Your report {} is ready", file_name))
        .charset("UTF-8")
        .build()
        .map_err(ApiError::external)?;

    let body_text = Content::builder()
        .data(format!(
            "Your product report has been generated.\n\nFile: {}\nDownload: {}\n",
            file_name, download_url
        ))
        .charset("UTF-8")
        .build()
        .map_err(ApiError::external)?;

    let message = Message::builder()
        .subject(subject)
        .body(EmailBody::builder().text(body_text).build())
        .build();

    ses_client
        .send_email()
        .from_email_address(&from_address)
        .destination(Destination::builder().to_addresses(to_address).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await
        .map_err(|e| {
            tracing::error!("SES send_email failed for {}: {}", to_address, e);
            ApiError::external(e)
        })?;

    tracing::info!("Report email sent to {}", to_address);
    Ok(())
}
