pub mod cors;
pub mod email;
pub mod error;
pub mod live;

pub use error::ApiError;

use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sesv2::Client as SesClient;

/// Process-wide clients, built once at cold start and shared via Arc.
pub struct AppState {
    pub dynamo_client: DynamoClient,
    pub s3_client: S3Client,
    pub ses_client: SesClient,
    pub live: live::LiveTextHub,
}

impl AppState {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            dynamo_client: DynamoClient::new(config),
            s3_client: S3Client::new(config),
            ses_client: SesClient::new(config),
            live: live::LiveTextHub::new(),
        }
    }
}
