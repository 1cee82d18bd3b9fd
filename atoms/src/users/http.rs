use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::model::{SignupPayload, UpdateUserPayload};
use super::service;
use catalog_shared::error::{error_response, ApiError};

/// POST /signup - create the user record. Sessions/tokens are not issued
/// here; authentication lives outside this service.
pub async fn signup(
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: SignupPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => {
            return error_response(&ApiError::validation(format!("Invalid request body: {}", e)))
        }
    };

    match service::create_user(client, table_name, payload).await {
        Ok(user) => Ok(Response::builder()
            .status(StatusCode::CREATED)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&user)?.into())
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}

/// GET /users/{id}
pub async fn get_user(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Response<Body>, Error> {
    match service::load_user(client, table_name, user_id).await {
        Ok(Some(user)) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&user)?.into())
            .map_err(Box::new)?),
        Ok(None) => error_response(&ApiError::UserNotFound),
        Err(e) => error_response(&e),
    }
}

/// PATCH /users/{id}
pub async fn update_user(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: UpdateUserPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => {
            return error_response(&ApiError::validation(format!("Invalid request body: {}", e)))
        }
    };

    match service::update_user(client, table_name, user_id, payload).await {
        Ok(user) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&user)?.into())
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}
