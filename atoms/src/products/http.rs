use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use super::model::{CreateProductPayload, UpdateProductPayload};
use super::service;
use crate::users;
use catalog_shared::error::{error_response, ApiError};

fn json_ok(status: StatusCode, body: String) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.into())
        .map_err(Box::new)?)
}

/// GET /products?userId= - list products, optional owner filter
pub async fn list_products(
    client: &DynamoClient,
    table_name: &str,
    owner_id: Option<&str>,
) -> Result<Response<Body>, Error> {
    match service::list_products(client, table_name, owner_id).await {
        Ok(products) => json_ok(StatusCode::OK, serde_json::to_string(&products)?),
        Err(e) => error_response(&e),
    }
}

/// POST /products - create product (owner required and must exist)
pub async fn create_product(
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: CreateProductPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => {
            return error_response(&ApiError::validation(format!("Invalid request body: {}", e)))
        }
    };

    let owner_id = match payload.user_id.clone() {
        Some(id) if !id.is_empty() => id,
        _ => return error_response(&ApiError::validation("User ID is required")),
    };

    match users::service::load_user(client, table_name, &owner_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return error_response(&ApiError::UserNotFound),
        Err(e) => return error_response(&e),
    }

    match service::create_product(client, table_name, payload, &owner_id).await {
        Ok(product) => json_ok(StatusCode::CREATED, serde_json::to_string(&product)?),
        Err(e) => error_response(&e),
    }
}

/// GET /products/{id}
pub async fn get_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<Response<Body>, Error> {
    match service::get_product(client, table_name, product_id).await {
        Ok(Some(product)) => json_ok(StatusCode::OK, serde_json::to_string(&product)?),
        Ok(None) => error_response(&ApiError::NotFound("Product")),
        Err(e) => error_response(&e),
    }
}

/// PUT /products/{id} - partial update
pub async fn update_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: UpdateProductPayload = match serde_json::from_slice(body) {
        Ok(p) => p,
        Err(e) => {
            return error_response(&ApiError::validation(format!("Invalid request body: {}", e)))
        }
    };

    match service::update_product(client, table_name, product_id, payload).await {
        Ok(product) => json_ok(StatusCode::OK, serde_json::to_string(&product)?),
        Err(e) => error_response(&e),
    }
}

/// DELETE /products/{id}
pub async fn delete_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<Response<Body>, Error> {
    match service::delete_product(client, table_name, product_id).await {
        Ok(product) => json_ok(
            StatusCode::OK,
            serde_json::json!({
                "message": "Product deleted successfully",
                "product": product,
            })
            .to_string(),
        ),
        Err(e) => error_response(&e),
    }
}
