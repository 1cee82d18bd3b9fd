use catalog_atoms::products;
use catalog_atoms::reports;
use catalog_atoms::users;
use catalog_shared::{cors, live, AppState};
use lambda_http::http::header::{HeaderValue, VARY};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};
use reporting_block::{analytics, export};
use std::env;
use std::sync::Arc;

fn with_cors_headers(mut resp: Response<Body>, request_origin: Option<&str>) -> Response<Body> {
    let cors_origin = cors::get_cors_origin(request_origin);

    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_str(&cors_origin)
            .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173")),
    );
    headers.insert(
        "Access-Control-Allow-Credentials",
        HeaderValue::from_static("true"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Authorization"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));

    resp
}

fn finalize_response(
    resp: Result<Response<Body>, Error>,
    request_origin: Option<&str>,
) -> Result<Response<Body>, Error> {
    resp.map(|r| with_cors_headers(r, request_origin))
}

/// Main Lambda handler - routes requests to the catalog endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    let request_origin = event.headers().get("Origin").and_then(|v| v.to_str().ok());
    tracing::info!("API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp, request_origin));
    }

    let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "catalog".to_string());
    let bucket_name = env::var("EXPORTS_BUCKET").unwrap_or_else(|_| "catalog-exports".to_string());

    // Signup (user record only; no session handling here)
    if path == "/signup" {
        return match method {
            &Method::POST => finalize_response(
                users::http::signup(&state.dynamo_client, &table_name, body).await,
                request_origin,
            ),
            _ => finalize_response(method_not_allowed(), request_origin),
        };
    }

    // Live text feed
    if path == "/api/events" {
        return match method {
            &Method::GET => finalize_response(live::handle_events(&state.live).await, request_origin),
            _ => finalize_response(method_not_allowed(), request_origin),
        };
    }

    if path == "/api/update" {
        return match method {
            &Method::POST => {
                finalize_response(live::handle_update(&state.live, body).await, request_origin)
            }
            _ => finalize_response(method_not_allowed(), request_origin),
        };
    }

    // Raw report-record creation (legacy path)
    if path == "/api/reports" {
        return match method {
            &Method::POST => finalize_response(
                reports::http::create_report_record(&state.dynamo_client, &table_name, body).await,
                request_origin,
            ),
            _ => finalize_response(method_not_allowed(), request_origin),
        };
    }

    // User profile routes
    if path.starts_with("/users") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (method, parts.as_slice()) {
            // GET /users/{id} - public profile
            (&Method::GET, ["users", user_id]) => {
                users::http::get_user(&state.dynamo_client, &table_name, user_id).await
            }
            // PATCH /users/{id} - profile edit
            (&Method::PATCH, ["users", user_id]) => {
                users::http::update_user(&state.dynamo_client, &table_name, user_id, body).await
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin);
    }

    // Analytics route
    if path.starts_with("/analytics") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (method, parts.as_slice()) {
            // GET /analytics/{userId} - aggregated summary
            (&Method::GET, ["analytics", user_id]) => {
                analytics::handle_analytics(&state.dynamo_client, &table_name, user_id).await
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin);
    }

    // Product CRUD routes
    if path.starts_with("/products") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (method, parts.as_slice()) {
            // GET /products?userId= - list, optional owner filter
            (&Method::GET, ["products"]) => {
                let owner_id = event
                    .query_string_parameters_ref()
                    .and_then(|params| params.first("userId"));
                products::http::list_products(&state.dynamo_client, &table_name, owner_id).await
            }
            // POST /products - create product
            (&Method::POST, ["products"]) => {
                products::http::create_product(&state.dynamo_client, &table_name, body).await
            }
            // GET /products/{id} - get one product
            (&Method::GET, ["products", product_id]) => {
                products::http::get_product(&state.dynamo_client, &table_name, product_id).await
            }
            // PUT /products/{id} - partial update
            (&Method::PUT, ["products", product_id]) => {
                products::http::update_product(&state.dynamo_client, &table_name, product_id, body)
                    .await
            }
            // DELETE /products/{id} - delete product
            (&Method::DELETE, ["products", product_id]) => {
                products::http::delete_product(&state.dynamo_client, &table_name, product_id).await
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin);
    }

    // Download stored export artifacts (S3 proxy)
    if path.starts_with("/exports/") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (method, parts.as_slice()) {
            // GET /exports/{userId}/{fileName}
            (&Method::GET, ["exports", user_id, file_name]) => {
                export::proxy_artifact(&state.s3_client, &bucket_name, user_id, file_name).await
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin);
    }

    // Export generation and history
    if path.starts_with("/export") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let resp = match (method, parts.as_slice()) {
            // GET /export/history/{userId} - report records, newest-first
            (&Method::GET, ["export", "history", user_id]) => {
                reports::http::list_user_reports(&state.dynamo_client, &table_name, user_id).await
            }
            // POST /export/{kind} - generate report (kind: pdf | excel)
            (&Method::POST, ["export", kind]) => {
                export::handle_export(
                    &state.dynamo_client,
                    &state.s3_client,
                    &state.ses_client,
                    &table_name,
                    &bucket_name,
                    kind,
                    body,
                )
                .await
            }
            _ => not_found(),
        };

        return finalize_response(resp, request_origin);
    }

    // No matching route
    tracing::warn!("No route matched - Method: {} Path: {}", method, path);
    finalize_response(not_found(), request_origin)
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(
            serde_json::json!({"error": "Method not allowed"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}
