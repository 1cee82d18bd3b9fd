use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use super::model::{SignupPayload, UpdateUserPayload, User, DEFAULT_COMPANY, DEFAULT_PHOTO_URL};
use catalog_shared::ApiError;

/// Peppered SHA-256 digest; the raw password is never stored.
fn password_digest(password: &str) -> String {
    let pepper = std::env::var("PASSWORD_PEPPER").unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(pepper.as_bytes());
    hasher.update(password.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Item written at signup, minus the password digest; `parse_user` is its
/// inverse.
fn user_item(user: &User) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("PK".to_string(), AttributeValue::S("USER".to_string())),
        (
            "SK".to_string(),
            AttributeValue::S(format!("USER#{}", user.user_id)),
        ),
        ("name".to_string(), AttributeValue::S(user.name.clone())),
        ("email".to_string(), AttributeValue::S(user.email.clone())),
        ("company".to_string(), AttributeValue::S(user.company.clone())),
        ("photo".to_string(), AttributeValue::S(user.photo.clone())),
        (
            "created_at".to_string(),
            AttributeValue::S(user.created_at.clone()),
        ),
    ])
}

fn parse_user(item: &HashMap<String, AttributeValue>, user_id: &str) -> User {
    User {
        user_id: user_id.to_string(),
        name: item
            .get("name")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        email: item
            .get("email")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        company: item
            .get("company")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
        photo: item
            .get("photo")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_PHOTO_URL.to_string()),
        created_at: item
            .get("created_at")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
    }
}

/// Create the user record at signup.
/// PK = "USER", SK = "USER#{user_id}"
pub async fn create_user(
    client: &DynamoClient,
    table_name: &str,
    payload: SignupPayload,
) -> Result<User, ApiError> {
    if payload.email.is_empty() || !payload.email.contains('@') {
        return Err(ApiError::validation("Please provide a valid email address"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    if find_user_by_email(client, table_name, &payload.email)
        .await?
        .is_some()
    {
        return Err(ApiError::validation("Email is already registered"));
    }

    // Fall back to the mailbox name when no display name was given
    let name = payload
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| {
            payload
                .email
                .split('@')
                .next()
                .unwrap_or("User")
                .to_string()
        });
    let user = User {
        user_id: uuid::Uuid::new_v4().to_string(),
        name,
        email: payload.email,
        company: payload
            .company
            .unwrap_or_else(|| DEFAULT_COMPANY.to_string()),
        photo: payload
            .photo
            .unwrap_or_else(|| DEFAULT_PHOTO_URL.to_string()),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    let mut item = user_item(&user);
    item.insert(
        "password".to_string(),
        AttributeValue::S(password_digest(&payload.password)),
    );

    client
        .put_item()
        .table_name(table_name)
        .set_item(Some(item))
        .send()
        .await
        .map_err(ApiError::store)?;

    tracing::info!("Created user {}", user.user_id);

    Ok(user)
}

/// Fetch one user, None when the id does not resolve.
pub async fn load_user(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
) -> Result<Option<User>, ApiError> {
    let sk = format!("USER#{}", user_id);

    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("USER".to_string()))
        .key("SK", AttributeValue::S(sk))
        .send()
        .await
        .map_err(ApiError::store)?;

    Ok(result.item().map(|item| parse_user(item, user_id)))
}

/// Find a user by email (signup uniqueness check).
pub async fn find_user_by_email(
    client: &DynamoClient,
    table_name: &str,
    email: &str,
) -> Result<Option<User>, ApiError> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk")
        .filter_expression("#email = :email")
        .expression_attribute_names("#email", "email")
        .expression_attribute_values(":pk", AttributeValue::S("USER".to_string()))
        .expression_attribute_values(":email", AttributeValue::S(email.to_string()))
        .send()
        .await
        .map_err(ApiError::store)?;

    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(user_id) = sk.strip_prefix("USER#") {
                return Ok(Some(parse_user(item, user_id)));
            }
        }
    }

    Ok(None)
}

/// Partial profile update (name, company, photo).
pub async fn update_user(
    client: &DynamoClient,
    table_name: &str,
    user_id: &str,
    payload: UpdateUserPayload,
) -> Result<User, ApiError> {
    let sk = format!("USER#{}", user_id);

    let mut update_expr = vec![];
    let mut expr_names = HashMap::new();
    let mut expr_values = HashMap::new();

    if let Some(name) = payload.name {
        update_expr.push("#name = :name");
        expr_names.insert("#name".to_string(), "name".to_string());
        expr_values.insert(":name".to_string(), AttributeValue::S(name));
    }

    if let Some(company) = payload.company {
        update_expr.push("#company = :company");
        expr_names.insert("#company".to_string(), "company".to_string());
        expr_values.insert(":company".to_string(), AttributeValue::S(company));
    }

    if let Some(photo) = payload.photo {
        update_expr.push("#photo = :photo");
        expr_names.insert("#photo".to_string(), "photo".to_string());
        expr_values.insert(":photo".to_string(), AttributeValue::S(photo));
    }

    if !update_expr.is_empty() {
        let mut builder = client
            .update_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S("USER".to_string()))
            .key("SK", AttributeValue::S(sk))
            .update_expression(format!("SET {}", update_expr.join(", ")));

        for (k, v) in expr_names {
            builder = builder.expression_attribute_names(k, v);
        }

        for (k, v) in expr_values {
            builder = builder.expression_attribute_values(k, v);
        }

        builder.send().await.map_err(ApiError::store)?;
    }

    load_user(client, table_name, user_id)
        .await?
        .ok_or(ApiError::UserNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            user_id: "u-1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            company: "acme".into(),
            photo: "https://img.example/ada.png".into(),
            created_at: "2026-08-01T00:00:00+00:00".into(),
        }
    }

    #[test]
    fn stored_item_parses_back_to_the_same_user() {
        let user = sample_user();
        let item = user_item(&user);
        let id = item["SK"].as_s().unwrap().strip_prefix("USER#").unwrap();
        assert_eq!(parse_user(&item, id), user);
    }

    #[test]
    fn password_digest_never_reaches_the_parsed_user() {
        let user = sample_user();
        let mut item = user_item(&user);
        item.insert(
            "password".to_string(),
            AttributeValue::S(password_digest("hunter2")),
        );
        assert_eq!(parse_user(&item, "u-1"), user);
    }
}
