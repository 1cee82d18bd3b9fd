use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{CreateProductPayload, Product, UpdateProductPayload, DEFAULT_PRODUCT_COMPANY};
use catalog_shared::ApiError;

fn attributes_to_item(attributes: &HashMap<String, String>) -> AttributeValue {
    AttributeValue::M(
        attributes
            .iter()
            .map(|(k, v)| (k.clone(), AttributeValue::S(v.clone())))
            .collect(),
    )
}

/// Item written at create time; `parse_product` is its inverse.
fn product_item(product: &Product) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        ("PK".to_string(), AttributeValue::S("PRODUCT".to_string())),
        (
            "SK".to_string(),
            AttributeValue::S(format!("PRODUCT#{}", product.product_id)),
        ),
        ("name".to_string(), AttributeValue::S(product.name.clone())),
        (
            "company_name".to_string(),
            AttributeValue::S(product.company_name.clone()),
        ),
        (
            "attributes".to_string(),
            attributes_to_item(&product.attributes),
        ),
        (
            "user_id".to_string(),
            AttributeValue::S(product.user_id.clone()),
        ),
        (
            "created_at".to_string(),
            AttributeValue::S(product.created_at.clone()),
        ),
    ]);

    if let Some(description) = &product.description {
        item.insert(
            "description".to_string(),
            AttributeValue::S(description.clone()),
        );
    }
    if let Some(image_url) = &product.image_url {
        item.insert("image_url".to_string(), AttributeValue::S(image_url.clone()));
    }

    item
}

fn parse_product(item: &HashMap<String, AttributeValue>, product_id: &str) -> Product {
    Product {
        product_id: product_id.to_string(),
        name: item
            .get("name")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        description: item
            .get("description")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string()),
        image_url: item
            .get("image_url")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string()),
        company_name: item
            .get("company_name")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_PRODUCT_COMPANY.to_string()),
        attributes: item
            .get("attributes")
            .and_then(|v| v.as_m().ok())
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_s().ok().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default(),
        user_id: item
            .get("user_id")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
        created_at: item
            .get("created_at")
            .and_then(|v| v.as_s().ok())
            .map(|s| s.to_string())
            .unwrap_or_default(),
    }
}

/// Create a new product:
/// PK = "PRODUCT"
/// SK = "PRODUCT#{product_id}"
pub async fn create_product(
    client: &DynamoClient,
    table_name: &str,
    payload: CreateProductPayload,
    owner_id: &str,
) -> Result<Product, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Product name is required"));
    }

    let company_name = payload
        .company_name
        .unwrap_or_else(|| DEFAULT_PRODUCT_COMPANY.to_string());
    let product = Product {
        product_id: uuid::Uuid::new_v4().to_string(),
        name: payload.name,
        description: payload.description,
        image_url: payload.image_url,
        company_name,
        attributes: payload.attributes,
        user_id: owner_id.to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    client
        .put_item()
        .table_name(table_name)
        .set_item(Some(product_item(&product)))
        .send()
        .await
        .map_err(ApiError::store)?;

    Ok(product)
}

/// List products, optionally restricted to one owner, newest-first.
pub async fn list_products(
    client: &DynamoClient,
    table_name: &str,
    owner_id: Option<&str>,
) -> Result<Vec<Product>, ApiError> {
    let mut builder = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S("PRODUCT".to_string()))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("PRODUCT#".to_string()));

    if let Some(owner) = owner_id {
        builder = builder
            .filter_expression("user_id = :uid")
            .expression_attribute_values(":uid", AttributeValue::S(owner.to_string()));
    }

    let result = builder.send().await.map_err(ApiError::store)?;

    let mut products = Vec::new();
    for item in result.items() {
        if let Some(sk) = item.get("SK").and_then(|v| v.as_s().ok()) {
            if let Some(product_id) = sk.strip_prefix("PRODUCT#") {
                products.push(parse_product(item, product_id));
            }
        }
    }

    // Newest first; timestamps are uniform RFC 3339 strings
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(products)
}

/// All products owned by one user, newest-first.
pub async fn load_products_for_user(
    client: &DynamoClient,
    table_name: &str,
    owner_id: &str,
) -> Result<Vec<Product>, ApiError> {
    list_products(client, table_name, Some(owner_id)).await
}

/// Fetch one product, None when the id does not resolve.
pub async fn get_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<Option<Product>, ApiError> {
    let sk = format!("PRODUCT#{}", product_id);

    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("PRODUCT".to_string()))
        .key("SK", AttributeValue::S(sk))
        .send()
        .await
        .map_err(ApiError::store)?;

    Ok(result.item().map(|item| parse_product(item, product_id)))
}

/// Partial update; last write wins.
pub async fn update_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
    payload: UpdateProductPayload,
) -> Result<Product, ApiError> {
    if get_product(client, table_name, product_id).await?.is_none() {
        return Err(ApiError::NotFound("Product"));
    }

    let sk = format!("PRODUCT#{}", product_id);

    let mut update_expr = vec![];
    let mut expr_names = HashMap::new();
    let mut expr_values = HashMap::new();

    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("Product name is required"));
        }
        update_expr.push("#name = :name");
        expr_names.insert("#name".to_string(), "name".to_string());
        expr_values.insert(":name".to_string(), AttributeValue::S(name));
    }

    if let Some(description) = payload.description {
        update_expr.push("#description = :description");
        expr_names.insert("#description".to_string(), "description".to_string());
        expr_values.insert(":description".to_string(), AttributeValue::S(description));
    }

    if let Some(image_url) = payload.image_url {
        update_expr.push("#image_url = :image_url");
        expr_names.insert("#image_url".to_string(), "image_url".to_string());
        expr_values.insert(":image_url".to_string(), AttributeValue::S(image_url));
    }

    if let Some(company_name) = payload.company_name {
        update_expr.push("#company_name = :company_name");
        expr_names.insert("#company_name".to_string(), "company_name".to_string());
        expr_values.insert(":company_name".to_string(), AttributeValue::S(company_name));
    }

    if let Some(attributes) = payload.attributes {
        // Whole-map replacement; keys are never validated
        update_expr.push("#attributes = :attributes");
        expr_names.insert("#attributes".to_string(), "attributes".to_string());
        expr_values.insert(":attributes".to_string(), attributes_to_item(&attributes));
    }

    if !update_expr.is_empty() {
        let mut builder = client
            .update_item()
            .table_name(table_name)
            .key("PK", AttributeValue::S("PRODUCT".to_string()))
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

    get_product(client, table_name, product_id)
        .await?
        .ok_or(ApiError::NotFound("Product"))
}

/// Delete a product.
///
/// TODO: remove the hosted image as well - the image host has no cleanup
/// call wired up yet, so deletes leave the image behind.
pub async fn delete_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<Product, ApiError> {
    let product = get_product(client, table_name, product_id)
        .await?
        .ok_or(ApiError::NotFound("Product"))?;

    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("PRODUCT".to_string()))
        .key("SK", AttributeValue::S(format!("PRODUCT#{}", product_id)))
        .send()
        .await
        .map_err(ApiError::store)?;

    tracing::info!("Deleted product {}", product_id);

    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_item_parses_back_to_the_same_product() {
        let product = Product {
            product_id: "p-1".into(),
            name: "Desk lamp".into(),
            description: Some("warm light".into()),
            image_url: Some("https://img.example/lamp.png".into()),
            company_name: "acme".into(),
            attributes: HashMap::from([
                ("color".to_string(), "red".to_string()),
                ("material".to_string(), "steel".to_string()),
            ]),
            user_id: "u-1".into(),
            created_at: "2026-08-01T09:30:00+00:00".into(),
        };

        let item = product_item(&product);
        let id = item["SK"].as_s().unwrap().strip_prefix("PRODUCT#").unwrap();
        assert_eq!(parse_product(&item, id), product);
    }

    #[test]
    fn absent_optionals_parse_back_as_none() {
        let product = Product {
            product_id: "p-2".into(),
            name: "Chair".into(),
            description: None,
            image_url: None,
            company_name: "globex".into(),
            attributes: HashMap::new(),
            user_id: "u-1".into(),
            created_at: "2026-08-02T00:00:00+00:00".into(),
        };

        let item = product_item(&product);
        assert!(!item.contains_key("description"));
        assert!(!item.contains_key("image_url"));
        assert_eq!(parse_product(&item, "p-2"), product);
    }
}
