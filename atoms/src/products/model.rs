use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Company name assigned when the upload omits one.
pub const DEFAULT_PRODUCT_COMPANY: &str = "xyz";

/// Product domain model.
///
/// `attributes` is a free-form name -> value mapping (color, material, ...).
/// No key validation occurs; whatever the upload form sends is stored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub product_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub company_name: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub company_name: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub company_name: Option<String>,
    pub attributes: Option<HashMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_serializes_with_document_store_wire_names() {
        let product = Product {
            product_id: "p-1".into(),
            name: "Desk lamp".into(),
            description: None,
            image_url: None,
            company_name: "acme".into(),
            attributes: HashMap::from([("color".to_string(), "red".to_string())]),
            user_id: "u-1".into(),
            created_at: "2026-08-01T00:00:00+00:00".into(),
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["_id"], "p-1");
        assert_eq!(json["companyName"], "acme");
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["attributes"]["color"], "red");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn create_payload_accepts_arbitrary_attribute_keys() {
        let payload: CreateProductPayload = serde_json::from_str(
            r#"{"name":"Chair","userId":"u-1","attributes":{"weird key!":"ok","material":"oak"}}"#,
        )
        .unwrap();
        assert_eq!(payload.attributes.len(), 2);
        assert_eq!(payload.attributes["weird key!"], "ok");
    }
}
