use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Category, ProductSummary};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductCreateRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(range(min = 0))]
    pub original_price: i64,
    #[validate(range(min = 0))]
    pub discounted_price: i64,
    #[validate(length(min = 1))]
    pub description: String,
    pub category: Category,
    /// Keyword labels; duplicates are collapsed into a set.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Image URLs in display order.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub options: Vec<OptionCreateData>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OptionCreateData {
    #[validate(length(min = 1))]
    pub label: String,
    pub price: Option<i64>,
    #[serde(default)]
    #[validate(nested)]
    pub options: Vec<OptionCreateData>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedData {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductSummary>)]
    pub items: Vec<ProductSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet_request(name: &str) -> ProductCreateRequest {
        ProductCreateRequest {
            name: name.to_string(),
            original_price: 50000,
            discounted_price: 40000,
            description: "가죽 지갑입니다.".to_string(),
            category: Category::Wallet,
            keywords: vec!["가죽".to_string(), "지갑".to_string()],
            images: vec!["url1".to_string(), "url2".to_string()],
            options: vec![OptionCreateData {
                label: "색상".to_string(),
                price: None,
                options: vec![
                    OptionCreateData {
                        label: "브라운".to_string(),
                        price: Some(1000),
                        options: vec![],
                    },
                    OptionCreateData {
                        label: "블랙".to_string(),
                        price: Some(2000),
                        options: vec![],
                    },
                ],
            }],
        }
    }

    #[test]
    fn valid_request_passes_validation() {
        assert!(wallet_request("만두 지갑").validate().is_ok());
    }

    #[test]
    fn empty_name_fails_validation() {
        assert!(wallet_request("").validate().is_err());
    }

    #[test]
    fn negative_price_fails_validation() {
        let mut request = wallet_request("만두 지갑");
        request.original_price = -1;
        assert!(request.validate().is_err());
    }

    #[test]
    fn empty_nested_option_label_fails_validation() {
        let mut request = wallet_request("만두 지갑");
        request.options[0].options[0].label = String::new();
        assert!(request.validate().is_err());
    }
}
