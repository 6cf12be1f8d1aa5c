use std::collections::{HashMap, HashSet, VecDeque};

use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    SqlErr, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::products::{OptionCreateData, ProductCreateRequest, ProductList},
    entity::{Images, Keywords, ProductOptions, Products, images, keywords, product_options, products},
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::{Category, Image, Keyword, ProductDetail, ProductOption, ProductSummary},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Summaries for every stored product, in repository iteration order.
pub async fn list_products(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let rows = Products::find()
        .find_with_related(Images)
        .all(&state.orm)
        .await?;

    let total = rows.len() as i64;
    let items: Vec<ProductSummary> = rows
        .into_iter()
        .map(|(product, mut images)| {
            images.sort_by_key(|image| image.position);
            ProductSummary {
                id: product.id,
                name: product.name,
                original_price: product.original_price,
                discounted_price: product.discounted_price,
                image_url: images.into_iter().next().map(|image| image.url),
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::total_only(total)),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::ProductNotFound(id))?;

    let keywords = Keywords::find()
        .filter(keywords::Column::ProductId.eq(id))
        .order_by_asc(keywords::Column::Label)
        .all(&state.orm)
        .await?;

    let images = Images::find()
        .filter(images::Column::ProductId.eq(id))
        .order_by_asc(images::Column::Position)
        .all(&state.orm)
        .await?;

    let option_rows = ProductOptions::find()
        .filter(product_options::Column::ProductId.eq(id))
        .order_by_asc(product_options::Column::Position)
        .all(&state.orm)
        .await?;

    let category = product
        .category
        .parse::<Category>()
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

    let detail = ProductDetail {
        id: product.id,
        name: product.name,
        original_price: product.original_price,
        discounted_price: product.discounted_price,
        description: product.description,
        category,
        keywords: keywords
            .into_iter()
            .map(|k| Keyword {
                id: k.id,
                label: k.label,
            })
            .collect(),
        images: images
            .into_iter()
            .map(|i| Image { id: i.id, url: i.url })
            .collect(),
        options: build_option_tree(option_rows),
    };

    Ok(ApiResponse::success("Product", detail, None))
}

/// Persist a product aggregate (product + keywords + images + options) as
/// one transaction and return the new id. Authorization is the route
/// guard's job; the caller is assumed to be an admin.
pub async fn create_product(
    state: &AppState,
    user: &CurrentUser,
    payload: ProductCreateRequest,
) -> AppResult<Uuid> {
    let duplicated = Products::find()
        .filter(products::Column::Name.eq(payload.name.as_str()))
        .count(&state.orm)
        .await?
        > 0;
    if duplicated {
        return Err(AppError::NameDuplication(payload.name));
    }

    let id = Uuid::new_v4();
    let txn = state.orm.begin().await?;

    let product = products::ActiveModel {
        id: Set(id),
        name: Set(payload.name.clone()),
        original_price: Set(payload.original_price),
        discounted_price: Set(payload.discounted_price),
        description: Set(payload.description),
        category: Set(payload.category.as_str().to_string()),
        created_at: NotSet,
    };

    // The UNIQUE constraint on the name is the authoritative guard; a
    // concurrent creation slipping past the count above still lands here.
    match product.insert(&txn).await {
        Ok(_) => {}
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::NameDuplication(payload.name));
        }
        Err(err) => return Err(err.into()),
    }

    let mut seen = HashSet::new();
    for label in payload.keywords {
        // Keywords are a set keyed by label.
        if !seen.insert(label.clone()) {
            continue;
        }
        keywords::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(id),
            label: Set(label),
        }
        .insert(&txn)
        .await?;
    }

    for (position, url) in payload.images.into_iter().enumerate() {
        images::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(id),
            url: Set(url),
            position: Set(position as i32),
        }
        .insert(&txn)
        .await?;
    }

    for row in flatten_options(&payload.options) {
        product_options::ActiveModel {
            id: Set(row.id),
            product_id: Set(id),
            parent_option_id: Set(row.parent_id),
            label: Set(row.label),
            price: Set(row.price),
            position: Set(row.position),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(id)
}

struct OptionRow {
    id: Uuid,
    parent_id: Option<Uuid>,
    label: String,
    price: Option<i64>,
    position: i32,
}

/// Flatten a request option tree into arena rows. Parents are emitted
/// before their children, so inserting in order satisfies the self
/// foreign key; acyclicity holds because the input is tree-shaped.
fn flatten_options(options: &[OptionCreateData]) -> Vec<OptionRow> {
    let mut rows = Vec::new();
    let mut queue: VecDeque<(Option<Uuid>, &[OptionCreateData])> = VecDeque::new();
    queue.push_back((None, options));

    while let Some((parent_id, group)) = queue.pop_front() {
        for (position, data) in group.iter().enumerate() {
            let id = Uuid::new_v4();
            rows.push(OptionRow {
                id,
                parent_id,
                label: data.label.clone(),
                price: data.price,
                position: position as i32,
            });
            if !data.options.is_empty() {
                queue.push_back((Some(id), &data.options));
            }
        }
    }

    rows
}

/// Rebuild the option tree from arena rows. Every row is consumed at most
/// once while walking down from the roots, so a corrupt parent link can
/// drop rows but never loop.
fn build_option_tree(rows: Vec<product_options::Model>) -> Vec<ProductOption> {
    let mut by_parent: HashMap<Option<Uuid>, Vec<product_options::Model>> = HashMap::new();
    for row in rows {
        by_parent.entry(row.parent_option_id).or_default().push(row);
    }
    build_subtree(None, &mut by_parent)
}

fn build_subtree(
    parent: Option<Uuid>,
    by_parent: &mut HashMap<Option<Uuid>, Vec<product_options::Model>>,
) -> Vec<ProductOption> {
    let Some(mut rows) = by_parent.remove(&parent) else {
        return Vec::new();
    };
    rows.sort_by_key(|row| row.position);
    rows.into_iter()
        .map(|row| {
            let options = build_subtree(Some(row.id), by_parent);
            ProductOption {
                id: row.id,
                label: row.label,
                price: row.price,
                options,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(label: &str, price: Option<i64>, options: Vec<OptionCreateData>) -> OptionCreateData {
        OptionCreateData {
            label: label.to_string(),
            price,
            options,
        }
    }

    fn to_entity_rows(rows: Vec<OptionRow>, product_id: Uuid) -> Vec<product_options::Model> {
        rows.into_iter()
            .map(|row| product_options::Model {
                id: row.id,
                product_id,
                parent_option_id: row.parent_id,
                label: row.label,
                price: row.price,
                position: row.position,
            })
            .collect()
    }

    #[test]
    fn flattening_keeps_parents_before_children() {
        let tree = vec![option(
            "색상",
            None,
            vec![
                option("브라운", Some(1000), vec![]),
                option("블랙", Some(2000), vec![]),
            ],
        )];

        let rows = flatten_options(&tree);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].parent_id, None);
        assert_eq!(rows[1].parent_id, Some(rows[0].id));
        assert_eq!(rows[2].parent_id, Some(rows[0].id));
    }

    #[test]
    fn flatten_then_rebuild_round_trips_the_tree() {
        let tree = vec![
            option(
                "색상",
                None,
                vec![
                    option("브라운", Some(1000), vec![]),
                    option("블랙", Some(2000), vec![]),
                ],
            ),
            option(
                "이름 각인",
                None,
                vec![option("유", Some(3000), vec![]), option("무", Some(4000), vec![])],
            ),
        ];

        let rows = to_entity_rows(flatten_options(&tree), Uuid::new_v4());
        let rebuilt = build_option_tree(rows);

        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt[0].label, "색상");
        assert_eq!(rebuilt[0].options.len(), 2);
        assert_eq!(rebuilt[0].options[0].label, "브라운");
        assert_eq!(rebuilt[0].options[0].price, Some(1000));
        assert_eq!(rebuilt[0].options[1].label, "블랙");
        assert_eq!(rebuilt[1].label, "이름 각인");
        assert_eq!(rebuilt[1].options[1].price, Some(4000));
    }

    #[test]
    fn rebuild_survives_a_corrupt_parent_link() {
        let product_id = Uuid::new_v4();
        let orphan_parent = Uuid::new_v4();
        let rows = vec![product_options::Model {
            id: Uuid::new_v4(),
            product_id,
            parent_option_id: Some(orphan_parent),
            label: "고아".to_string(),
            price: None,
            position: 0,
        }];

        // The orphan is unreachable from the roots and simply dropped.
        assert!(build_option_tree(rows).is_empty());
    }

    #[test]
    fn empty_option_list_flattens_to_no_rows() {
        assert!(flatten_options(&[]).is_empty());
    }
}
