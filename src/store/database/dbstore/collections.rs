use sqlx::FromRow;

use crate::models::product::{Collection, Product, ProductImage, ProductListParams};
use crate::store::database::dbstore::products::{assemble_products, ProductRow};
use crate::store::database::dbstore::StorefrontStoreImpl;
use crate::store::database::errors::{handle_db_error, DBError};

#[derive(Debug, FromRow)]
struct CollectionRow {
  id: String,
  title: String,
  handle: String,
  description: Option<String>,
  image_url: Option<String>,
  image_alt_text: Option<String>,
}

pub(super) async fn collection_list(
  s: &StorefrontStoreImpl,
  limit: i64,
) -> Result<Vec<Collection>, DBError> {
  let op = "storefront.store.collection_list";

  let rows: Vec<CollectionRow> = sqlx::query_as::<_, CollectionRow>(
    "SELECT id, title, handle, description, image_url, image_alt_text \
     FROM collections ORDER BY title LIMIT $1",
  )
  .bind(limit.clamp(1, 100))
  .fetch_all(s.db.as_ref())
  .await
  .map_err(|err| handle_db_error(err, op))?;

  let collections = rows
    .into_iter()
    .map(|row| Collection {
      image: row.image_url.map(|url| ProductImage {
        url,
        alt_text: row.image_alt_text.unwrap_or_default(),
        width: 0,
        height: 0,
      }),
      id: row.id,
      title: row.title,
      handle: row.handle,
      description: row.description.unwrap_or_default(),
      path: String::new(),
    })
    .collect();

  Ok(collections)
}

pub(super) async fn collection_products(
  s: &StorefrontStoreImpl,
  handle: &str,
  params: &ProductListParams,
) -> Result<Vec<Product>, DBError> {
  let op = "storefront.store.collection_products";

  let collection_id: Option<String> =
    sqlx::query_scalar("SELECT id FROM collections WHERE handle = $1")
      .bind(handle)
      .fetch_optional(s.db.as_ref())
      .await
      .map_err(|err| handle_db_error(err, op))?;

  // An unknown collection is an empty listing, not an error.
  let Some(collection_id) = collection_id else {
    return Ok(vec![]);
  };

  let limit = params.limit.clamp(1, 250);
  let rows: Vec<ProductRow> = match &params.query {
    Some(query) => {
      sqlx::query_as::<_, ProductRow>(
        "SELECT p.id, p.title, p.description, p.handle, p.available_for_sale, p.currency_code \
         FROM collection_products cp \
         JOIN products p ON p.id = cp.product_id \
         WHERE cp.collection_id = $1 AND p.title ILIKE $2 \
         ORDER BY p.created_at DESC LIMIT $3",
      )
      .bind(&collection_id)
      .bind(format!("%{}%", query))
      .bind(limit)
      .fetch_all(s.db.as_ref())
      .await
      .map_err(|err| handle_db_error(err, op))?
    }
    None => {
      sqlx::query_as::<_, ProductRow>(
        "SELECT p.id, p.title, p.description, p.handle, p.available_for_sale, p.currency_code \
         FROM collection_products cp \
         JOIN products p ON p.id = cp.product_id \
         WHERE cp.collection_id = $1 \
         ORDER BY p.created_at DESC LIMIT $2",
      )
      .bind(&collection_id)
      .bind(limit)
      .fetch_all(s.db.as_ref())
      .await
      .map_err(|err| handle_db_error(err, op))?
    }
  };

  assemble_products(s, rows, op).await
}
