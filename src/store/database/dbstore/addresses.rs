use chrono::{DateTime, Utc};
use sqlx::FromRow;
use ulid::Ulid;

use crate::models::order::{Address, AddressDraft};
use crate::store::database::dbstore::StorefrontStoreImpl;
use crate::store::database::errors::{handle_db_error, DBError};

#[derive(Debug, FromRow)]
struct AddressRow {
  id: String,
  user_id: String,
  name: String,
  address_line1: String,
  address_line2: Option<String>,
  city: String,
  state: String,
  postal_code: String,
  country: String,
  phone: String,
  is_default: bool,
  created_at: DateTime<Utc>,
}

const ADDRESS_COLUMNS: &str =
  "id, user_id, name, address_line1, address_line2, city, state, postal_code, country, \
   phone, is_default, created_at";

pub(super) async fn address_list(
  s: &StorefrontStoreImpl,
  user_id: &str,
) -> Result<Vec<Address>, DBError> {
  let op = "storefront.store.address_list";

  let sql = format!(
    "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE user_id = $1 \
     ORDER BY is_default DESC, created_at DESC"
  );
  let rows: Vec<AddressRow> = sqlx::query_as::<_, AddressRow>(&sql)
    .bind(user_id)
    .fetch_all(s.db.as_ref())
    .await
    .map_err(|err| handle_db_error(err, op))?;

  Ok(rows.into_iter().map(address_from_row).collect())
}

pub(super) async fn address_create(
  s: &StorefrontStoreImpl,
  draft: &AddressDraft,
) -> Result<Address, DBError> {
  let op = "storefront.store.address_create";

  let mut tx = s.db.begin().await.map_err(|err| handle_db_error(err, op))?;

  let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
    .bind(&draft.user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| handle_db_error(err, op))?;

  // The first saved address always becomes the default.
  let is_default = draft.is_default || existing == 0;
  if draft.is_default && existing > 0 {
    sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1")
      .bind(&draft.user_id)
      .execute(&mut *tx)
      .await
      .map_err(|err| handle_db_error(err, op))?;
  }

  let address_id = Ulid::new().to_string();
  let created_at: DateTime<Utc> = sqlx::query_scalar(
    "INSERT INTO addresses \
       (id, user_id, name, address_line1, address_line2, city, state, postal_code, country, \
        phone, is_default) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
     RETURNING created_at",
  )
  .bind(&address_id)
  .bind(&draft.user_id)
  .bind(&draft.name)
  .bind(&draft.address_line1)
  .bind(&draft.address_line2)
  .bind(&draft.city)
  .bind(&draft.state)
  .bind(&draft.postal_code)
  .bind(&draft.country)
  .bind(&draft.phone)
  .bind(is_default)
  .fetch_one(&mut *tx)
  .await
  .map_err(|err| handle_db_error(err, op))?;

  tx.commit().await.map_err(|err| handle_db_error(err, op))?;

  Ok(Address {
    id: address_id,
    user_id: draft.user_id.clone(),
    name: draft.name.clone(),
    address_line1: draft.address_line1.clone(),
    address_line2: draft.address_line2.clone(),
    city: draft.city.clone(),
    state: draft.state.clone(),
    postal_code: draft.postal_code.clone(),
    country: draft.country.clone(),
    phone: draft.phone.clone(),
    is_default,
    created_at,
  })
}

fn address_from_row(row: AddressRow) -> Address {
  Address {
    id: row.id,
    user_id: row.user_id,
    name: row.name,
    address_line1: row.address_line1,
    address_line2: row.address_line2,
    city: row.city,
    state: row.state,
    postal_code: row.postal_code,
    country: row.country,
    phone: row.phone,
    is_default: row.is_default,
    created_at: row.created_at,
  }
}
