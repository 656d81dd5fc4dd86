//! `PostgreSQL` backend for the Credential Store.

use async_trait::async_trait;
use checkout_bridge_core::StoreId;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

use super::{
    CredentialUpsert, RepositoryError, StoreCredentialRecord, StoreRepository, join_scopes,
    split_scopes,
};

/// Internal row type for `PostgreSQL` queries.
#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    store_id: String,
    access_token: String,
    shop_name: String,
    scopes: Option<String>,
    domain: Option<String>,
    logo: Option<String>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for StoreCredentialRecord {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let store_id = StoreId::parse(&row.store_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("stores.store_id {:?}: {e}", row.store_id))
        })?;

        Ok(Self {
            store_id,
            access_token: SecretString::from(row.access_token),
            shop_name: row.shop_name,
            scopes: split_scopes(row.scopes.as_deref()),
            domain: row.domain,
            logo: row.logo,
            updated_at: row.updated_at,
        })
    }
}

const RETURNING: &str = "store_id, access_token, shop_name, scopes, domain, logo, updated_at";

/// Repository for store credentials in `PostgreSQL`.
///
/// Each call checks a connection out of the pool for one statement (or one
/// transaction); the connection goes back to the pool when the call
/// completes, errors, or is dropped mid-flight. A transaction dropped before
/// commit rolls back.
#[derive(Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn find(
        &self,
        store_id: &StoreId,
    ) -> Result<Option<StoreCredentialRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {RETURNING} FROM stores WHERE store_id = $1"
        ))
        .bind(store_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(StoreCredentialRecord::try_from).transpose()
    }

    async fn upsert_credential(
        &self,
        upsert: &CredentialUpsert,
    ) -> Result<StoreCredentialRecord, RepositoryError> {
        // Last writer wins: no version check on conflict.
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            r"
            INSERT INTO stores (store_id, access_token, shop_name, scopes, domain, logo, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (store_id) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                shop_name = EXCLUDED.shop_name,
                scopes = EXCLUDED.scopes,
                domain = COALESCE(EXCLUDED.domain, stores.domain),
                logo = COALESCE(EXCLUDED.logo, stores.logo),
                updated_at = EXCLUDED.updated_at
            RETURNING {RETURNING}
            "
        ))
        .bind(upsert.store_id.as_str())
        .bind(upsert.access_token.expose_secret())
        .bind(&upsert.shop_name)
        .bind(join_scopes(&upsert.scopes))
        .bind(upsert.domain.as_deref())
        .bind(upsert.logo.as_deref())
        .bind(upsert.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update_domain(
        &self,
        store_id: &StoreId,
        domain: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE stores SET domain = $2, updated_at = $3 WHERE store_id = $1")
                .bind(store_id.as_str())
                .bind(domain)
                .bind(updated_at)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(
        &self,
        store_id: &StoreId,
    ) -> Result<Option<StoreCredentialRecord>, RepositoryError> {
        // Decode under a row lock before deleting, so a corrupt row is
        // reported without having been removed.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {RETURNING} FROM stores WHERE store_id = $1 FOR UPDATE"
        ))
        .bind(store_id.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = row.map(StoreCredentialRecord::try_from).transpose()? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM stores WHERE store_id = $1")
            .bind(store_id.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(record))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(store_id: &str) -> StoreRow {
        StoreRow {
            store_id: store_id.to_string(),
            access_token: "tok".to_string(),
            shop_name: "Tienda".to_string(),
            scopes: Some("read_products,write_orders".to_string()),
            domain: Some("shop.example".to_string()),
            logo: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_record() {
        let record = StoreCredentialRecord::try_from(row("555")).unwrap();
        assert_eq!(record.store_id.as_str(), "555");
        assert_eq!(record.scopes, vec!["read_products", "write_orders"]);
        assert_eq!(record.domain.as_deref(), Some("shop.example"));
    }

    #[test]
    fn test_corrupt_store_id_is_data_corruption() {
        let err = StoreCredentialRecord::try_from(row("55 5;")).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
