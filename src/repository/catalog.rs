//! Generic catalog table access on Repository

use sqlx::{Postgres, QueryBuilder};

use super::Repository;
use crate::{
    error::AppResult,
    models::{CatalogEntity, ListParams, NamedDraft, NamedEntity},
};

fn push_keyword_filter<E: CatalogEntity>(builder: &mut QueryBuilder<'_, Postgres>, pattern: Option<&str>) {
    if let Some(pattern) = pattern {
        builder
            .push(format!(" WHERE {} ILIKE ", E::SEARCH_COLUMN))
            .push_bind(pattern.to_string());
    }
}

impl Repository {
    /// One page of records plus the total matching the keyword filter
    pub async fn catalog_list<E: CatalogEntity>(&self, params: &ListParams) -> AppResult<(Vec<E>, i64)> {
        let pattern = params.keyword_pattern();

        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", E::TABLE));
        push_keyword_filter::<E>(&mut count, pattern.as_deref());
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        // sort_field comes from the entity's allow-list, never from raw input
        let order = params.sort_order.as_sql();
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", E::TABLE));
        push_keyword_filter::<E>(&mut select, pattern.as_deref());
        select.push(format!(" ORDER BY {} {}, id {}", params.sort_field, order, order));
        select.push(" LIMIT ").push_bind(params.limit);
        select.push(" OFFSET ").push_bind(params.offset());

        let rows = select.build_query_as::<E>().fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    pub async fn catalog_find<E: CatalogEntity>(&self, id: i64) -> AppResult<Option<E>> {
        let query = format!("SELECT * FROM {} WHERE id = $1", E::TABLE);
        let row = sqlx::query_as::<_, E>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn catalog_find_many<E: CatalogEntity>(&self, ids: &[i64]) -> AppResult<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT * FROM {} WHERE id = ANY($1)", E::TABLE);
        let rows = sqlx::query_as::<_, E>(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn catalog_exists<E: CatalogEntity>(&self, id: i64) -> AppResult<bool> {
        let query = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", E::TABLE);
        let exists: bool = sqlx::query_scalar(&query)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Ids among `ids` with no matching row, in request order
    pub async fn catalog_missing<E: CatalogEntity>(&self, ids: &[i64]) -> AppResult<Vec<i64>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT id FROM {} WHERE id = ANY($1)", E::TABLE);
        let found: Vec<i64> = sqlx::query_scalar(&query)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// Whether another row already holds `value` in `column`
    pub async fn catalog_value_taken<E: CatalogEntity>(
        &self,
        column: &'static str,
        value: &str,
        exclude_id: Option<i64>,
    ) -> AppResult<bool> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
            E::TABLE,
            column
        );
        let taken: bool = sqlx::query_scalar(&query)
            .bind(value)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(taken)
    }

    /// Delete by id; `false` when no row matched
    pub async fn catalog_delete<E: CatalogEntity>(&self, id: i64) -> AppResult<bool> {
        let query = format!("DELETE FROM {} WHERE id = $1", E::TABLE);
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn named_create<E: NamedEntity>(&self, draft: &NamedDraft) -> AppResult<E> {
        let query = format!(
            r#"
            INSERT INTO {} (name, description, created_by, updated_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()), COALESCE($6, NOW()))
            RETURNING *
            "#,
            E::TABLE
        );
        let row = sqlx::query_as::<_, E>(&query)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.audit.created_by)
            .bind(draft.audit.updated_by)
            .bind(draft.audit.created_at)
            .bind(draft.audit.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Update name, and description when supplied; `None` when no row matched
    pub async fn named_update<E: NamedEntity>(&self, id: i64, draft: &NamedDraft) -> AppResult<Option<E>> {
        let query = format!(
            r#"
            UPDATE {}
            SET name = $1,
                description = COALESCE($2, description),
                updated_by = $3,
                updated_at = COALESCE($4, NOW())
            WHERE id = $5
            RETURNING *
            "#,
            E::TABLE
        );
        let row = sqlx::query_as::<_, E>(&query)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.audit.updated_by)
            .bind(draft.audit.updated_at)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
