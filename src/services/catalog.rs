//! Author and genre management, one service generic over the entity

use std::marker::PhantomData;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{AuditFields, ListQuery, NamedDraft, NamedEntity, NamedInput, Page},
    repository::Repository,
};

pub const NAME_TAKEN_MESSAGE: &str = "The name has already been taken.";

pub struct NamedCatalogService<E> {
    repository: Repository,
    max_page_size: i64,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for NamedCatalogService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            max_page_size: self.max_page_size,
            _entity: PhantomData,
        }
    }
}

impl<E> NamedCatalogService<E>
where
    E: NamedEntity + for<'a> utoipa::ToSchema<'a>,
{
    pub fn new(repository: Repository, max_page_size: i64) -> Self {
        Self {
            repository,
            max_page_size,
            _entity: PhantomData,
        }
    }

    pub async fn list(&self, query: &ListQuery) -> AppResult<Page<E>> {
        let params = query.resolve::<E>(self.max_page_size)?;
        let (rows, total) = self.repository.catalog_list::<E>(&params).await?;
        Ok(Page::new(rows, &params, total))
    }

    pub async fn view(&self, id: i64) -> AppResult<E> {
        self.repository
            .catalog_find::<E>(id)
            .await?
            .ok_or_else(E::not_found)
    }

    pub async fn create(&self, input: NamedInput, acting_user_id: i64) -> AppResult<E> {
        let input = input.normalized();
        self.validate(&input, None).await?;

        let draft = draft(&input, AuditFields::created(acting_user_id, Utc::now()))?;
        let record = self.repository.named_create::<E>(&draft).await?;

        tracing::info!("{} {} created by user {}", E::LABEL, record.id(), acting_user_id);
        Ok(record)
    }

    /// Fields are validated before the record is looked up
    pub async fn update(&self, input: NamedInput, acting_user_id: i64) -> AppResult<E> {
        let input = input.normalized();
        self.validate(&input, input.id).await?;

        let id = input.id.ok_or_else(E::not_found)?;
        let draft = draft(&input, AuditFields::updated(acting_user_id, Utc::now()))?;
        let record = self
            .repository
            .named_update::<E>(id, &draft)
            .await?
            .ok_or_else(E::not_found)?;

        tracing::info!("{} {} updated by user {}", E::LABEL, id, acting_user_id);
        Ok(record)
    }

    pub async fn delete(&self, id: Option<i64>) -> AppResult<i64> {
        let id = id.ok_or_else(E::not_found)?;
        if !self.repository.catalog_delete::<E>(id).await? {
            return Err(E::not_found());
        }

        tracing::info!("{} {} deleted", E::LABEL, id);
        Ok(id)
    }

    /// Collect every field error, including name uniqueness where the entity requires it
    async fn validate(&self, input: &NamedInput, exclude_id: Option<i64>) -> AppResult<()> {
        let mut errors = input.field_errors();

        if E::UNIQUE_NAME {
            if let Some(name) = input.name.as_deref() {
                if self
                    .repository
                    .catalog_value_taken::<E>("name", name, exclude_id)
                    .await?
                {
                    errors.add("name", NAME_TAKEN_MESSAGE);
                }
            }
        }

        errors.into_result()
    }
}

fn draft(input: &NamedInput, audit: AuditFields) -> AppResult<NamedDraft> {
    let name = input
        .name
        .clone()
        .ok_or_else(|| AppError::Internal("validated input lacks a name".to_string()))?;

    Ok(NamedDraft {
        name,
        description: input.description.clone(),
        audit,
    })
}
