//! Plain CRUD over the catalog entities offered on cards and invitations

use std::time::Duration;

use sqlx::SqlitePool;

use super::{acquire, guarded};
use crate::aggregate::WriteContext;
use crate::config::Config;
use crate::error::Result;
use crate::models::{bank, invitation_category, social_media, Bank, InvitationCategory, SocialMedia};
use crate::repository::{
    ActorId, Entity, EntityRepository, Id, ListParams, PaginatedResult, Repository,
    RepositoryConfig, RepositoryOperation,
};

/// An entity managed as a flat catalog
pub trait CatalogEntity: Entity {
    /// Sort whitelist and relations for this catalog
    fn repository_config() -> RepositoryConfig<Self>;
}

impl CatalogEntity for Bank {
    fn repository_config() -> RepositoryConfig<Self> {
        bank::repository_config()
    }
}

impl CatalogEntity for SocialMedia {
    fn repository_config() -> RepositoryConfig<Self> {
        social_media::repository_config()
    }
}

impl CatalogEntity for InvitationCategory {
    fn repository_config() -> RepositoryConfig<Self> {
        invitation_category::repository_config()
    }
}

pub type BankService = CatalogService<Bank>;
pub type SocialMediaService = CatalogService<SocialMedia>;
pub type InvitationCategoryService = CatalogService<InvitationCategory>;

/// Single-table CRUD for a [`CatalogEntity`]
pub struct CatalogService<E> {
    repository: EntityRepository<E>,
    write_timeout: Duration,
}

impl<E> Clone for CatalogService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            write_timeout: self.write_timeout,
        }
    }
}

impl<E> std::fmt::Debug for CatalogService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("repository", &self.repository)
            .field("write_timeout", &self.write_timeout)
            .finish()
    }
}

impl<E: CatalogEntity> CatalogService<E> {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            repository: EntityRepository::new(pool, E::repository_config()),
            write_timeout: config.service.write_timeout(),
        }
    }

    /// Context bounded by the configured write timeout
    pub fn write_context(&self) -> WriteContext {
        WriteContext::new().with_timeout(self.write_timeout)
    }

    pub fn repository(&self) -> &EntityRepository<E> {
        &self.repository
    }

    pub async fn get_all(&self, params: &ListParams) -> PaginatedResult<E> {
        PaginatedResult::or_empty(self.repository.get_all(params).await, params, E::NAME)
    }

    pub async fn get_by_id(&self, id: Id) -> Result<E> {
        Ok(self.repository.get_by_id(id).await?)
    }

    pub async fn create(&self, ctx: &WriteContext, entity: &E, actor: ActorId) -> Result<Id> {
        let operation = RepositoryOperation::Create;
        let mut conn = acquire(self.repository.pool(), operation).await?;
        let id = guarded(
            ctx,
            operation,
            E::NAME,
            self.repository.create(&mut *conn, entity, actor),
        )
        .await?;
        tracing::info!(entity = E::NAME, id, %actor, "Created");
        Ok(id)
    }

    /// Overwrite every writable column of row `id` with `entity`
    pub async fn update(
        &self,
        ctx: &WriteContext,
        id: Id,
        entity: &E,
        actor: ActorId,
    ) -> Result<()> {
        let operation = RepositoryOperation::Update;
        let patch = entity.patch();
        let mut conn = acquire(self.repository.pool(), operation).await?;
        guarded(
            ctx,
            operation,
            E::NAME,
            self.repository.update(&mut *conn, id, &patch, actor),
        )
        .await?;
        tracing::info!(entity = E::NAME, id, %actor, "Updated");
        Ok(())
    }

    pub async fn delete(&self, ctx: &WriteContext, id: Id) -> Result<()> {
        let operation = RepositoryOperation::Delete;
        let mut conn = acquire(self.repository.pool(), operation).await?;
        guarded(ctx, operation, E::NAME, self.repository.delete(&mut *conn, id)).await?;
        tracing::info!(entity = E::NAME, id, "Deleted");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(self.repository.count().await?)
    }
}
