//! Repository trait definitions
//!
//! [`Repository`] uses RPITIT (Return Position Impl Trait In Traits) for async
//! methods without boxing. [`RelationLoader`] is object safe so a repository
//! can hold a heterogeneous list of loaders for one entity type.
//!
//! # Example
//!
//! ```rust,ignore
//! use davet_store::repository::{ActorId, ListParams, Repository};
//!
//! let (cards, total) = repo.get_all(&ListParams::default()).await?;
//! let id = repo.create(&mut conn, &card, ActorId::UNKNOWN).await?;
//! ```

use std::future::Future;

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use super::audit::ActorId;
use super::entity::{Entity, FieldPatch, Id};
use super::error::RepositoryError;
use super::filter::FilterCondition;
use super::pagination::ListParams;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// CRUD, bulk and counting operations over one entity type
///
/// Reads run against the repository's pool. Writes take the connection to run
/// on, so the caller decides whether they share a transaction: pass a pooled
/// connection for a standalone write or `&mut *tx` to join an open transaction.
pub trait Repository<E: Entity>: Send + Sync {
    /// One page of entities plus the total row count
    ///
    /// The sort column is checked against the whitelist and replaced by the
    /// default column when not allowed. The total ignores paging.
    fn get_all(
        &self,
        params: &ListParams,
    ) -> impl Future<Output = RepositoryResult<(Vec<E>, i64)>> + Send;

    /// One page of the entities owned by `owner_id`, plus the owner's row count
    ///
    /// # Errors
    ///
    /// `ValidationFailed` when the entity has no owner column.
    fn get_all_by_owner(
        &self,
        owner_id: Id,
        params: &ListParams,
    ) -> impl Future<Output = RepositoryResult<(Vec<E>, i64)>> + Send;

    /// One page of the entities matching every filter, plus the matching count
    fn find_all(
        &self,
        filters: &[FilterCondition],
        params: &ListParams,
    ) -> impl Future<Output = RepositoryResult<(Vec<E>, i64)>> + Send;

    /// A single entity with its relations loaded
    ///
    /// # Errors
    ///
    /// `NotFound` when no row has this id.
    fn get_by_id(&self, id: Id) -> impl Future<Output = RepositoryResult<E>> + Send;

    /// Insert `entity` and return the generated id
    fn create(
        &self,
        conn: &mut SqliteConnection,
        entity: &E,
        actor: ActorId,
    ) -> impl Future<Output = RepositoryResult<Id>> + Send;

    /// Apply `patch` to the row with this id
    ///
    /// # Errors
    ///
    /// `ValidationFailed` for columns that are not writable, `NotFound` when no
    /// row has this id.
    fn update(
        &self,
        conn: &mut SqliteConnection,
        id: Id,
        patch: &FieldPatch,
        actor: ActorId,
    ) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Delete the row with this id
    ///
    /// # Errors
    ///
    /// `NotFound` when no row has this id.
    fn delete(
        &self,
        conn: &mut SqliteConnection,
        id: Id,
    ) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Insert every entity, returning ids in input order
    fn bulk_create(
        &self,
        conn: &mut SqliteConnection,
        entities: &[E],
        actor: ActorId,
    ) -> impl Future<Output = RepositoryResult<Vec<Id>>> + Send;

    /// Apply `patch` to every row matching `filters`, returning the affected count
    ///
    /// # Errors
    ///
    /// `ValidationFailed` when `filters` is empty.
    fn bulk_update(
        &self,
        conn: &mut SqliteConnection,
        filters: &[FilterCondition],
        patch: &FieldPatch,
        actor: ActorId,
    ) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Delete every row matching `filters`, returning the affected count
    ///
    /// # Errors
    ///
    /// `ValidationFailed` when `filters` is empty.
    fn bulk_delete(
        &self,
        conn: &mut SqliteConnection,
        filters: &[FilterCondition],
    ) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Total number of rows
    fn count(&self) -> impl Future<Output = RepositoryResult<i64>> + Send;

    /// Number of rows matching `filters`
    fn count_where(
        &self,
        filters: &[FilterCondition],
    ) -> impl Future<Output = RepositoryResult<i64>> + Send;

    /// Whether a row with this id exists
    fn exists(&self, id: Id) -> impl Future<Output = RepositoryResult<bool>> + Send;
}

/// Eager loader attaching related rows to already-fetched entities
///
/// Implementations batch by the ids of the whole slice so a page of N parents
/// costs one query per relation, never N.
#[async_trait]
pub trait RelationLoader<E: Entity>: Send + Sync {
    /// Relation name, for logs and errors
    fn name(&self) -> &'static str;

    /// Load the relation for every entity in `entities`
    async fn attach(&self, pool: &SqlitePool, entities: &mut [E]) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_result_type() {
        let ok_result: RepositoryResult<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: RepositoryResult<i32> = Err(RepositoryError::not_found("Card", 123));
        assert!(err_result.unwrap_err().is_not_found());
    }
}
