//! Atomic create/update/delete of an aggregate root and its children

use sqlx::{Connection, Sqlite, SqliteConnection, Transaction};

use super::children::ChildSet;
use super::context::{Interrupted, WriteContext};
use super::Aggregate;
use crate::repository::{
    ActorId, EntityRepository, Id, Repository, RepositoryError, RepositoryOperation,
    RepositoryResult,
};

/// Transaction scope for one aggregate write
#[derive(Debug)]
pub enum Session<'c> {
    /// Open a new transaction on the writer's pool and commit it on success
    Begin,
    /// Run inside the caller's open transaction as a savepoint
    ///
    /// The caller keeps ownership of the outer transaction: a failed write
    /// rolls back to the savepoint, a successful one releases it, and nothing
    /// is durable until the caller commits.
    Join(&'c mut SqliteConnection),
}

/// Writes an aggregate root together with its child collections
///
/// Every operation runs as one transaction: the root row, a full delete of the
/// stored children and an insert of the new child snapshot either all persist
/// or none do.
pub struct AggregateWriter<A> {
    repository: EntityRepository<A>,
}

impl<A> Clone for AggregateWriter<A> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<A> std::fmt::Debug for AggregateWriter<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateWriter")
            .field("repository", &self.repository)
            .finish()
    }
}

impl<A: Aggregate> AggregateWriter<A> {
    /// Writer persisting roots through `repository`
    pub fn new(repository: EntityRepository<A>) -> Self {
        Self { repository }
    }

    /// Repository used for the root row
    pub fn repository(&self) -> &EntityRepository<A> {
        &self.repository
    }

    /// Insert `root` and its children, returning the new root id
    pub async fn create(
        &self,
        ctx: &WriteContext,
        session: Session<'_>,
        mut root: A,
        actor: ActorId,
    ) -> RepositoryResult<Id> {
        let operation = RepositoryOperation::Create;
        let mut children = root.take_children();
        let mut tx = self.begin(ctx, session, operation).await?;

        let work = async {
            let id = self.repository.create(&mut *tx, &root, actor).await?;
            children.insert_all(&mut *tx, id).await?;
            Ok::<_, RepositoryError>(id)
        };
        let outcome = ctx.guard(work).await;

        let id = self.finish(tx, outcome, operation).await?;
        tracing::debug!(
            entity = A::NAME,
            id,
            children = children.row_count(),
            %actor,
            "Created aggregate"
        );
        Ok(id)
    }

    /// Overwrite root `id` with `root` and replace all of its children
    ///
    /// Every writable column of the root is written; stored children are
    /// deleted and the snapshot carried by `root` is inserted in their place.
    pub async fn update(
        &self,
        ctx: &WriteContext,
        session: Session<'_>,
        id: Id,
        mut root: A,
        actor: ActorId,
    ) -> RepositoryResult<()> {
        let operation = RepositoryOperation::Update;
        let mut children = root.take_children();
        let patch = root.patch();
        let mut tx = self.begin(ctx, session, operation).await?;

        let work = async {
            self.repository.update(&mut *tx, id, &patch, actor).await?;
            A::Children::delete_all(&mut *tx, id).await?;
            children.insert_all(&mut *tx, id).await?;
            Ok::<_, RepositoryError>(())
        };
        let outcome = ctx.guard(work).await;

        self.finish(tx, outcome, operation).await?;
        tracing::debug!(
            entity = A::NAME,
            id,
            children = children.row_count(),
            %actor,
            "Replaced aggregate"
        );
        Ok(())
    }

    /// Delete root `id` and all of its children
    pub async fn delete(
        &self,
        ctx: &WriteContext,
        session: Session<'_>,
        id: Id,
    ) -> RepositoryResult<()> {
        let operation = RepositoryOperation::Delete;
        let mut tx = self.begin(ctx, session, operation).await?;

        let work = async {
            let removed = A::Children::delete_all(&mut *tx, id).await?;
            self.repository.delete(&mut *tx, id).await?;
            Ok::<_, RepositoryError>(removed)
        };
        let outcome = ctx.guard(work).await;

        let removed = self.finish(tx, outcome, operation).await?;
        tracing::debug!(entity = A::NAME, id, children = removed, "Deleted aggregate");
        Ok(())
    }

    async fn begin<'c>(
        &self,
        ctx: &WriteContext,
        session: Session<'c>,
        operation: RepositoryOperation,
    ) -> RepositoryResult<Transaction<'c, Sqlite>> {
        let pool = self.repository.pool();
        let begin = async move {
            match session {
                Session::Begin => pool.begin().await,
                Session::Join(conn) => conn.begin().await,
            }
        };

        match ctx.guard(begin).await {
            Ok(Ok(tx)) => Ok(tx),
            Ok(Err(e)) => Err(RepositoryError::from_sqlx(RepositoryOperation::Transaction, e)
                .abort_transaction(operation)
                .with_entity_type(A::NAME)),
            Err(interrupted) => Err(interrupted.into_error(operation).with_entity_type(A::NAME)),
        }
    }

    async fn finish<T>(
        &self,
        tx: Transaction<'_, Sqlite>,
        outcome: Result<RepositoryResult<T>, Interrupted>,
        operation: RepositoryOperation,
    ) -> RepositoryResult<T> {
        let err = match outcome {
            Ok(Ok(value)) => {
                return match tx.commit().await {
                    Ok(()) => Ok(value),
                    Err(e) => Err(RepositoryError::from_sqlx(RepositoryOperation::Transaction, e)
                        .abort_transaction(operation)
                        .with_entity_type(A::NAME)),
                };
            }
            Ok(Err(e)) => e.abort_transaction(operation),
            Err(interrupted) => interrupted.into_error(operation).with_entity_type(A::NAME),
        };

        tracing::error!(entity = A::NAME, %operation, error = %err, "Rolling back aggregate write");
        if let Err(e) = tx.rollback().await {
            tracing::error!(entity = A::NAME, %operation, error = %e, "Rollback failed");
        }
        Err(err)
    }
}
