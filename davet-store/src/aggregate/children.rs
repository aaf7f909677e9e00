//! Child collections written by full replacement

use std::future::Future;

use sqlx::SqliteConnection;

use crate::repository::{
    delete_where, insert_entity, ActorId, ChildEntity, FilterCondition, Id, RepositoryOperation,
    RepositoryResult,
};

/// The dependent rows of an aggregate root
///
/// Implemented for `Vec<C>` (zero or more children), `Option<C>` (zero or one)
/// and tuples of child sets, so a root with several collections declares them
/// as `(Vec<A>, Vec<B>)`.
pub trait ChildSet: Send + Sync {
    /// Delete every stored child of `parent_id`, returning the removed count
    fn delete_all(
        conn: &mut SqliteConnection,
        parent_id: Id,
    ) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Point every child at `parent_id` and insert it, returning the inserted count
    fn insert_all(
        &mut self,
        conn: &mut SqliteConnection,
        parent_id: Id,
    ) -> impl Future<Output = RepositoryResult<usize>> + Send;

    /// Number of child rows in this snapshot
    fn row_count(&self) -> usize;
}

impl<C: ChildEntity> ChildSet for Vec<C> {
    async fn delete_all(conn: &mut SqliteConnection, parent_id: Id) -> RepositoryResult<u64> {
        let removed = delete_where::<C>(
            conn,
            &[FilterCondition::eq(C::PARENT_KEY, parent_id)],
            RepositoryOperation::Delete,
        )
        .await?;
        tracing::debug!(entity = C::NAME, parent_id, removed, "Removed children");
        Ok(removed)
    }

    async fn insert_all(
        &mut self,
        conn: &mut SqliteConnection,
        parent_id: Id,
    ) -> RepositoryResult<usize> {
        for child in self.iter_mut() {
            child.set_parent_id(parent_id);
            insert_entity(&mut *conn, &*child, ActorId::UNKNOWN, RepositoryOperation::Create)
                .await?;
        }
        tracing::debug!(entity = C::NAME, parent_id, inserted = self.len(), "Inserted children");
        Ok(self.len())
    }

    fn row_count(&self) -> usize {
        self.len()
    }
}

impl<C: ChildEntity> ChildSet for Option<C> {
    async fn delete_all(conn: &mut SqliteConnection, parent_id: Id) -> RepositoryResult<u64> {
        <Vec<C> as ChildSet>::delete_all(conn, parent_id).await
    }

    async fn insert_all(
        &mut self,
        conn: &mut SqliteConnection,
        parent_id: Id,
    ) -> RepositoryResult<usize> {
        let Some(child) = self.as_mut() else {
            return Ok(0);
        };
        child.set_parent_id(parent_id);
        insert_entity(&mut *conn, &*child, ActorId::UNKNOWN, RepositoryOperation::Create).await?;
        Ok(1)
    }

    fn row_count(&self) -> usize {
        usize::from(self.is_some())
    }
}

impl<A: ChildSet, B: ChildSet> ChildSet for (A, B) {
    async fn delete_all(conn: &mut SqliteConnection, parent_id: Id) -> RepositoryResult<u64> {
        let first = A::delete_all(&mut *conn, parent_id).await?;
        let second = B::delete_all(&mut *conn, parent_id).await?;
        Ok(first + second)
    }

    async fn insert_all(
        &mut self,
        conn: &mut SqliteConnection,
        parent_id: Id,
    ) -> RepositoryResult<usize> {
        let first = self.0.insert_all(&mut *conn, parent_id).await?;
        let second = self.1.insert_all(&mut *conn, parent_id).await?;
        Ok(first + second)
    }

    fn row_count(&self) -> usize {
        self.0.row_count() + self.1.row_count()
    }
}

impl ChildSet for () {
    async fn delete_all(_conn: &mut SqliteConnection, _parent_id: Id) -> RepositoryResult<u64> {
        Ok(0)
    }

    async fn insert_all(
        &mut self,
        _conn: &mut SqliteConnection,
        _parent_id: Id,
    ) -> RepositoryResult<usize> {
        Ok(0)
    }

    fn row_count(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardBank, InvitationDetail, InvitationParticipant};

    #[test]
    fn test_row_counts() {
        let banks = vec![CardBank::default(), CardBank::default()];
        assert_eq!(banks.row_count(), 2);

        let detail: Option<InvitationDetail> = None;
        assert_eq!(detail.row_count(), 0);

        let children = (
            Some(InvitationDetail::default()),
            vec![InvitationParticipant::default(); 3],
        );
        assert_eq!(children.row_count(), 4);
        assert_eq!(().row_count(), 0);
    }
}
