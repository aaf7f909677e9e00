//! Generic SQLite repository shared by every entity type
//!
//! [`EntityRepository`] implements [`Repository`] for any [`Entity`]. What
//! differs between entities (sortable columns, eager-loaded relations) lives in
//! a [`RepositoryConfig`] injected at construction.
//!
//! # Example
//!
//! ```rust,ignore
//! use davet_store::models::card;
//! use davet_store::repository::{EntityRepository, ListParams, Repository};
//!
//! let repo = EntityRepository::new(pool, card::repository_config());
//! let (cards, total) = repo.get_all(&ListParams::default()).await?;
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::audit::{stamp_create, stamp_update, ActorId};
use super::entity::{Entity, FieldPatch, FieldValue, Id, SortWhitelist};
use super::error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
use super::filter::{push_where, FilterCondition};
use super::pagination::ListParams;
use super::traits::{RelationLoader, Repository, RepositoryResult};

/// Per-entity repository configuration
pub struct RepositoryConfig<E> {
    whitelist: SortWhitelist,
    relations: Vec<Arc<dyn RelationLoader<E>>>,
}

impl<E: Entity> RepositoryConfig<E> {
    /// Configuration with `whitelist` and no relations
    pub fn new(whitelist: SortWhitelist) -> Self {
        Self {
            whitelist,
            relations: Vec::new(),
        }
    }

    /// Eager-load `loader` on every read
    #[must_use]
    pub fn with_relation(mut self, loader: impl RelationLoader<E> + 'static) -> Self {
        self.relations.push(Arc::new(loader));
        self
    }

    /// Sortable columns
    pub fn whitelist(&self) -> &SortWhitelist {
        &self.whitelist
    }

    /// Names of the eager-loaded relations
    pub fn relation_names(&self) -> Vec<&'static str> {
        self.relations.iter().map(|loader| loader.name()).collect()
    }
}

impl<E: Entity> Default for RepositoryConfig<E> {
    fn default() -> Self {
        Self::new(SortWhitelist::default())
    }
}

impl<E> fmt::Debug for RepositoryConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoryConfig")
            .field("whitelist", &self.whitelist)
            .field("relations", &self.relations.len())
            .finish()
    }
}

/// Repository over the table of `E`
pub struct EntityRepository<E> {
    pool: SqlitePool,
    config: Arc<RepositoryConfig<E>>,
}

impl<E> Clone for EntityRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<E> fmt::Debug for EntityRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRepository")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> EntityRepository<E> {
    /// Repository over `pool` configured with `config`
    pub fn new(pool: SqlitePool, config: RepositoryConfig<E>) -> Self {
        Self {
            pool,
            config: Arc::new(config),
        }
    }

    /// The pool reads run on
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// This repository's configuration
    pub fn config(&self) -> &RepositoryConfig<E> {
        &self.config
    }

    async fn page_where(
        &self,
        filters: &[FilterCondition],
        params: &ListParams,
    ) -> RepositoryResult<(Vec<E>, i64)> {
        let total = self.count_matching(filters, RepositoryOperation::FindAll).await?;

        let sort_column = self.config.whitelist.resolve(params.sort_by());
        let window = params.pagination();

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM ");
        qb.push(E::TABLE);
        push_where::<E>(&mut qb, filters, RepositoryOperation::FindAll)?;
        qb.push(" ORDER BY ")
            .push(sort_column)
            .push(" ")
            .push(params.order_by().as_sql());
        if sort_column != "id" {
            qb.push(", id ASC");
        }
        qb.push(" LIMIT ")
            .push_bind(i64::try_from(window.limit).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(window.offset).unwrap_or(i64::MAX));

        let mut items: Vec<E> = qb
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| sqlx_error::<E>(RepositoryOperation::FindAll, e))?;

        self.load_relations(&mut items).await?;

        tracing::debug!(
            entity = E::NAME,
            sort_by = sort_column,
            order_by = %params.order_by(),
            page = params.page(),
            per_page = params.per_page(),
            returned = items.len(),
            total,
            "Listed entities"
        );
        Ok((items, total))
    }

    async fn count_matching(
        &self,
        filters: &[FilterCondition],
        operation: RepositoryOperation,
    ) -> RepositoryResult<i64> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM ");
        qb.push(E::TABLE);
        push_where::<E>(&mut qb, filters, operation)?;
        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| sqlx_error::<E>(operation, e))
    }

    async fn load_relations(&self, items: &mut [E]) -> RepositoryResult<()> {
        for loader in &self.config.relations {
            loader.attach(&self.pool, items).await?;
        }
        Ok(())
    }
}

impl<E: Entity> Repository<E> for EntityRepository<E> {
    async fn get_all(&self, params: &ListParams) -> RepositoryResult<(Vec<E>, i64)> {
        self.page_where(&[], params).await
    }

    async fn get_all_by_owner(
        &self,
        owner_id: Id,
        params: &ListParams,
    ) -> RepositoryResult<(Vec<E>, i64)> {
        let Some(owner_column) = E::OWNER_COLUMN else {
            return Err(RepositoryError::validation_failed(
                RepositoryOperation::FindAll,
                "Entity has no owner column",
            )
            .with_entity_type(E::NAME));
        };
        self.page_where(&[FilterCondition::eq(owner_column, owner_id)], params)
            .await
    }

    async fn find_all(
        &self,
        filters: &[FilterCondition],
        params: &ListParams,
    ) -> RepositoryResult<(Vec<E>, i64)> {
        self.page_where(filters, params).await
    }

    async fn get_by_id(&self, id: Id) -> RepositoryResult<E> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM ");
        qb.push(E::TABLE).push(" WHERE id = ").push_bind(id);

        let entity = qb
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| sqlx_error::<E>(RepositoryOperation::FindById, e))?;

        let Some(entity) = entity else {
            return Err(RepositoryError::not_found(E::NAME, id));
        };

        let mut items = [entity];
        self.load_relations(&mut items).await?;
        let [entity] = items;
        Ok(entity)
    }

    async fn create(
        &self,
        conn: &mut SqliteConnection,
        entity: &E,
        actor: ActorId,
    ) -> RepositoryResult<Id> {
        insert_entity(conn, entity, actor, RepositoryOperation::Create).await
    }

    async fn update(
        &self,
        conn: &mut SqliteConnection,
        id: Id,
        patch: &FieldPatch,
        actor: ActorId,
    ) -> RepositoryResult<()> {
        patch.validate::<E>(RepositoryOperation::Update)?;

        if patch.is_empty() && !E::AUDITED {
            if exists_on::<E>(conn, id, RepositoryOperation::Update).await? {
                return Ok(());
            }
            return Err(
                RepositoryError::not_found(E::NAME, id).with_operation(RepositoryOperation::Update)
            );
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE ");
        qb.push(E::TABLE).push(" SET ");
        push_assignments::<E>(&mut qb, patch, actor);
        qb.push(" WHERE id = ").push_bind(id);

        let affected = qb
            .build()
            .execute(&mut *conn)
            .await
            .map_err(|e| sqlx_error::<E>(RepositoryOperation::Update, e))?
            .rows_affected();

        if affected == 0 {
            return Err(
                RepositoryError::not_found(E::NAME, id).with_operation(RepositoryOperation::Update)
            );
        }
        tracing::debug!(entity = E::NAME, id, %actor, columns = patch.len(), "Updated entity");
        Ok(())
    }

    async fn delete(&self, conn: &mut SqliteConnection, id: Id) -> RepositoryResult<()> {
        let affected = delete_where::<E>(
            conn,
            &[FilterCondition::eq("id", id)],
            RepositoryOperation::Delete,
        )
        .await?;
        if affected == 0 {
            return Err(
                RepositoryError::not_found(E::NAME, id).with_operation(RepositoryOperation::Delete)
            );
        }
        tracing::debug!(entity = E::NAME, id, "Deleted entity");
        Ok(())
    }

    async fn bulk_create(
        &self,
        conn: &mut SqliteConnection,
        entities: &[E],
        actor: ActorId,
    ) -> RepositoryResult<Vec<Id>> {
        let mut ids = Vec::with_capacity(entities.len());
        for entity in entities {
            let id =
                insert_entity(&mut *conn, entity, actor, RepositoryOperation::BulkCreate).await?;
            ids.push(id);
        }
        Ok(ids)
    }

    async fn bulk_update(
        &self,
        conn: &mut SqliteConnection,
        filters: &[FilterCondition],
        patch: &FieldPatch,
        actor: ActorId,
    ) -> RepositoryResult<u64> {
        require_filters::<E>(filters, RepositoryOperation::BulkUpdate)?;
        patch.validate::<E>(RepositoryOperation::BulkUpdate)?;
        if patch.is_empty() && !E::AUDITED {
            return Err(RepositoryError::validation_failed(
                RepositoryOperation::BulkUpdate,
                "Patch names no columns",
            )
            .with_entity_type(E::NAME));
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE ");
        qb.push(E::TABLE).push(" SET ");
        push_assignments::<E>(&mut qb, patch, actor);
        push_where::<E>(&mut qb, filters, RepositoryOperation::BulkUpdate)?;

        let affected = qb
            .build()
            .execute(&mut *conn)
            .await
            .map_err(|e| sqlx_error::<E>(RepositoryOperation::BulkUpdate, e))?
            .rows_affected();

        tracing::debug!(entity = E::NAME, affected, %actor, "Bulk updated entities");
        Ok(affected)
    }

    async fn bulk_delete(
        &self,
        conn: &mut SqliteConnection,
        filters: &[FilterCondition],
    ) -> RepositoryResult<u64> {
        require_filters::<E>(filters, RepositoryOperation::BulkDelete)?;
        let affected = delete_where::<E>(conn, filters, RepositoryOperation::BulkDelete).await?;
        tracing::debug!(entity = E::NAME, affected, "Bulk deleted entities");
        Ok(affected)
    }

    async fn count(&self) -> RepositoryResult<i64> {
        self.count_matching(&[], RepositoryOperation::Count).await
    }

    async fn count_where(&self, filters: &[FilterCondition]) -> RepositoryResult<i64> {
        self.count_matching(filters, RepositoryOperation::Count).await
    }

    async fn exists(&self, id: Id) -> RepositoryResult<bool> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| sqlx_error::<E>(RepositoryOperation::Exists, e))?;
        exists_on::<E>(&mut *conn, id, RepositoryOperation::Exists).await
    }
}

/// Insert one row of `E`, stamping audit columns, and return its id
pub(crate) async fn insert_entity<E: Entity>(
    conn: &mut SqliteConnection,
    entity: &E,
    actor: ActorId,
    operation: RepositoryOperation,
) -> RepositoryResult<Id> {
    let values = entity.values();
    if values.len() != E::COLUMNS.len() {
        return Err(RepositoryError::new(
            operation,
            RepositoryErrorKind::Other,
            format!(
                "{} values for {} columns",
                values.len(),
                E::COLUMNS.len()
            ),
        )
        .with_entity_type(E::NAME));
    }

    let mut row: Vec<(&str, FieldValue)> = E::COLUMNS.iter().copied().zip(values).collect();
    if E::AUDITED {
        row.extend(stamp_create(actor, Utc::now()));
    }

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("INSERT INTO ");
    qb.push(E::TABLE).push(" (");
    for (index, (column, _)) in row.iter().enumerate() {
        if index > 0 {
            qb.push(", ");
        }
        qb.push(*column);
    }
    qb.push(") VALUES (");
    for (index, (_, value)) in row.into_iter().enumerate() {
        if index > 0 {
            qb.push(", ");
        }
        value.push_bind(&mut qb);
    }
    qb.push(") RETURNING id");

    let id = qb
        .build_query_scalar::<Id>()
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| sqlx_error::<E>(operation, e))?;

    tracing::debug!(entity = E::NAME, id, %actor, "Inserted entity");
    Ok(id)
}

/// Delete every row of `E` matching `filters`, returning the affected count
pub(crate) async fn delete_where<E: Entity>(
    conn: &mut SqliteConnection,
    filters: &[FilterCondition],
    operation: RepositoryOperation,
) -> RepositoryResult<u64> {
    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("DELETE FROM ");
    qb.push(E::TABLE);
    push_where::<E>(&mut qb, filters, operation)?;

    qb.build()
        .execute(&mut *conn)
        .await
        .map(|result| result.rows_affected())
        .map_err(|e| sqlx_error::<E>(operation, e))
}

async fn exists_on<E: Entity>(
    conn: &mut SqliteConnection,
    id: Id,
    operation: RepositoryOperation,
) -> RepositoryResult<bool> {
    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM ");
    qb.push(E::TABLE).push(" WHERE id = ").push_bind(id);
    qb.build_query_scalar::<i64>()
        .fetch_one(&mut *conn)
        .await
        .map(|count| count > 0)
        .map_err(|e| sqlx_error::<E>(operation, e))
}

fn push_assignments<E: Entity>(
    qb: &mut QueryBuilder<'_, Sqlite>,
    patch: &FieldPatch,
    actor: ActorId,
) {
    let stamp = if E::AUDITED {
        stamp_update(actor, Utc::now()).to_vec()
    } else {
        Vec::new()
    };
    let assignments = patch
        .iter()
        .map(|(column, value)| (column, value.clone()))
        .chain(stamp);

    for (index, (column, value)) in assignments.enumerate() {
        if index > 0 {
            qb.push(", ");
        }
        qb.push(column).push(" = ");
        value.push_bind(qb);
    }
}

fn require_filters<E: Entity>(
    filters: &[FilterCondition],
    operation: RepositoryOperation,
) -> RepositoryResult<()> {
    if filters.is_empty() {
        return Err(RepositoryError::validation_failed(
            operation,
            "Refusing to run without a filter",
        )
        .with_entity_type(E::NAME));
    }
    Ok(())
}

fn sqlx_error<E: Entity>(operation: RepositoryOperation, err: sqlx::Error) -> RepositoryError {
    RepositoryError::from_sqlx(operation, err).with_entity_type(E::NAME)
}
