//! Batch loader for parent → child relations

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::entity::{ChildEntity, Entity, Id};
use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{RelationLoader, RepositoryResult};

/// Loads the `C` rows of every parent in one `IN (...)` query
///
/// `assign` receives each parent together with its children in id order; a
/// parent without children receives an empty vector.
///
/// # Example
///
/// ```rust
/// use davet_store::models::{Card, CardBank};
/// use davet_store::repository::ChildLoader;
///
/// let loader = ChildLoader::<Card, CardBank>::new("banks", |card, banks| card.banks = banks);
/// ```
pub struct ChildLoader<P, C> {
    name: &'static str,
    assign: fn(&mut P, Vec<C>),
}

impl<P, C> ChildLoader<P, C> {
    /// Loader named `name` that hands children to `assign`
    pub fn new(name: &'static str, assign: fn(&mut P, Vec<C>)) -> Self {
        Self { name, assign }
    }
}

impl<P, C> std::fmt::Debug for ChildLoader<P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildLoader").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<P, C> RelationLoader<P> for ChildLoader<P, C>
where
    P: Entity,
    C: ChildEntity,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn attach(&self, pool: &SqlitePool, entities: &mut [P]) -> RepositoryResult<()> {
        if entities.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT * FROM ");
        qb.push(C::TABLE)
            .push(" WHERE ")
            .push(C::PARENT_KEY)
            .push(" IN (");
        let mut ids = qb.separated(", ");
        for entity in entities.iter() {
            ids.push_bind(entity.id());
        }
        qb.push(") ORDER BY id");

        let children: Vec<C> = qb
            .build_query_as::<C>()
            .fetch_all(pool)
            .await
            .map_err(|e| {
                RepositoryError::from_sqlx(RepositoryOperation::LoadRelations, e)
                    .with_entity_type(C::NAME)
            })?;

        let mut by_parent: HashMap<Id, Vec<C>> = HashMap::new();
        for child in children {
            by_parent.entry(child.parent_id()).or_default().push(child);
        }

        for entity in entities.iter_mut() {
            let children = by_parent.remove(&entity.id()).unwrap_or_default();
            (self.assign)(entity, children);
        }

        tracing::debug!(
            relation = self.name,
            parents = entities.len(),
            "Loaded relation"
        );
        Ok(())
    }
}
