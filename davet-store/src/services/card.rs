//! Business card service

use std::time::Duration;

use sqlx::SqlitePool;

use crate::aggregate::{AggregateWriter, Session, WriteContext};
use crate::config::{Config, PaginationConfig};
use crate::error::Result;
use crate::models::{card, Card};
use crate::repository::{
    ActorId, Entity, EntityRepository, Id, ListParams, PaginatedResult, RawListParams,
    Repository,
};

/// Cards with their bank and social-media associations
#[derive(Debug, Clone)]
pub struct CardService {
    writer: AggregateWriter<Card>,
    pagination: PaginationConfig,
    write_timeout: Duration,
}

impl CardService {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            writer: AggregateWriter::new(EntityRepository::new(pool, card::repository_config())),
            pagination: config.pagination.clone(),
            write_timeout: config.service.write_timeout(),
        }
    }

    /// Context bounded by the configured write timeout
    pub fn write_context(&self) -> WriteContext {
        WriteContext::new().with_timeout(self.write_timeout)
    }

    /// Underlying writer, for writes joined to a caller's transaction
    pub fn writer(&self) -> &AggregateWriter<Card> {
        &self.writer
    }

    fn repository(&self) -> &EntityRepository<Card> {
        self.writer.repository()
    }

    /// One page of cards with their associations
    pub async fn get_all_cards(&self, params: &ListParams) -> PaginatedResult<Card> {
        PaginatedResult::or_empty(self.repository().get_all(params).await, params, Card::NAME)
    }

    pub async fn get_card_by_id(&self, id: Id) -> Result<Card> {
        Ok(self.repository().get_by_id(id).await?)
    }

    /// One page of the cards owned by `user_id`, with the owner's total
    pub async fn get_all_cards_by_owner(
        &self,
        user_id: Id,
        params: &ListParams,
    ) -> Result<(Vec<Card>, i64)> {
        Ok(self.repository().get_all_by_owner(user_id, params).await?)
    }

    /// The first card of `user_id`, if they have one
    pub async fn get_cards_by_user_id(&self, user_id: Id) -> Result<Option<Card>> {
        let raw = RawListParams {
            page: Some(1),
            per_page: Some(1),
            ..RawListParams::default()
        };
        let params = ListParams::normalize(raw, &self.pagination);
        let (cards, _) = self.repository().get_all_by_owner(user_id, &params).await?;
        Ok(cards.into_iter().next())
    }

    pub async fn create_card(&self, ctx: &WriteContext, card: Card, actor: ActorId) -> Result<Id> {
        let id = self.writer.create(ctx, Session::Begin, card, actor).await?;
        tracing::info!(id, %actor, "Card created");
        Ok(id)
    }

    /// Overwrite card `id`, replacing its associations with those on `card`
    pub async fn update_card(
        &self,
        ctx: &WriteContext,
        id: Id,
        card: Card,
        actor: ActorId,
    ) -> Result<()> {
        self.writer.update(ctx, Session::Begin, id, card, actor).await?;
        tracing::info!(id, %actor, "Card updated");
        Ok(())
    }

    pub async fn delete_card(&self, ctx: &WriteContext, id: Id) -> Result<()> {
        self.writer.delete(ctx, Session::Begin, id).await?;
        tracing::info!(id, "Card deleted");
        Ok(())
    }

    pub async fn count_cards(&self) -> Result<i64> {
        Ok(self.repository().count().await?)
    }
}
