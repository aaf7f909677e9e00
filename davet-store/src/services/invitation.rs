//! Invitation service, including participant maintenance

use std::time::Duration;

use sqlx::SqlitePool;

use super::{acquire, guarded};
use crate::aggregate::{AggregateWriter, Session, WriteContext};
use crate::config::Config;
use crate::error::Result;
use crate::models::{invitation, Invitation, InvitationParticipant};
use crate::repository::{
    ActorId, Entity, EntityRepository, FieldPatch, FilterCondition, Id, ListParams,
    PaginatedResult, Repository, RepositoryOperation,
};

/// Invitations with their detail row and participant list
#[derive(Debug, Clone)]
pub struct InvitationService {
    writer: AggregateWriter<Invitation>,
    participants: EntityRepository<InvitationParticipant>,
    write_timeout: Duration,
}

impl InvitationService {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            writer: AggregateWriter::new(EntityRepository::new(
                pool.clone(),
                invitation::repository_config(),
            )),
            participants: EntityRepository::new(pool, invitation::participant_repository_config()),
            write_timeout: config.service.write_timeout(),
        }
    }

    /// Context bounded by the configured write timeout
    pub fn write_context(&self) -> WriteContext {
        WriteContext::new().with_timeout(self.write_timeout)
    }

    /// Underlying writer, for writes joined to a caller's transaction
    pub fn writer(&self) -> &AggregateWriter<Invitation> {
        &self.writer
    }

    fn repository(&self) -> &EntityRepository<Invitation> {
        self.writer.repository()
    }

    /// One page of invitations with detail and participants
    pub async fn get_all_invitations(&self, params: &ListParams) -> PaginatedResult<Invitation> {
        PaginatedResult::or_empty(
            self.repository().get_all(params).await,
            params,
            Invitation::NAME,
        )
    }

    pub async fn get_invitation_by_id(&self, id: Id) -> Result<Invitation> {
        Ok(self.repository().get_by_id(id).await?)
    }

    /// One page of the invitations owned by `user_id`, with the owner's total
    pub async fn get_all_invitations_by_owner(
        &self,
        user_id: Id,
        params: &ListParams,
    ) -> Result<(Vec<Invitation>, i64)> {
        Ok(self.repository().get_all_by_owner(user_id, params).await?)
    }

    pub async fn create_invitation(
        &self,
        ctx: &WriteContext,
        invitation: Invitation,
        actor: ActorId,
    ) -> Result<Id> {
        let id = self
            .writer
            .create(ctx, Session::Begin, invitation, actor)
            .await?;
        tracing::info!(id, %actor, "Invitation created");
        Ok(id)
    }

    /// Overwrite invitation `id`, replacing its detail and participants
    pub async fn update_invitation(
        &self,
        ctx: &WriteContext,
        id: Id,
        invitation: Invitation,
        actor: ActorId,
    ) -> Result<()> {
        self.writer
            .update(ctx, Session::Begin, id, invitation, actor)
            .await?;
        tracing::info!(id, %actor, "Invitation updated");
        Ok(())
    }

    pub async fn delete_invitation(&self, ctx: &WriteContext, id: Id) -> Result<()> {
        self.writer.delete(ctx, Session::Begin, id).await?;
        tracing::info!(id, "Invitation deleted");
        Ok(())
    }

    pub async fn count_invitations(&self) -> Result<i64> {
        Ok(self.repository().count().await?)
    }

    /// One page of the participants of `invitation_id`
    pub async fn get_participants_by_invitation_id(
        &self,
        invitation_id: Id,
        params: &ListParams,
    ) -> PaginatedResult<InvitationParticipant> {
        let filters = [FilterCondition::eq("invitation_id", invitation_id)];
        PaginatedResult::or_empty(
            self.participants.find_all(&filters, params).await,
            params,
            InvitationParticipant::NAME,
        )
    }

    /// Patch one participant row in place
    pub async fn update_participant(
        &self,
        ctx: &WriteContext,
        id: Id,
        patch: &FieldPatch,
    ) -> Result<()> {
        let operation = RepositoryOperation::Update;
        let mut conn = acquire(self.participants.pool(), operation).await?;
        guarded(
            ctx,
            operation,
            InvitationParticipant::NAME,
            self.participants.update(&mut *conn, id, patch, ActorId::UNKNOWN),
        )
        .await?;
        tracing::info!(id, "Participant updated");
        Ok(())
    }

    pub async fn delete_participant(&self, ctx: &WriteContext, id: Id) -> Result<()> {
        let operation = RepositoryOperation::Delete;
        let mut conn = acquire(self.participants.pool(), operation).await?;
        guarded(
            ctx,
            operation,
            InvitationParticipant::NAME,
            self.participants.delete(&mut *conn, id),
        )
        .await?;
        tracing::info!(id, "Participant deleted");
        Ok(())
    }
}
