//! Entity counts for the admin dashboard

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::models::{
    bank, card, invitation, invitation_category, social_media, Bank, Card, Invitation,
    InvitationCategory, InvitationParticipant, SocialMedia,
};
use crate::repository::{Entity, EntityRepository, Repository, RepositoryResult};

/// Row counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub cards: i64,
    pub invitations: i64,
    pub participants: i64,
    pub banks: i64,
    pub social_media: i64,
    pub invitation_categories: i64,
}

/// Counts every entity table concurrently
#[derive(Debug, Clone)]
pub struct DashboardService {
    cards: EntityRepository<Card>,
    invitations: EntityRepository<Invitation>,
    participants: EntityRepository<InvitationParticipant>,
    banks: EntityRepository<Bank>,
    social_media: EntityRepository<SocialMedia>,
    invitation_categories: EntityRepository<InvitationCategory>,
}

impl DashboardService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            cards: EntityRepository::new(pool.clone(), card::repository_config()),
            invitations: EntityRepository::new(pool.clone(), invitation::repository_config()),
            participants: EntityRepository::new(
                pool.clone(),
                invitation::participant_repository_config(),
            ),
            banks: EntityRepository::new(pool.clone(), bank::repository_config()),
            social_media: EntityRepository::new(pool.clone(), social_media::repository_config()),
            invitation_categories: EntityRepository::new(
                pool,
                invitation_category::repository_config(),
            ),
        }
    }

    /// Count of every entity; a count that fails is logged and reported as 0
    pub async fn summary(&self) -> DashboardSummary {
        let (cards, invitations, participants, banks, social_media, invitation_categories) =
            futures::join!(
                self.cards.count(),
                self.invitations.count(),
                self.participants.count(),
                self.banks.count(),
                self.social_media.count(),
                self.invitation_categories.count(),
            );

        DashboardSummary {
            cards: or_zero::<Card>(cards),
            invitations: or_zero::<Invitation>(invitations),
            participants: or_zero::<InvitationParticipant>(participants),
            banks: or_zero::<Bank>(banks),
            social_media: or_zero::<SocialMedia>(social_media),
            invitation_categories: or_zero::<InvitationCategory>(invitation_categories),
        }
    }
}

fn or_zero<E: Entity>(count: RepositoryResult<i64>) -> i64 {
    count.unwrap_or_else(|e| {
        tracing::error!(entity = E::NAME, error = %e, "Dashboard count failed");
        0
    })
}
