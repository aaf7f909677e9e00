//! Entity services consumed by the admin handlers
//!
//! Each service wraps the repositories and writers for one entity family and
//! exposes the list/get/create/update/delete/count surface the admin panel
//! needs. Reads degrade to an empty page on failure; writes propagate.
//!
//! # Example
//!
//! ```rust,ignore
//! use davet_store::prelude::*;
//!
//! let config = Config::load()?;
//! let pool = create_pool(&config.database).await?;
//! let cards = CardService::new(pool.clone(), &config);
//!
//! let params = ListParams::from_query("page=2&per_page=5", &config.pagination);
//! let page = cards.get_all_cards(&params).await;
//!
//! let ctx = cards.write_context();
//! let id = cards.create_card(&ctx, request.into_card(), ActorId::new(7)).await?;
//! ```

mod card;
mod catalog;
mod dashboard;
mod invitation;

pub use card::CardService;
pub use catalog::{
    BankService, CatalogEntity, CatalogService, InvitationCategoryService, SocialMediaService,
};
pub use dashboard::{DashboardService, DashboardSummary};
pub use invitation::InvitationService;

use std::future::Future;

use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqlitePool};

use crate::aggregate::WriteContext;
use crate::repository::{RepositoryError, RepositoryOperation, RepositoryResult};

/// Run a single-statement write under `ctx`
async fn guarded<T, F>(
    ctx: &WriteContext,
    operation: RepositoryOperation,
    entity: &'static str,
    work: F,
) -> RepositoryResult<T>
where
    F: Future<Output = RepositoryResult<T>>,
{
    match ctx.guard(work).await {
        Ok(result) => result,
        Err(interrupted) => {
            let err = interrupted.into_error(operation).with_entity_type(entity);
            tracing::warn!(entity, %operation, error = %err, "Write interrupted");
            Err(err)
        }
    }
}

async fn acquire(
    pool: &SqlitePool,
    operation: RepositoryOperation,
) -> RepositoryResult<PoolConnection<Sqlite>> {
    pool.acquire()
        .await
        .map_err(|e| RepositoryError::from_sqlx(operation, e))
}
