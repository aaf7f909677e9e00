//! # davet-store
//!
//! Data-access core of the davet.link admin panel: generic paginated
//! repositories and transactional persistence of aggregate entities on SQLite.
//!
//! ## Features
//!
//! - **List normalization**: untrusted page/sort input becomes bounded [`ListParams`](repository::ListParams)
//! - **Generic repository**: CRUD, bulk writes, counts and filtered listing for any [`Entity`](repository::Entity)
//! - **Whitelisted sorting**: dynamic ORDER BY only over pre-approved columns
//! - **Aggregate writes**: a root and its child rows committed or rolled back as one unit
//! - **Audit stamping**: acting user and timestamps on every write
//! - **Configuration**: layered figment config with `DAVET_` environment overrides
//!
//! ## Example
//!
//! ```rust,no_run
//! use davet_store::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let pool = create_pool(&config.database).await?;
//!     let cards = CardService::new(pool.clone(), &config);
//!
//!     let params = ListParams::from_query("page=1&sort_by=name", &config.pagination);
//!     let page = cards.get_all_cards(&params).await;
//!     println!("{} of {} cards", page.len(), page.meta.total_items);
//!
//!     let request = CardRequest {
//!         name: "Ada".to_string(),
//!         slug: "ada".to_string(),
//!         user_id: 1,
//!         bank_ids: vec![1],
//!         ..CardRequest::default()
//!     };
//!     let ctx = cards.write_context();
//!     cards.create_card(&ctx, request.into_card(), ActorId::new(1)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod observability;
pub mod repository;
pub mod requests;
pub mod services;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::aggregate::{Aggregate, AggregateWriter, ChildSet, Session, WriteContext};
    pub use crate::config::{Config, DatabaseConfig, PaginationConfig, ServiceConfig};
    pub use crate::database::{create_memory_pool, create_pool, run_migrations};
    pub use crate::error::{DatabaseError, DatabaseErrorKind, DatabaseOperation, Error, Result};
    pub use crate::models::{
        Bank, Card, CardBank, CardSocialMedia, Invitation, InvitationCategory, InvitationDetail,
        InvitationParticipant, SocialMedia,
    };
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        total_pages, ActorId, ChildEntity, Entity, EntityRepository, FieldPatch, FieldValue,
        FilterCondition, FilterOperator, FilterValue, Id, ListParams, PaginatedResult,
        PaginationMeta, RawListParams, Repository, RepositoryConfig, RepositoryError,
        RepositoryErrorKind, RepositoryOperation, RepositoryResult, SortOrder, SortWhitelist,
    };
    pub use crate::requests::{
        BankRequest, CardRequest, InvitationCategoryRequest, InvitationParticipantRequest,
        InvitationRequest, SocialMediaRequest,
    };
    pub use crate::services::{
        BankService, CardService, CatalogService, DashboardService, DashboardSummary,
        InvitationCategoryService, InvitationService, SocialMediaService,
    };

    pub use tokio_util::sync::CancellationToken;
}
