//! Generic paginated repository over SQLite
//!
//! # Features
//!
//! - **Generic CRUD**: [`EntityRepository`] implements [`Repository`] for any [`Entity`]
//! - **Bulk operations**: create, update and delete sets of rows; set-oriented
//!   writes refuse to run without a filter
//! - **Safe sorting**: sort columns are checked against a per-entity [`SortWhitelist`]
//! - **List normalization**: [`ListParams`] bounds untrusted page/sort input
//! - **Relation loading**: [`ChildLoader`] batch-loads children for a whole page
//! - **Audit stamping**: [`ActorId`] and timestamps on every write
//!
//! # Example
//!
//! ```rust,ignore
//! use davet_store::models::bank;
//! use davet_store::repository::{ActorId, EntityRepository, FieldPatch, ListParams, Repository};
//!
//! let repo = EntityRepository::new(pool.clone(), bank::repository_config());
//!
//! let mut conn = pool.acquire().await?;
//! let id = repo.create(&mut conn, &bank, ActorId::new(1)).await?;
//! repo.update(&mut conn, id, &FieldPatch::new().set("is_active", false), ActorId::new(1))
//!     .await?;
//!
//! let (banks, total) = repo.get_all(&ListParams::default()).await?;
//! ```

mod audit;
mod entity;
mod error;
mod filter;
mod generic;
mod pagination;
mod relations;
mod traits;

pub use audit::{ActorId, AuditStamp, AUDIT_COLUMNS};
pub use entity::{ChildEntity, Entity, FieldPatch, FieldValue, Id, SortWhitelist};
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use filter::{FilterCondition, FilterOperator, FilterValue};
pub use generic::{EntityRepository, RepositoryConfig};
pub use pagination::{
    total_pages, InvalidSortOrder, ListParams, PaginatedResult, Pagination, PaginationMeta,
    RawListParams, SortOrder,
};
pub use relations::ChildLoader;
pub use traits::{RelationLoader, Repository, RepositoryResult};

pub(crate) use generic::{delete_where, insert_entity};
