//! Transactional writes of aggregate roots with dependent children
//!
//! An aggregate is a parent row plus child collections that live and die with
//! it: a card with its bank and social-media rows, an invitation with its
//! detail and participant rows. [`AggregateWriter`] persists them as one unit.
//!
//! Children are written by full replacement. An update deletes every stored
//! child of the root and inserts the snapshot carried by the new root value;
//! there is no diffing.
//!
//! # Example
//!
//! ```rust,ignore
//! use davet_store::aggregate::{AggregateWriter, Session, WriteContext};
//! use davet_store::repository::ActorId;
//!
//! let writer = AggregateWriter::new(card_repository);
//! let ctx = WriteContext::new().with_timeout(Duration::from_secs(30));
//!
//! // Standalone transaction
//! let id = writer.create(&ctx, Session::Begin, card, ActorId::new(1)).await?;
//!
//! // Inside a caller-owned transaction
//! let mut tx = pool.begin().await?;
//! writer.delete(&ctx, Session::Join(&mut tx), id).await?;
//! tx.commit().await?;
//! ```

mod children;
mod context;
mod writer;

pub use children::ChildSet;
pub use context::{Interrupted, WriteContext};
pub use writer::{AggregateWriter, Session};

use crate::repository::Entity;

/// An entity owning dependent child collections
pub trait Aggregate: Entity {
    /// The child collections, e.g. `(Vec<CardBank>, Vec<CardSocialMedia>)`
    type Children: ChildSet;

    /// Move the child snapshot out of the root
    fn take_children(&mut self) -> Self::Children;
}
