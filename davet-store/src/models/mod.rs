//! Persisted entities of the davet.link admin
//!
//! Catalog entities ([`Bank`], [`SocialMedia`], [`InvitationCategory`]) are
//! plain rows. [`Card`] and [`Invitation`] are aggregate roots whose child rows
//! are loaded eagerly and written through
//! [`AggregateWriter`](crate::aggregate::AggregateWriter).
//!
//! Each module exposes `repository_config()` with the entity's sortable
//! columns and relations.

pub mod bank;
pub mod card;
pub mod invitation;
pub mod invitation_category;
pub mod social_media;

pub use bank::Bank;
pub use card::{Card, CardBank, CardSocialMedia};
pub use invitation::{Invitation, InvitationDetail, InvitationParticipant};
pub use invitation_category::InvitationCategory;
pub use social_media::SocialMedia;
