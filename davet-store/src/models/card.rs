//! Digital business cards and their bank / social-media associations

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::aggregate::Aggregate;
use crate::repository::{
    AuditStamp, ChildEntity, ChildLoader, Entity, FieldValue, Id, RepositoryConfig,
    SortWhitelist,
};

/// A user's business card
///
/// `banks` and `social_media` are not columns. Reads fill them through the
/// relation loaders in [`repository_config`]; writes treat them as the complete
/// child snapshot of the card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: Id,
    pub user_id: Id,
    pub name: String,
    pub slug: String,
    pub photo: String,
    pub telephone: String,
    pub email: String,
    pub location: String,
    pub website: String,
    pub is_active: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditStamp,
    #[sqlx(skip)]
    #[serde(default)]
    pub banks: Vec<CardBank>,
    #[sqlx(skip)]
    #[serde(default)]
    pub social_media: Vec<CardSocialMedia>,
}

impl Entity for Card {
    const TABLE: &'static str = "cards";
    const NAME: &'static str = "Card";
    const COLUMNS: &'static [&'static str] = &[
        "user_id",
        "name",
        "slug",
        "photo",
        "telephone",
        "email",
        "location",
        "website",
        "is_active",
    ];
    const OWNER_COLUMN: Option<&'static str> = Some("user_id");

    fn id(&self) -> Id {
        self.id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.user_id.into(),
            self.name.clone().into(),
            self.slug.clone().into(),
            self.photo.clone().into(),
            self.telephone.clone().into(),
            self.email.clone().into(),
            self.location.clone().into(),
            self.website.clone().into(),
            self.is_active.into(),
        ]
    }
}

impl Aggregate for Card {
    type Children = (Vec<CardBank>, Vec<CardSocialMedia>);

    fn take_children(&mut self) -> Self::Children {
        (
            std::mem::take(&mut self.banks),
            std::mem::take(&mut self.social_media),
        )
    }
}

/// Bank shown on a card, optionally with a card-specific IBAN
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CardBank {
    pub id: Id,
    pub card_id: Id,
    pub bank_id: Id,
    pub iban: String,
}

impl CardBank {
    /// Association with `bank_id`, parent assigned on write
    pub fn new(bank_id: Id) -> Self {
        Self {
            bank_id,
            ..Self::default()
        }
    }
}

impl Entity for CardBank {
    const TABLE: &'static str = "card_banks";
    const NAME: &'static str = "CardBank";
    const COLUMNS: &'static [&'static str] = &["card_id", "bank_id", "iban"];
    const AUDITED: bool = false;

    fn id(&self) -> Id {
        self.id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.card_id.into(),
            self.bank_id.into(),
            self.iban.clone().into(),
        ]
    }
}

impl ChildEntity for CardBank {
    const PARENT_KEY: &'static str = "card_id";

    fn parent_id(&self) -> Id {
        self.card_id
    }

    fn set_parent_id(&mut self, parent_id: Id) {
        self.card_id = parent_id;
    }
}

/// Social-media profile linked from a card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CardSocialMedia {
    pub id: Id,
    pub card_id: Id,
    pub social_media_id: Id,
    pub url: String,
}

impl CardSocialMedia {
    /// Association with `social_media_id`, parent assigned on write
    pub fn new(social_media_id: Id) -> Self {
        Self {
            social_media_id,
            ..Self::default()
        }
    }
}

impl Entity for CardSocialMedia {
    const TABLE: &'static str = "card_social_media";
    const NAME: &'static str = "CardSocialMedia";
    const COLUMNS: &'static [&'static str] = &["card_id", "social_media_id", "url"];
    const AUDITED: bool = false;

    fn id(&self) -> Id {
        self.id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.card_id.into(),
            self.social_media_id.into(),
            self.url.clone().into(),
        ]
    }
}

impl ChildEntity for CardSocialMedia {
    const PARENT_KEY: &'static str = "card_id";

    fn parent_id(&self) -> Id {
        self.card_id
    }

    fn set_parent_id(&mut self, parent_id: Id) {
        self.card_id = parent_id;
    }
}

/// Sortable by id, name, slug and creation time; loads banks and social media
pub fn repository_config() -> RepositoryConfig<Card> {
    RepositoryConfig::new(SortWhitelist::new(&["id", "name", "slug", "created_at"], "id"))
        .with_relation(ChildLoader::<Card, CardBank>::new("banks", |card, banks| {
            card.banks = banks;
        }))
        .with_relation(ChildLoader::<Card, CardSocialMedia>::new(
            "social_media",
            |card, social_media| card.social_media = social_media,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_children_empties_the_root() {
        let mut card = Card {
            banks: vec![CardBank::new(1), CardBank::new(2)],
            social_media: vec![CardSocialMedia::new(3)],
            ..Card::default()
        };
        let (banks, social_media) = card.take_children();
        assert_eq!(banks.len(), 2);
        assert_eq!(social_media.len(), 1);
        assert!(card.banks.is_empty());
        assert!(card.social_media.is_empty());
    }

    #[test]
    fn test_values_align_with_columns() {
        let card = Card::default();
        assert_eq!(card.values().len(), Card::COLUMNS.len());
        assert_eq!(CardBank::default().values().len(), CardBank::COLUMNS.len());
        assert_eq!(
            CardSocialMedia::default().values().len(),
            CardSocialMedia::COLUMNS.len()
        );
    }

    #[test]
    fn test_repository_config() {
        let config = repository_config();
        assert_eq!(config.relation_names(), vec!["banks", "social_media"]);
        assert_eq!(config.whitelist().resolve("slug"), "slug");
        assert_eq!(config.whitelist().resolve("email"), "id");
    }
}
