//! Submitted form data mapped onto entities
//!
//! Request types mirror the admin forms field for field. Checkboxes arrive as
//! the string `"true"` when ticked and are turned into booleans here; list
//! fields become the child snapshot of the aggregate they describe.

use serde::{Deserialize, Serialize};

use crate::models::{
    Bank, Card, CardBank, CardSocialMedia, Invitation, InvitationCategory, InvitationDetail,
    InvitationParticipant, SocialMedia,
};
use crate::repository::{FieldPatch, Id};

/// Guest count assumed for a participant row submitted without one
pub const DEFAULT_GUEST_COUNT: i64 = 1;

fn checked(value: &str) -> bool {
    value == "true"
}

fn guest_count(count: Option<i64>) -> i64 {
    count.filter(|count| *count > 0).unwrap_or(DEFAULT_GUEST_COUNT)
}

/// Card form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRequest {
    pub name: String,
    pub slug: String,
    pub user_id: Id,
    pub photo: String,
    pub telephone: String,
    pub email: String,
    pub location: String,
    pub website: String,
    pub is_active: String,
    pub bank_ids: Vec<Id>,
    pub social_media_ids: Vec<Id>,
}

impl CardRequest {
    /// Card root carrying one association row per selected bank and platform
    pub fn into_card(self) -> Card {
        Card {
            user_id: self.user_id,
            is_active: checked(&self.is_active),
            banks: self.bank_ids.into_iter().map(CardBank::new).collect(),
            social_media: self
                .social_media_ids
                .into_iter()
                .map(CardSocialMedia::new)
                .collect(),
            name: self.name,
            slug: self.slug,
            photo: self.photo,
            telephone: self.telephone,
            email: self.email,
            location: self.location,
            website: self.website,
            ..Card::default()
        }
    }
}

/// Invitation form, including the detail fields and participant rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvitationRequest {
    pub invitation_key: String,
    pub user_id: Id,
    pub category_id: Id,
    pub template: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub image: String,
    pub description: String,
    pub venue: String,
    pub address: String,
    pub location: String,
    pub link: String,
    pub telephone: String,
    pub note: String,
    pub date: String,
    pub time: String,
    pub is_confirmed: String,
    pub is_participant: String,
    pub detail_title: String,
    pub detail_person: String,
    pub participant_titles: Vec<String>,
    pub participant_phones: Vec<String>,
    pub participant_counts: Vec<i64>,
}

impl InvitationRequest {
    /// Invitation root carrying its detail row and participant rows
    ///
    /// The detail is present when either detail field is filled in.
    /// Participants are built positionally from the three participant lists,
    /// one per non-blank title; a missing phone is left empty and a missing or
    /// non-positive count becomes [`DEFAULT_GUEST_COUNT`].
    pub fn into_invitation(self) -> Invitation {
        let detail = (!self.detail_title.trim().is_empty()
            || !self.detail_person.trim().is_empty())
        .then(|| InvitationDetail {
            title: self.detail_title.clone(),
            person: self.detail_person.clone(),
            ..InvitationDetail::default()
        });

        let participants = self
            .participant_titles
            .iter()
            .enumerate()
            .filter(|(_, title)| !title.trim().is_empty())
            .map(|(index, title)| InvitationParticipant {
                title: title.clone(),
                phone_number: self
                    .participant_phones
                    .get(index)
                    .cloned()
                    .unwrap_or_default(),
                guest_count: guest_count(self.participant_counts.get(index).copied()),
                ..InvitationParticipant::default()
            })
            .collect();

        Invitation {
            invitation_key: self.invitation_key,
            user_id: self.user_id,
            category_id: self.category_id,
            template: self.template,
            kind: self.kind,
            title: self.title,
            image: self.image,
            description: self.description,
            venue: self.venue,
            address: self.address,
            location: self.location,
            link: self.link,
            telephone: self.telephone,
            note: self.note,
            date: self.date,
            time: self.time,
            is_confirmed: checked(&self.is_confirmed),
            is_participant: checked(&self.is_participant),
            detail,
            participants,
            ..Invitation::default()
        }
    }
}

/// Participant edit form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvitationParticipantRequest {
    pub title: String,
    pub phone_number: String,
    pub guest_count: i64,
}

impl InvitationParticipantRequest {
    /// Patch touching only the editable participant columns
    ///
    /// A non-positive count becomes [`DEFAULT_GUEST_COUNT`].
    pub fn into_patch(self) -> FieldPatch {
        FieldPatch::new()
            .set("title", self.title)
            .set("phone_number", self.phone_number)
            .set("guest_count", guest_count(Some(self.guest_count)))
    }
}

/// Bank form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankRequest {
    pub name: String,
    pub iban: String,
    pub is_active: String,
}

impl From<BankRequest> for Bank {
    fn from(request: BankRequest) -> Self {
        Self {
            name: request.name,
            iban: request.iban,
            is_active: checked(&request.is_active),
            ..Self::default()
        }
    }
}

/// Social-media form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialMediaRequest {
    pub name: String,
    pub icon: String,
    pub is_active: String,
}

impl From<SocialMediaRequest> for SocialMedia {
    fn from(request: SocialMediaRequest) -> Self {
        Self {
            name: request.name,
            icon: request.icon,
            is_active: checked(&request.is_active),
            ..Self::default()
        }
    }
}

/// Invitation category form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvitationCategoryRequest {
    pub name: String,
    pub icon: String,
    pub template: String,
    pub is_active: String,
}

impl From<InvitationCategoryRequest> for InvitationCategory {
    fn from(request: InvitationCategoryRequest) -> Self {
        Self {
            name: request.name,
            icon: request.icon,
            template: request.template,
            is_active: checked(&request.is_active),
            ..Self::default()
        }
    }
}

impl From<CardRequest> for Card {
    fn from(request: CardRequest) -> Self {
        request.into_card()
    }
}

impl From<InvitationRequest> for Invitation {
    fn from(request: InvitationRequest) -> Self {
        request.into_invitation()
    }
}
