//! Invitations with their detail row and participant list

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::aggregate::Aggregate;
use crate::repository::{
    AuditStamp, ChildEntity, ChildLoader, Entity, FieldValue, Id, RepositoryConfig,
    SortWhitelist,
};

/// An event invitation published under `invitation_key`
///
/// `detail` and `participants` are the child snapshot of the invitation, loaded
/// on read and fully replaced on write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Invitation {
    pub id: Id,
    pub invitation_key: String,
    pub user_id: Id,
    pub category_id: Id,
    pub template: String,
    #[sqlx(rename = "type")]
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
    pub is_confirmed: bool,
    pub is_participant: bool,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditStamp,
    #[sqlx(skip)]
    #[serde(default)]
    pub detail: Option<InvitationDetail>,
    #[sqlx(skip)]
    #[serde(default)]
    pub participants: Vec<InvitationParticipant>,
}

impl Entity for Invitation {
    const TABLE: &'static str = "invitations";
    const NAME: &'static str = "Invitation";
    const COLUMNS: &'static [&'static str] = &[
        "invitation_key",
        "user_id",
        "category_id",
        "template",
        "type",
        "title",
        "image",
        "description",
        "venue",
        "address",
        "location",
        "link",
        "telephone",
        "note",
        "date",
        "time",
        "is_confirmed",
        "is_participant",
    ];
    const OWNER_COLUMN: Option<&'static str> = Some("user_id");

    fn id(&self) -> Id {
        self.id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.invitation_key.clone().into(),
            self.user_id.into(),
            self.category_id.into(),
            self.template.clone().into(),
            self.kind.clone().into(),
            self.title.clone().into(),
            self.image.clone().into(),
            self.description.clone().into(),
            self.venue.clone().into(),
            self.address.clone().into(),
            self.location.clone().into(),
            self.link.clone().into(),
            self.telephone.clone().into(),
            self.note.clone().into(),
            self.date.clone().into(),
            self.time.clone().into(),
            self.is_confirmed.into(),
            self.is_participant.into(),
        ]
    }
}

impl Aggregate for Invitation {
    type Children = (Option<InvitationDetail>, Vec<InvitationParticipant>);

    fn take_children(&mut self) -> Self::Children {
        (self.detail.take(), std::mem::take(&mut self.participants))
    }
}

/// Headline and hosts of an invitation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InvitationDetail {
    pub id: Id,
    pub invitation_id: Id,
    pub title: String,
    pub person: String,
}

impl Entity for InvitationDetail {
    const TABLE: &'static str = "invitation_details";
    const NAME: &'static str = "InvitationDetail";
    const COLUMNS: &'static [&'static str] = &["invitation_id", "title", "person"];
    const AUDITED: bool = false;

    fn id(&self) -> Id {
        self.id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.invitation_id.into(),
            self.title.clone().into(),
            self.person.clone().into(),
        ]
    }
}

impl ChildEntity for InvitationDetail {
    const PARENT_KEY: &'static str = "invitation_id";

    fn parent_id(&self) -> Id {
        self.invitation_id
    }

    fn set_parent_id(&mut self, parent_id: Id) {
        self.invitation_id = parent_id;
    }
}

/// A guest who responded to an invitation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InvitationParticipant {
    pub id: Id,
    pub invitation_id: Id,
    pub title: String,
    pub phone_number: String,
    pub guest_count: i64,
}

impl Entity for InvitationParticipant {
    const TABLE: &'static str = "invitation_participants";
    const NAME: &'static str = "InvitationParticipant";
    const COLUMNS: &'static [&'static str] =
        &["invitation_id", "title", "phone_number", "guest_count"];
    const AUDITED: bool = false;

    fn id(&self) -> Id {
        self.id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.invitation_id.into(),
            self.title.clone().into(),
            self.phone_number.clone().into(),
            self.guest_count.into(),
        ]
    }
}

impl ChildEntity for InvitationParticipant {
    const PARENT_KEY: &'static str = "invitation_id";

    fn parent_id(&self) -> Id {
        self.invitation_id
    }

    fn set_parent_id(&mut self, parent_id: Id) {
        self.invitation_id = parent_id;
    }
}

pub fn repository_config() -> RepositoryConfig<Invitation> {
    RepositoryConfig::new(SortWhitelist::new(
        &["id", "invitation_key", "user_id", "category_id", "created_at"],
        "id",
    ))
    .with_relation(ChildLoader::<Invitation, InvitationDetail>::new(
        "detail",
        |invitation, details| invitation.detail = details.into_iter().next(),
    ))
    .with_relation(ChildLoader::<Invitation, InvitationParticipant>::new(
        "participants",
        |invitation, participants| invitation.participants = participants,
    ))
}

/// Repository configuration for participants listed on their own
pub fn participant_repository_config() -> RepositoryConfig<InvitationParticipant> {
    RepositoryConfig::new(SortWhitelist::new(&["id", "title", "guest_count"], "id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_column_maps_to_kind() {
        let invitation = Invitation {
            kind: "wedding".to_string(),
            ..Invitation::default()
        };
        let position = Invitation::COLUMNS
            .iter()
            .position(|column| *column == "type")
            .unwrap();
        assert_eq!(
            invitation.values()[position],
            FieldValue::Text("wedding".to_string())
        );

        let json = serde_json::to_value(&invitation).unwrap();
        assert_eq!(json["type"], "wedding");
    }

    #[test]
    fn test_take_children() {
        let mut invitation = Invitation {
            detail: Some(InvitationDetail::default()),
            participants: vec![InvitationParticipant::default()],
            ..Invitation::default()
        };
        let (detail, participants) = invitation.take_children();
        assert!(detail.is_some());
        assert_eq!(participants.len(), 1);
        assert!(invitation.detail.is_none());
        assert!(invitation.participants.is_empty());
    }

    #[test]
    fn test_values_align_with_columns() {
        assert_eq!(Invitation::default().values().len(), Invitation::COLUMNS.len());
        assert_eq!(
            InvitationDetail::default().values().len(),
            InvitationDetail::COLUMNS.len()
        );
        assert_eq!(
            InvitationParticipant::default().values().len(),
            InvitationParticipant::COLUMNS.len()
        );
    }
}
