//! Service layer: paginated reads, request-driven writes and the dashboard

mod common;

use davet_store::prelude::*;

#[tokio::test]
async fn test_card_service_round_trip_from_request() {
    let pool = common::memory_pool().await;
    let banks = common::seed_banks(&pool, 2).await;
    let platforms = common::seed_social_media(&pool, 1).await;
    let config = common::config();
    let cards = CardService::new(pool, &config);
    let ctx = cards.write_context();

    let request = CardRequest {
        name: "Ada".to_string(),
        slug: "ada".to_string(),
        user_id: 11,
        is_active: "true".to_string(),
        bank_ids: banks.clone(),
        social_media_ids: platforms.clone(),
        ..CardRequest::default()
    };
    let id = cards
        .create_card(&ctx, request.into_card(), ActorId::new(11))
        .await
        .unwrap();

    let card = cards.get_card_by_id(id).await.unwrap();
    assert!(card.is_active);
    assert_eq!(card.banks.len(), 2);
    assert_eq!(card.social_media.len(), 1);
    assert_eq!(cards.count_cards().await.unwrap(), 1);

    let edit = CardRequest {
        name: "Ada".to_string(),
        slug: "ada".to_string(),
        user_id: 11,
        bank_ids: vec![banks[1]],
        ..CardRequest::default()
    };
    cards
        .update_card(&ctx, id, edit.into(), ActorId::new(11))
        .await
        .unwrap();

    let card = cards.get_card_by_id(id).await.unwrap();
    assert!(!card.is_active);
    assert_eq!(card.banks.len(), 1);
    assert_eq!(card.banks[0].bank_id, banks[1]);
    assert!(card.social_media.is_empty());

    cards.delete_card(&ctx, id).await.unwrap();
    let err = cards.get_card_by_id(id).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, Error::NotFound { ref entity, .. } if entity == "Card"));
}

#[tokio::test]
async fn test_card_listing_pages_and_owner_lookups() {
    let pool = common::memory_pool().await;
    let config = common::config();
    let cards = CardService::new(pool, &config);
    let ctx = cards.write_context();

    for n in 1..=12 {
        let owner = if n % 3 == 0 { 2 } else { 1 };
        cards
            .create_card(
                &ctx,
                common::card(&format!("card-{n:02}"), owner),
                ActorId::new(owner),
            )
            .await
            .unwrap();
    }

    let params = ListParams::from_query("page=2&per_page=5&sort_by=slug", &config.pagination);
    let page = cards.get_all_cards(&params).await;
    assert_eq!(
        page.data.iter().map(|c| c.slug.as_str()).collect::<Vec<_>>(),
        vec!["card-06", "card-07", "card-08", "card-09", "card-10"]
    );
    assert_eq!(page.meta.total_pages, 3);
    assert_eq!(page.meta.total_items, 12);

    let (owned, total) = cards
        .get_all_cards_by_owner(2, &ListParams::default())
        .await
        .unwrap();
    assert_eq!(total, 4);
    assert!(owned.iter().all(|c| c.user_id == 2));

    let first = cards.get_cards_by_user_id(2).await.unwrap().unwrap();
    assert_eq!(first.slug, "card-03");
    assert!(cards.get_cards_by_user_id(99).await.unwrap().is_none());
}

#[tokio::test]
async fn test_reads_degrade_to_an_empty_page() {
    let pool = common::memory_pool().await;
    let config = common::config();
    let cards = CardService::new(pool.clone(), &config);
    pool.close().await;

    let params = ListParams::new(3, 7, "name", SortOrder::Desc);
    let page = cards.get_all_cards(&params).await;
    assert!(page.is_empty());
    assert_eq!(
        page.meta,
        PaginationMeta {
            current_page: 3,
            per_page: 7,
            total_items: 0,
            total_pages: 0,
        }
    );

    assert!(cards.count_cards().await.is_err());
}

#[tokio::test]
async fn test_invitation_participants_can_be_edited_individually() {
    let pool = common::memory_pool().await;
    let config = common::config();
    let invitations = InvitationService::new(pool, &config);
    let ctx = invitations.write_context();

    let request = InvitationRequest {
        invitation_key: "nisan".to_string(),
        user_id: 4,
        kind: "engagement".to_string(),
        participant_titles: vec!["Ali".to_string(), "Veli".to_string(), "Can".to_string()],
        participant_counts: vec![1, 2, 3],
        ..InvitationRequest::default()
    };
    let id = invitations
        .create_invitation(&ctx, request.into(), ActorId::new(4))
        .await
        .unwrap();

    let params = ListParams::new(1, 10, "guest_count", SortOrder::Desc);
    let participants = invitations
        .get_participants_by_invitation_id(id, &params)
        .await;
    assert_eq!(participants.meta.total_items, 3);
    assert_eq!(participants.data[0].title, "Can");

    let target = participants.data[2].id;
    let patch = InvitationParticipantRequest {
        title: "Ali Bey".to_string(),
        phone_number: "5551112233".to_string(),
        guest_count: 5,
    }
    .into_patch();
    invitations
        .update_participant(&ctx, target, &patch)
        .await
        .unwrap();

    let delete_target = participants.data[1].id;
    invitations
        .delete_participant(&ctx, delete_target)
        .await
        .unwrap();
    let err = invitations
        .delete_participant(&ctx, delete_target)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let invitation = invitations.get_invitation_by_id(id).await.unwrap();
    assert!(invitation.detail.is_none());
    assert_eq!(
        invitation
            .participants
            .iter()
            .map(|p| (p.title.as_str(), p.guest_count))
            .collect::<Vec<_>>(),
        vec![("Ali Bey", 5), ("Can", 3)]
    );
    assert_eq!(invitations.count_invitations().await.unwrap(), 1);

    let (mine, total) = invitations
        .get_all_invitations_by_owner(4, &ListParams::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(mine[0].participants.len(), 2);
}

#[tokio::test]
async fn test_invitation_delete_removes_dependents() {
    let pool = common::memory_pool().await;
    let config = common::config();
    let invitations = InvitationService::new(pool.clone(), &config);
    let ctx = invitations.write_context();

    let request = InvitationRequest {
        invitation_key: "kina".to_string(),
        user_id: 8,
        detail_title: "Kına Gecesi".to_string(),
        participant_titles: vec!["Ayşe".to_string()],
        ..InvitationRequest::default()
    };
    let id = invitations
        .create_invitation(&ctx, request.into_invitation(), ActorId::new(8))
        .await
        .unwrap();

    invitations.delete_invitation(&ctx, id).await.unwrap();

    assert!(invitations.get_invitation_by_id(id).await.unwrap_err().is_not_found());
    assert_eq!(common::table_rows(&pool, "invitation_details").await, 0);
    assert_eq!(common::table_rows(&pool, "invitation_participants").await, 0);
    assert!(invitations.get_all_invitations(&ListParams::default()).await.is_empty());
}

#[tokio::test]
async fn test_catalog_service_crud() {
    let pool = common::memory_pool().await;
    let config = common::config();
    let banks = BankService::new(pool, &config);
    let ctx = banks.write_context();

    let request = BankRequest {
        name: "Ziraat".to_string(),
        iban: "TR000000000000000000000001".to_string(),
        is_active: "true".to_string(),
    };
    let id = banks
        .create(&ctx, &Bank::from(request), ActorId::new(1))
        .await
        .unwrap();

    let mut bank = banks.get_by_id(id).await.unwrap();
    assert!(bank.is_active);
    bank.name = "T.C. Ziraat Bankası".to_string();
    bank.is_active = false;
    banks.update(&ctx, id, &bank, ActorId::new(2)).await.unwrap();

    let stored = banks.get_by_id(id).await.unwrap();
    assert_eq!(stored.name, "T.C. Ziraat Bankası");
    assert!(!stored.is_active);
    assert_eq!(stored.audit.updated_by, 2);

    let page = banks.get_all(&ListParams::default()).await;
    assert_eq!(page.len(), 1);
    assert_eq!(banks.count().await.unwrap(), 1);

    banks.delete(&ctx, id).await.unwrap();
    assert!(banks.get_by_id(id).await.unwrap_err().is_not_found());
    let err = banks
        .update(&ctx, id, &stored, ActorId::new(2))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_catalog_write_respects_cancellation() {
    let pool = common::memory_pool().await;
    let config = common::config();
    let categories = InvitationCategoryService::new(pool, &config);

    let token = CancellationToken::new();
    token.cancel();
    let ctx = categories.write_context().with_cancellation(token);

    let category = InvitationCategory::from(InvitationCategoryRequest {
        name: "Düğün".to_string(),
        ..InvitationCategoryRequest::default()
    });
    let err = categories
        .create(&ctx, &category, ActorId::new(1))
        .await
        .unwrap_err();
    assert_eq!(err.repository_kind(), Some(RepositoryErrorKind::Cancelled));
    assert_eq!(categories.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_dashboard_counts_every_entity() {
    let pool = common::memory_pool().await;
    let config = common::config();
    common::seed_banks(&pool, 3).await;
    common::seed_social_media(&pool, 2).await;

    let cards = CardService::new(pool.clone(), &config);
    let ctx = cards.write_context();
    cards
        .create_card(&ctx, common::card("one", 1), ActorId::new(1))
        .await
        .unwrap();

    let categories = InvitationCategoryService::new(pool.clone(), &config);
    categories
        .create(
            &ctx,
            &InvitationCategory::from(InvitationCategoryRequest {
                name: "Sünnet".to_string(),
                ..InvitationCategoryRequest::default()
            }),
            ActorId::new(1),
        )
        .await
        .unwrap();

    let summary = DashboardService::new(pool.clone()).summary().await;
    assert_eq!(
        summary,
        DashboardSummary {
            cards: 1,
            invitations: 0,
            participants: 0,
            banks: 3,
            social_media: 2,
            invitation_categories: 1,
        }
    );

    pool.close().await;
    let summary = DashboardService::new(pool).summary().await;
    assert_eq!(summary, DashboardSummary::default());
}
