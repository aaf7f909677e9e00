//! Shared fixtures for integration tests

#![allow(dead_code)]

use davet_store::prelude::*;
use sqlx::SqlitePool;

pub async fn memory_pool() -> SqlitePool {
    create_memory_pool()
        .await
        .expect("in-memory pool should start")
}

pub fn config() -> Config {
    Config::default()
}

pub async fn seed_banks(pool: &SqlitePool, count: usize) -> Vec<Id> {
    let repo = EntityRepository::new(pool.clone(), davet_store::models::bank::repository_config());
    let mut conn = pool.acquire().await.expect("connection");
    let banks: Vec<Bank> = (1..=count)
        .map(|n| Bank {
            name: format!("Bank {n:02}"),
            iban: format!("TR{n:024}"),
            is_active: true,
            ..Bank::default()
        })
        .collect();
    repo.bulk_create(&mut *conn, &banks, ActorId::new(1))
        .await
        .expect("seed banks")
}

pub async fn seed_social_media(pool: &SqlitePool, count: usize) -> Vec<Id> {
    let repo = EntityRepository::new(
        pool.clone(),
        davet_store::models::social_media::repository_config(),
    );
    let mut conn = pool.acquire().await.expect("connection");
    let platforms: Vec<SocialMedia> = (1..=count)
        .map(|n| SocialMedia {
            name: format!("Platform {n:02}"),
            icon: format!("icon-{n}"),
            is_active: true,
            ..SocialMedia::default()
        })
        .collect();
    repo.bulk_create(&mut *conn, &platforms, ActorId::new(1))
        .await
        .expect("seed social media")
}

pub fn card(slug: &str, user_id: Id) -> Card {
    Card {
        user_id,
        name: format!("Card {slug}"),
        slug: slug.to_string(),
        email: format!("{slug}@davet.link"),
        is_active: true,
        ..Card::default()
    }
}

pub fn card_with(slug: &str, user_id: Id, bank_ids: &[Id], social_media_ids: &[Id]) -> Card {
    Card {
        banks: bank_ids.iter().copied().map(CardBank::new).collect(),
        social_media: social_media_ids
            .iter()
            .copied()
            .map(CardSocialMedia::new)
            .collect(),
        ..card(slug, user_id)
    }
}

pub fn invitation(key: &str, user_id: Id) -> Invitation {
    Invitation {
        invitation_key: key.to_string(),
        user_id,
        kind: "wedding".to_string(),
        title: format!("Invitation {key}"),
        date: "2026-06-12".to_string(),
        time: "19:30".to_string(),
        ..Invitation::default()
    }
}

/// Rows of `table` whose `parent_key` equals `parent_id`
pub async fn child_rows(pool: &SqlitePool, table: &str, parent_key: &str, parent_id: Id) -> i64 {
    sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table} WHERE {parent_key} = ?"
    ))
    .bind(parent_id)
    .fetch_one(pool)
    .await
    .expect("child count")
}

pub async fn table_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("table count")
}
