use crate::client;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use chrono::Utc;
use anyhow::Result;

use super::setup_test_db;

fn new_client(email: &str) -> client::ActiveModel {
    let now = Utc::now().into();
    client::ActiveModel {
        name: Set("Txn".into()),
        email: Set(email.into()),
        phone: Set(String::new()),
        notes: Set(String::new()),
        marketing_consent: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

/// Rolled back inserts are not visible afterwards
#[tokio::test]
async fn test_transaction_rollback() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;
    let email = format!("rollback_{}@example.com", Utc::now().timestamp_micros());

    let txn = db.begin().await?;
    new_client(&email).insert(&txn).await?;
    txn.rollback().await?;

    let found = client::Entity::find().filter(client::Column::Email.eq(email)).one(&db).await?;
    assert!(found.is_none());
    Ok(())
}

/// Committed inserts persist
#[tokio::test]
async fn test_transaction_commit() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;
    let email = format!("commit_{}@example.com", Utc::now().timestamp_micros());

    let txn = db.begin().await?;
    let created = new_client(&email).insert(&txn).await?;
    txn.commit().await?;

    let found = client::Entity::find_by_id(created.id).one(&db).await?;
    assert_eq!(found.map(|c| c.email), Some(email));
    Ok(())
}
