//! Versioned intake disclaimer text. At most one version is active.

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::info;

use models::{intake_disclaimer, validate::validate_required};

use crate::errors::{ServiceError, ServiceResult};

pub use intake_disclaimer::Model as DisclaimerView;

#[derive(Debug, Clone, Deserialize)]
pub struct DisclaimerInput {
    pub version: String,
    pub content: String,
    #[serde(default)]
    pub active: bool,
}

pub async fn list_disclaimers(db: &DatabaseConnection) -> ServiceResult<Vec<DisclaimerView>> {
    Ok(intake_disclaimer::Entity::find().order_by_desc(intake_disclaimer::Column::CreatedAt).order_by_desc(intake_disclaimer::Column::Id).all(db).await?)
}

pub async fn get_disclaimer(db: &DatabaseConnection, id: i32) -> ServiceResult<DisclaimerView> {
    intake_disclaimer::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("disclaimer"))
}

pub async fn active_disclaimer(db: &DatabaseConnection) -> ServiceResult<DisclaimerView> {
    intake_disclaimer::Entity::find()
        .filter(intake_disclaimer::Column::Active.eq(true))
        .order_by_desc(intake_disclaimer::Column::CreatedAt)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("No active disclaimer found".into()))
}

async fn deactivate_others(txn: &DatabaseTransaction, keep: Option<i32>) -> ServiceResult<()> {
    let mut q = intake_disclaimer::Entity::update_many()
        .col_expr(intake_disclaimer::Column::Active, Expr::value(false))
        .filter(intake_disclaimer::Column::Active.eq(true));
    if let Some(id) = keep {
        q = q.filter(intake_disclaimer::Column::Id.ne(id));
    }
    q.exec(txn).await?;
    Ok(())
}

pub async fn create_disclaimer(db: &DatabaseConnection, input: DisclaimerInput) -> ServiceResult<DisclaimerView> {
    let version = validate_required("version", &input.version, 32)?;
    let content = validate_required("content", &input.content, 20_000)?;
    let txn = db.begin().await?;
    if input.active {
        deactivate_others(&txn, None).await?;
    }
    let m = intake_disclaimer::ActiveModel {
        version: Set(version),
        content: Set(content),
        active: Set(input.active),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(disclaimer_id = m.id, version = %m.version, active = m.active, "disclaimer_created");
    Ok(m)
}

/// Make `id` the only active version.
pub async fn activate_disclaimer(db: &DatabaseConnection, id: i32) -> ServiceResult<DisclaimerView> {
    let current = get_disclaimer(db, id).await?;
    let txn = db.begin().await?;
    deactivate_others(&txn, Some(id)).await?;
    let mut am: intake_disclaimer::ActiveModel = current.into();
    am.active = Set(true);
    let m = am.update(&txn).await?;
    txn.commit().await?;
    info!(disclaimer_id = id, "disclaimer_activated");
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn input(version: &str, active: bool) -> DisclaimerInput {
        DisclaimerInput { version: version.into(), content: format!("Terms {}", version), active }
    }

    #[tokio::test]
    async fn only_one_version_is_active() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        assert!(matches!(active_disclaimer(&db).await, Err(ServiceError::NotFound(_))));

        let v1 = create_disclaimer(&db, input("1.0", true)).await?;
        assert_eq!(active_disclaimer(&db).await?.id, v1.id);

        let v2 = create_disclaimer(&db, input("2.0", true)).await?;
        assert_eq!(active_disclaimer(&db).await?.id, v2.id);
        assert!(!get_disclaimer(&db, v1.id).await?.active);

        let draft = create_disclaimer(&db, input("3.0", false)).await?;
        assert_eq!(active_disclaimer(&db).await?.id, v2.id);

        activate_disclaimer(&db, v1.id).await?;
        let all = list_disclaimers(&db).await?;
        assert_eq!(all.iter().filter(|d| d.active).count(), 1);
        assert!(all.iter().any(|d| d.id == v1.id && d.active));
        assert!(!get_disclaimer(&db, draft.id).await?.active);

        assert!(matches!(create_disclaimer(&db, input("1.0", false)).await, Err(ServiceError::Conflict(_))));
        Ok(())
    }
}
