use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session_enrollment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub client_id: i32,
    pub enrolled_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Session, Client }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Session => Entity::belongs_to(crate::session::Entity)
                .from(Column::SessionId)
                .to(crate::session::Column::Id)
                .into(),
            Relation::Client => Entity::belongs_to(crate::client::Entity)
                .from(Column::ClientId)
                .to(crate::client::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
