//! Join table: which services a staff member offers.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub staff_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Staff, Service }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Staff => Entity::belongs_to(crate::staff::Entity)
                .from(Column::StaffId)
                .to(crate::staff::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(crate::catalog::Entity)
                .from(Column::ServiceId)
                .to(crate::catalog::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
