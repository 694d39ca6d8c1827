//! `SeaORM` Entity for personnel table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "personnel")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub position: Option<String>,
    pub monthly_salary: Option<Decimal>,
    pub salary_currency: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::salary_records::Entity")]
    SalaryRecords,
    #[sea_orm(has_many = "super::advance_records::Entity")]
    AdvanceRecords,
}

impl Related<super::salary_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalaryRecords.def()
    }
}

impl Related<super::advance_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdvanceRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
