//! `SeaORM` Entity for transactions table.
//!
//! TRANSFER and EXCHANGE details are flattened into nullable columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{TransactionStatus, TransactionType, TransferDirection};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub transaction_number: String,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub amount: Decimal,
    pub currency: String,
    pub account_id: Uuid,
    pub account_name: String,
    pub transaction_date: Date,
    pub description: String,
    pub category: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub counter_account_id: Option<Uuid>,
    pub counter_account_name: Option<String>,
    pub transfer_direction: Option<TransferDirection>,
    pub counter_currency: Option<String>,
    pub counter_amount: Option<Decimal>,
    pub to_currency: Option<String>,
    pub to_amount: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub personnel_id: Option<Uuid>,
    pub personnel_name: Option<String>,
    pub supplier_name: Option<String>,
    pub payable_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
