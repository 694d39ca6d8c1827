//! Postgres enum types and their mapping to the domain enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use kasa_core::currency::RateOrigin as DomainRateOrigin;
use kasa_core::ledger::{
    AccountMode as DomainAccountMode, AccountType as DomainAccountType,
    TransactionStatus as DomainTransactionStatus, TransactionType as DomainTransactionType,
    TransferDirection as DomainTransferDirection,
};

/// Maps a db enum onto its domain twin in both directions.
macro_rules! mirror_enum {
    ($db:ident, $domain:ident, [$($variant:ident),+ $(,)?]) => {
        impl From<$domain> for $db {
            fn from(value: $domain) -> Self {
                match value {
                    $($domain::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$db> for $domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => $domain::$variant,)+
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "CASH")]
    Cash,
    #[sea_orm(string_value = "BANK")]
    Bank,
    #[sea_orm(string_value = "CARD")]
    Card,
    #[sea_orm(string_value = "E_WALLET")]
    EWallet,
    #[sea_orm(string_value = "CUSTOM")]
    Custom,
}

mirror_enum!(AccountType, DomainAccountType, [Cash, Bank, Card, EWallet, Custom]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_mode")]
pub enum AccountMode {
    #[sea_orm(string_value = "SINGLE")]
    Single,
    #[sea_orm(string_value = "MULTI")]
    Multi,
}

mirror_enum!(AccountMode, DomainAccountMode, [Single, Multi]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
pub enum TransactionType {
    #[sea_orm(string_value = "INCOME")]
    Income,
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
    #[sea_orm(string_value = "EXCHANGE")]
    Exchange,
}

mirror_enum!(TransactionType, DomainTransactionType, [Income, Expense, Transfer, Exchange]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

mirror_enum!(TransactionStatus, DomainTransactionStatus, [Pending, Completed, Cancelled]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transfer_direction")]
pub enum TransferDirection {
    #[sea_orm(string_value = "IN")]
    In,
    #[sea_orm(string_value = "OUT")]
    Out,
}

mirror_enum!(TransferDirection, DomainTransferDirection, [In, Out]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rate_origin")]
pub enum RateOrigin {
    #[sea_orm(string_value = "UPSTREAM")]
    Upstream,
    #[sea_orm(string_value = "MANUAL")]
    Manual,
    #[sea_orm(string_value = "IDENTITY")]
    Identity,
}

mirror_enum!(RateOrigin, DomainRateOrigin, [Upstream, Manual, Identity]);
