//! The module contains the `BankAccount` struct and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// A bank account tracked by the treasury.
///
/// Same denormalized-balance contract as [`CashAccount`](crate::CashAccount):
/// the balance equals the sum of signed amounts of the account's cleared
/// transactions and is only written by the engine's delta path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BankAccount {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub bank_name: String,
    pub account_number: String,
    pub currency_id: String,
    pub ledger_account_id: Option<String>,
    pub balance_minor: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub name: String,
    pub bank_name: String,
    pub account_number: String,
    pub currency_id: String,
    pub ledger_account_id: Option<String>,
    pub balance_minor: i64,
    pub active: bool,
    /// Per-account counter used to issue sequential transaction references.
    pub movement_seq: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bank_transactions::Entity")]
    BankTransactions,
}

impl Related<super::bank_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&BankAccount> for ActiveModel {
    fn from(account: &BankAccount) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            code: ActiveValue::Set(account.code.clone()),
            name: ActiveValue::Set(account.name.clone()),
            bank_name: ActiveValue::Set(account.bank_name.clone()),
            account_number: ActiveValue::Set(account.account_number.clone()),
            currency_id: ActiveValue::Set(account.currency_id.clone()),
            ledger_account_id: ActiveValue::Set(account.ledger_account_id.clone()),
            balance_minor: ActiveValue::Set(account.balance_minor),
            active: ActiveValue::Set(account.active),
            movement_seq: ActiveValue::Set(0),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl TryFrom<Model> for BankAccount {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("bank account".to_string()))?,
            code: model.code,
            name: model.name,
            bank_name: model.bank_name,
            account_number: model.account_number,
            currency_id: model.currency_id,
            ledger_account_id: model.ledger_account_id,
            balance_minor: model.balance_minor,
            active: model.active,
            created_at: model.created_at,
        })
    }
}
