//! The module contains the `CashAccount` struct and its entity.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// A cash-on-hand account ("caja").
///
/// The balance is denormalized: it always equals the sum of signed amounts of
/// the account's confirmed movements, and only
/// [`Engine::apply_cash_delta`](crate::Engine) writes it. An optional
/// `max_amount_minor` ceiling caps how much cash the box may hold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashAccount {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub currency_id: String,
    pub ledger_account_id: Option<String>,
    pub balance_minor: i64,
    pub max_amount_minor: Option<i64>,
    pub responsible_user_id: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub name: String,
    pub currency_id: String,
    pub ledger_account_id: Option<String>,
    pub balance_minor: i64,
    pub max_amount_minor: Option<i64>,
    pub responsible_user_id: Option<String>,
    pub active: bool,
    /// Per-account counter used to issue sequential movement references.
    pub movement_seq: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cash_movements::Entity")]
    CashMovements,
}

impl Related<super::cash_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CashAccount> for ActiveModel {
    fn from(account: &CashAccount) -> Self {
        Self {
            id: ActiveValue::Set(account.id.to_string()),
            code: ActiveValue::Set(account.code.clone()),
            name: ActiveValue::Set(account.name.clone()),
            currency_id: ActiveValue::Set(account.currency_id.clone()),
            ledger_account_id: ActiveValue::Set(account.ledger_account_id.clone()),
            balance_minor: ActiveValue::Set(account.balance_minor),
            max_amount_minor: ActiveValue::Set(account.max_amount_minor),
            responsible_user_id: ActiveValue::Set(account.responsible_user_id.clone()),
            active: ActiveValue::Set(account.active),
            movement_seq: ActiveValue::Set(0),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl TryFrom<Model> for CashAccount {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::NotFound("cash account".to_string()))?,
            code: model.code,
            name: model.name,
            currency_id: model.currency_id,
            ledger_account_id: model.ledger_account_id,
            balance_minor: model.balance_minor,
            max_amount_minor: model.max_amount_minor,
            responsible_user_id: model.responsible_user_id,
            active: model.active,
            created_at: model.created_at,
        })
    }
}
