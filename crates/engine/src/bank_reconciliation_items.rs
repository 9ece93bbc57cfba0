//! Link records marking one bank transaction as matched to one
//! reconciliation. A transaction may carry at most one item with
//! `is_reconciled = true`; the engine enforces this when seeding and when
//! auto-matching.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bank_reconciliation_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub reconciliation_id: String,
    pub transaction_id: String,
    pub is_reconciled: bool,
    pub matched_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_reconciliations::Entity",
        from = "Column::ReconciliationId",
        to = "super::bank_reconciliations::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    BankReconciliations,
    #[sea_orm(
        belongs_to = "super::bank_transactions::Entity",
        from = "Column::TransactionId",
        to = "super::bank_transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    BankTransactions,
}

impl Related<super::bank_reconciliations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankReconciliations.def()
    }
}

impl Related<super::bank_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
