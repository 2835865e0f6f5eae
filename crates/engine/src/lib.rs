//! The ledger engine: accounts, categories, currencies, budgets and
//! operations persisted over SeaORM, with soft-delete lifecycles, dense
//! manual ordering and main-currency exchange rates.
//!
//! [`Engine`] is the single entry point. Every mutating call runs inside one
//! database transaction and stamps who changed what and when.

pub use accounts::AccountKind;
pub use categories::CategoryKind;
pub use error::EngineError;
pub use operations::OperationKind;
pub use ops::{
    AccountChanges, AccountFilter, BudgetChanges, BudgetFilter, CategoryChanges, CategoryFilter,
    CurrencyChanges, CurrencyFilter, Engine, EngineBuilder, EntityState, NewAccount, NewBudget,
    NewCategory, NewCurrency, NewOperation, OperationChanges, OperationFilter, TransferLeg,
};

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod currencies;
mod error;
pub mod operations;
mod ops;
pub mod rates;
mod record;

type ResultEngine<T> = Result<T, EngineError>;
