//! Shared domain types

mod account;
mod group;
mod role;

pub use account::{Account, AccountOrgFields, NewAccount};
pub use group::{Group, NewGroup};
pub use role::Role;
