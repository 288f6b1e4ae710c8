//! Database query functions organized by table.

pub mod accounts;
pub mod blocks;
pub mod communities;
pub mod follows;
pub mod interned;
pub mod notifs;
pub mod posts;
pub mod reblogs;
pub mod votes;
