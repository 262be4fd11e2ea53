//! Org Chart SQLite Backend
//!
//! - db: Connection setup and migrations
//! - repository: `HierarchyBackend` over the `hierarchy_items` table

mod db;
mod repository;

#[cfg(test)]
mod tests;

pub use db::init_db;
pub use repository::SqliteHierarchyRepository;
