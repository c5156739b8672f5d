//! bloodlink core: domain models, the ABO/Rh compatibility relation,
//! the shared error taxonomy and repository traits.

pub mod compatibility;
pub mod error;
pub mod models;
pub mod repository;
