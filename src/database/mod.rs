pub mod manager;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod schema;
pub mod service;

pub use manager::{DatabaseError, DatabaseManager};
pub use pagination::{ListQuery, PageRequest, Paginated, Pagination};
pub use repository::Repository;
