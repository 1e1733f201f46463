pub mod error;
pub mod forms;
pub mod handlers;
pub mod ingest;
pub mod library;
pub mod logs;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
