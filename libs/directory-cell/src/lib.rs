pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::directory_routes;
pub use services::directory::DirectoryService;
pub use services::tokens::InMemoryTokenRegistry;
