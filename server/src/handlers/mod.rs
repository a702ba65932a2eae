pub mod auth_handlers;
pub mod jwt;
pub mod project_handlers;
