pub mod health_handlers;
pub mod retrieve_handlers;
pub mod upload_handlers;
