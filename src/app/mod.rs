pub mod bootstrap;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;

pub use middleware::RequestNumber;
pub use server::{build_router, serve};
pub use state::AppState;
