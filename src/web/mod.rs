pub mod audio_routes;
pub mod config_routes;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
