pub mod api;
pub mod config;
pub mod dispatch;
pub mod frontend;
pub mod normalize;
pub mod notify;
pub mod panel;
pub mod scheduler;
pub mod state;
pub mod types;
