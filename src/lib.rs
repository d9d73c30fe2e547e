pub mod app;
pub mod client;
pub mod config;
pub mod controller;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod ui;
pub mod view;

pub use app::router;
pub use client::HttpEntryApi;
pub use config::Settings;
pub use controller::{EntryApi, ViewController};
pub use state::AppState;
pub use storage::EntryStore;
pub use view::TableView;
