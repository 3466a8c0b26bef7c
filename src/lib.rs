pub mod answer;
pub mod citations;
pub mod config;
pub mod feedback;
pub mod highlight;
pub mod models;
pub mod server;
pub mod state;

pub use citations::{enumerate_citations, parse_answer};
pub use config::AppConfig;
pub use server::run_server;
