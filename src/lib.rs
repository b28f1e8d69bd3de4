// Root library of the `irshad` crate: next-term course recommendation for
// Arabic-language study plans. Reexports the modules `main` wires together.
pub mod api_json;
pub mod engine;
pub mod excel;
pub mod matching;
pub mod models;
pub mod offered;
pub mod server;

pub use server::{AppState, run_server};
