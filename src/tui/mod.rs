pub mod app;
pub mod ui;
pub mod utils;

pub use app::App;
