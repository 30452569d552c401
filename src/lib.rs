pub mod agri;
pub mod config;
pub mod image;
pub mod models;
pub mod utils;
pub mod web;

// 重新导出主要类型
pub use config::Config;
pub use utils::error::AgriError;

pub type Result<T> = std::result::Result<T, AgriError>;
