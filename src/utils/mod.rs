pub mod date_path;
pub mod jwt;
