pub mod credential;
pub mod publish;
pub mod repository;
