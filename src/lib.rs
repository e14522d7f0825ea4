pub mod app;
pub mod catalog;
pub mod config;
pub mod images;
pub mod meals;
pub mod relay;
pub mod state;
pub mod storage;
