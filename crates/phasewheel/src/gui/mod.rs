pub mod app;
pub mod keys;
pub mod scene;
pub mod theme;
