pub mod app;
pub mod editor;
pub mod ui;
pub mod viewer_main;
