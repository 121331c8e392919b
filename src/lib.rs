pub mod actions;
pub mod app;
pub mod backend;
pub mod booking;
pub mod broadcast;
pub mod component_context;
pub mod components;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod keybindings;
pub mod layout;
pub mod logging;
pub mod model;
pub mod runner;
pub mod session;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod window;
