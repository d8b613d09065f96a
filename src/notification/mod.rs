pub mod controller;
pub mod model;
pub mod panel;
pub mod producer;
pub mod repository;
pub mod service;
pub mod sound;
pub mod store;
