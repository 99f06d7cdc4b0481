pub mod api;
pub mod config;
pub mod consent;
pub mod domain;
pub mod drift;
pub mod entities;
pub mod messaging;
pub mod pipeline;
pub mod storage;
pub mod text;
