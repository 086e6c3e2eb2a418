//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite adapter for story storage
//! - HTTP: REST API routes
//! - Ollama: LLM integration for story generation
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod http;
pub mod ollama;
pub mod persistence;
pub mod state;
