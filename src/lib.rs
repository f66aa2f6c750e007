#![deny(missing_docs)]
//! Signal Assistant Bot
//!
//! A Telegram bot that forwards questions, texts and chart screenshots to
//! Google Gemini and relays the answers back as plain text.

/// Telegram bot implementation
pub mod bot;
/// Configuration management
pub mod config;
/// AI providers and gateway
pub mod llm;
/// Prompt templates
pub mod prompt;
/// Utility functions
pub mod utils;
