//! Tollgate: a terminal chat agent whose tool calls can pause for
//! authorization and human approval.
//!
//! An [`engine::ExecutionEngine`] runs the model/tool loop as a stream of
//! events. When a tool call needs the user's consent the pass ends with a
//! batch of [`interrupt::Suspension`]s; the [`control`] loop resolves each
//! one (waiting on an out-of-band authorization flow or asking a yes/no
//! question) and resumes the engine with the decisions.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tollgate::api::ApiClient;
//! use tollgate::catalog::ArcadeClient;
//! use tollgate::config::load_config;
//! use tollgate::control::{ResumeLoop, SessionLoop};
//! use tollgate::engine::{AgentEngine, AgentSettings, SessionContext};
//! use tollgate::ui::{input::ConsoleInput, render::Renderer};
//!
//! # async fn example() {
//! let config = load_config(None).unwrap();
//! let catalog = Arc::new(ArcadeClient::new(&config.catalog));
//! let engine = AgentEngine::new(
//!     AgentSettings::from_config(&config, "You are an X assistant.".into()),
//!     Arc::new(ApiClient::new(&config.model)),
//!     catalog.clone(),
//!     Vec::new(),
//! );
//! let session = SessionContext::from_configured("");
//! let renderer = Renderer::new(true, true);
//! let mut input = ConsoleInput::new();
//! let turns = ResumeLoop::new(&engine, catalog.as_ref(), &renderer, &session);
//! SessionLoop::new(turns, &renderer, &mut input).run().await;
//! # }
//! ```

pub mod api;
pub mod build_info;
pub mod catalog;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod interrupt;
pub mod logging;
pub mod preflight;
pub mod prompt;
pub mod session;
#[cfg(test)]
pub mod testsupport;
pub mod textutil;
pub mod types;
pub mod ui;
