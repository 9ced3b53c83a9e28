//! Agenda Core Library
//!
//! This crate provides the core functionality for Agenda, a client for a
//! remote contact service: it keeps the contact list in memory, filters it,
//! and runs the edit, create, and delete workflows against the service.
//!
//! # Architecture
//!
//! - **Remote service**: source of truth, reached through the
//!   `ContactService` trait (`HttpContactService` in production)
//! - **ContactScreen**: owns the last known server state and reconciles it
//!   after each round-trip
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let service = HttpContactService::new(&config.service_url()?, config.request_timeout())?;
//! let mut screen = ContactScreen::new(Arc::new(service));
//!
//! screen.load_all().await?;
//! screen.set_search_term("ana");
//!
//! screen.begin_edit(2).await?;
//! screen.update_field(ContactField::Tel, "555")?;
//! screen.commit_edit().await?;
//! ```
//!
//! # Modules
//!
//! - `screen`: Screen controller (main entry point)
//! - `models`: Contact record, draft, and field names
//! - `filter`: Search filtering
//! - `session`: Edit and create drafts
//! - `service`: Remote contact service port and HTTP adapter
//! - `error`: Error types
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod screen;
pub mod service;
pub mod session;

pub use config::{Config, Environment};
pub use error::{ScreenError, ServiceError, ServiceResult};
pub use models::{Contact, ContactDraft, ContactField, ContactId};
pub use screen::{
    Confirm, ContactScreen, DeleteOutcome, Mode, Notice, NoticeLevel, PendingCreate,
    PendingUpdate, ScreenView,
};
pub use service::{ContactService, HttpContactService};
pub use session::{CreateSession, EditSession, SessionTicket};
