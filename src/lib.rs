//! # Collab Server Library
//!
//! Real-time collaboration core of a project-management workspace:
//! - Authenticated WebSocket connections
//! - Project-scoped chat rooms and meeting rooms
//! - Presence and TTL-expiring typing indicators
//! - Persist-then-broadcast message relay (PostgreSQL)
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core entities and store traits
//! - **Application Layer**: Collaboration services and wire DTOs
//! - **Infrastructure Layer**: PostgreSQL repositories and metrics
//! - **Presentation Layer**: HTTP handlers and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! collab_server/
//! +-- config/         Configuration management
//! +-- domain/         Entities and store traits
//! +-- application/    Rooms, presence, typing, relay, meetings
//! +-- infrastructure/ Database repositories and metrics
//! +-- presentation/   HTTP routes and WebSocket handlers
//! +-- shared/         Errors and validation helpers
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
