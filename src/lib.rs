/*!
# Record Table

A small data-table service with its client-side engine, built in Rust.

## Overview

The record server keeps an in-memory list of people records and exposes it
over HTTP. The client side fetches those records, and a larger third-party
dataset, and derives filtered views from them. New records are shown
optimistically before the server confirms them and rolled back if the write
fails.

## Architecture

### Backend Layer
- **Technologies**: Rust, axum, tokio
- **Core Components**:
  - Record Store - Insertion-ordered records living as long as the process
  - HTTP Routes - Liveness, list and append endpoints with permissive CORS

### Client Layer
- **Technologies**: Rust, reqwest
- **Key Components**:
  - Filter Engine - Case-insensitive substring filters plus a three-mode age filter
  - Optimistic Cache - Tentative rows, commit by refetch, rollback by snapshot
  - Dataset Reader - Lenient parsing of the third-party payload
  - Viewer - Command-line table printer

## Modules

- **record**: Record struct and description template
- **store**: In-memory record store
- **app**: Routing, handlers and server lifecycle
- **filter**: Filter criteria, age modes and row matching
- **dataset**: Third-party dataset items, nested rows and trees
- **optimistic**: Client cache and submission state machine
- **client**: HTTP transport for the record server and dataset
- **config**: Server and client configuration
- **error**: Error types for handlers and the client

## REST API Endpoints

- `GET /` - Liveness check, answers `Hello World!`
- `GET /getData` - All records as a JSON array
- `POST /postData` - Appends the JSON body as a new record and returns it
*/

pub mod app;
pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod optimistic;
pub mod record;
pub mod store;

/// Re-export the types most callers need
pub use client::{HttpClient, RecordTransport};
pub use config::{ClientConfig, ServerConfig};
pub use dataset::{Dataset, DatasetItem};
pub use error::{ApiError, ClientError};
pub use filter::{AgeMode, FilterCriteria, apply_filters};
pub use optimistic::RecordTable;
pub use record::Record;
pub use store::RecordStore;
