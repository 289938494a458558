//! JSON API over the matching and reconciliation engines.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! pds-match serve --registry registry.json
//!
//! # Custom port and strategy
//! pds-match serve --registry registry.json --port 3000 --strategy cascade --strategy-version 1
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /api/health` - Liveness and registry size
//! - `GET /api/strategies` - Catalogued strategies and the one in use
//! - `POST /api/match` - Match a JSON person record
//! - `POST /api/reconcile` - Reconcile a JSON record with an optional `nhs_number`
//! - `POST /api/raw-match` - One query with caller-supplied `birth_date_tokens`

pub mod server;
