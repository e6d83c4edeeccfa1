//! Backoffice web application: server-rendered admin over the listing kit.
//!
//! ## Overview
//!
//! Every page is rendered on the server with Tera. Navigation uses HTMX: a
//! request carrying `HX-Request: true` gets the page fragment, anything else
//! gets the full page wrapped in `base.html`. Listings (users, items, the
//! dashboard's demo services) are declared once in `listings.rs` and run
//! through `backoffice_kit` for search, sort, pagination and export.
//!
//! ## Module Map
//!
//! ```text
//! ┌──────────┐   HTTP   ┌──────────────────────────────────────────────────┐
//! │ Browser  │ ───────> │  server.rs  (axum Router, ServerConfig, static)  │
//! │  (HTMX)  │ <─────── │    └─ api.rs  (routes, AppState, ApiError)       │
//! └──────────┘  HTML    │         │                                        │
//!                       │         │ Principal + Htmx extractors            │
//!                       │         v                                        │
//!                       │  views/*.rs  (one module per section)            │
//!                       │         │                                        │
//!                       │         │ table_view() / export_response()       │
//!                       │         v                                        │
//!                       │  views/crud.rs ──> backoffice_kit                │
//!                       │         │                                        │
//!                       │         │ DbHandle::call()                       │
//!                       │         v                                        │
//!                       │  db.rs  (BackofficeDb over rusqlite)             │
//!                       └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Supporting Modules
//!
//! | Module       | Responsibility                                          |
//! |--------------|---------------------------------------------------------|
//! | `models`     | `User`, `Item`, `GlobalConfig` and permission codenames |
//! | `forms`      | Form payloads, validation, Spanish error messages       |
//! | `auth`       | `Principal` extractor, `Authorizer` trait               |
//! | `htmx`       | HTMX request headers and the modal-close trigger        |
//! | `listings`   | Listing declarations and config overrides               |
//! | `templates`  | Tera `Renderer` over the embedded templates             |
//! | `passwords`  | argon2 hashing and verification                         |
//! | `embedded`   | Templates and static assets baked in (`rust-embed`)     |
//!
//! ## Typical Request Flow (create a user from the modal)
//!
//! 1. `POST /users/create/` → `views::users::create()`
//! 2. `Principal` is resolved from the trusted user header; the
//!    `Authorizer` must grant `can_create` or the answer is `403`.
//! 3. The form is validated inside `DbHandle::call` (uniqueness checks hit
//!    the database); errors re-render the modal with a `200`.
//! 4. On success the table is rebuilt from the `HX-Current-URL` state and
//!    sent as an out-of-band swap with `HX-Trigger: {"modalClose": true}`.

pub mod api;
pub mod auth;
pub mod db;
pub mod embedded;
pub mod forms;
pub mod htmx;
pub mod listings;
pub mod models;
pub mod passwords;
pub mod server;
pub mod templates;
pub mod views;
