//! # reelmatch API
//!
//! HTTP query front for the reelmatch engine.
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | `GET` | `/health` | Liveness and build summary |
//! | `GET` | `/tags` | Every distinct tag, sorted |
//! | `GET` | `/stats?top=N` | Catalog statistics |
//! | `GET` | `/recommend/title?q=..&k=..` | Items similar to a title |
//! | `GET` | `/recommend/tag?tag=..&k=..` | Items around one tag |
//! | `POST` | `/recommend/tags` | Items around a set of tags |
//! | `POST` | `/catalog/reload` | Rebuild from disk and swap |

pub mod rest;

pub use rest::{routes, RestApi};
