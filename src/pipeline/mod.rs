//! Pipeline stages between "file selected" and "artifact saved".
//!
//! Each submodule implements exactly one step, so each can be tested
//! without the others.
//!
//! ## Data Flow
//!
//! ```text
//! gate ──▶ service ──▶ rewrite ──▶ download / package ──▶ sink
//! (policy)  (HTTP)     (links)     (images, archives)     (local saves)
//! ```
//!
//! 1. [`gate`]: admit a candidate PDF (type and size policy)
//! 2. [`service`]: one call per service endpoint; the only stage with
//!    network I/O
//! 3. [`rewrite`]: point image links at local filenames
//! 4. [`download`]: sequential image downloads with a ledger
//! 5. [`package`]: local composite or server-built archive
//! 6. [`sink`]: where finished artifacts are written

pub mod download;
pub mod gate;
pub mod package;
pub mod rewrite;
pub mod service;
pub mod sink;
