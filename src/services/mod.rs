//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the portal workflows and the session lifecycle so
//! route handlers can stay focused on form decoding, cookies and rendering.

pub mod portal;
pub mod session;
