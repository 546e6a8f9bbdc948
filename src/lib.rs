//! Holiday Travel - agency website
//!
//! Bilingual (English/Arabic) marketing site for a travel agency, backed by
//! MySQL, with a password-protected console for editing destinations and
//! packages.

// ============================================
// Core Modules
// ============================================

/// Site configuration (YAML + environment overrides)
pub mod config;
/// Translation catalogs and locale handling
pub mod i18n;
/// Admin credentials, session cookies, login throttling
pub mod auth;
/// Destinations and packages storage
pub mod database;
/// HTTP server (public pages, API, admin)
pub mod servers;
