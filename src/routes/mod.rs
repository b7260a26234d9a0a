/// Router Module Index
///
/// Splits the surface into the JSON API, which is open and does its own session
/// handling, and the page routes, which sit behind the navigation guard.

/// Health check, navigation API and session lifecycle endpoints.
pub mod public;

/// Every other path: page requests checked by `navigation_guard` before rendering.
pub mod pages;
