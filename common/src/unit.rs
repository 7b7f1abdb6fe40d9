//! Marker types distinguishing [`DateTimeOf`] kinds.
//!
//! [`DateTimeOf`]: crate::DateTimeOf

/// Marker of an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker of a submission (e.g. an error report being filed).
#[derive(Clone, Copy, Debug)]
pub struct Submission;

/// Marker of an entity being seen by its handler for the first time.
#[derive(Clone, Copy, Debug)]
pub struct Sighting;

/// Marker of an expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;
