//! Shared primitive types used across the desk.

/// A stable, unique identifier for a customer record.
/// Opaque: the external data service decides its shape.
pub type CustomerId = String;

/// Three-letter currency code as delivered by the data service ("USD").
pub type CurrencyCode = String;
