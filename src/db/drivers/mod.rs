// Database Drivers
// Wire-protocol implementations of the connection factory

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresDriver;
