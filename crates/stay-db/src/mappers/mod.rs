//! Model to entity mappers
//!
//! `From<Model> for Entity` where every column maps directly;
//! `TryFrom<Model>` where a text column has to be parsed into a domain enum.
//! A row holding an unknown enum value surfaces as a database error.

mod automation;
mod cleaning_task;
mod guest_service;
mod messaging;
mod property;
mod reservation;
mod user;

pub use reservation::registration_columns;

use std::str::FromStr;

use stay_core::DomainError;

/// Parse a text column into a domain enum
pub(crate) fn parse_column<T>(column: &'static str, value: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = DomainError>,
{
    value
        .parse()
        .map_err(|_| DomainError::DatabaseError(format!("unexpected {column} value: {value}")))
}

/// Map a vector of rows, failing on the first bad row
pub(crate) fn try_collect<M, E>(rows: Vec<M>) -> Result<Vec<E>, DomainError>
where
    E: TryFrom<M, Error = DomainError>,
{
    rows.into_iter().map(E::try_from).collect()
}
