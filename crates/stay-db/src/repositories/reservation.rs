//! PostgreSQL implementation of ReservationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use stay_core::entities::{Reservation, ReservationDetails, ReservationStatus};
use stay_core::error::DomainError;
use stay_core::traits::{
    PageRequest, RepoResult, ReservationFilter, ReservationRepository, Upserted,
};

use crate::mappers::{registration_columns, try_collect};
use crate::models::{ReservationDetailsModel, ReservationModel, ReservationUpsertModel};

use super::error::{is_undefined_table, map_db_error, map_unique_violation, reservation_not_found};

const RESERVATION_COLUMNS: &str = r"
    id, property_id, room_type_id, room_unit_id, beds24_booking_id, booking_name,
    booking_email, booking_phone, check_in_date, check_out_date, num_adults, num_children,
    total_amount, currency, status, guest_token, guest_full_name, guest_nationality,
    guest_address, guest_phone, guest_occupation, guest_passport_number, checked_in_at,
    notes, created_at, updated_at
";

/// Same columns qualified with the `r` alias, for joins
const RESERVATION_COLUMNS_R: &str = r"
    r.id, r.property_id, r.room_type_id, r.room_unit_id, r.beds24_booking_id, r.booking_name,
    r.booking_email, r.booking_phone, r.check_in_date, r.check_out_date, r.num_adults,
    r.num_children, r.total_amount, r.currency, r.status, r.guest_token, r.guest_full_name,
    r.guest_nationality, r.guest_address, r.guest_phone, r.guest_occupation,
    r.guest_passport_number, r.checked_in_at, r.notes, r.created_at, r.updated_at
";

/// Filter predicate shared by list and count; binds $1..$6
const FILTER_PREDICATE: &str = r"
    ($1::uuid IS NULL OR r.property_id = $1)
    AND ($2::uuid IS NULL OR r.property_id IN (SELECT id FROM properties WHERE owner_id = $2))
    AND ($3::text IS NULL OR r.status = $3)
    AND ($4::date IS NULL OR r.check_in_date >= $4)
    AND ($5::date IS NULL OR r.check_in_date <= $5)
    AND ($6::text IS NULL
         OR r.booking_name ILIKE '%' || $6 || '%'
         OR r.booking_email ILIKE '%' || $6 || '%'
         OR r.beds24_booking_id::text = $6)
";

/// PostgreSQL implementation of ReservationRepository
#[derive(Clone)]
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    /// Create a new PgReservationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &'static str, value: Bind<'_>) -> RepoResult<Option<Reservation>> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE {column} = $1");
        let query = sqlx::query_as::<_, ReservationModel>(&sql);
        let query = match value {
            Bind::Id(id) => query.bind(id),
            Bind::Text(text) => query.bind(text),
            Bind::BigInt(n) => query.bind(n),
        };

        let result = query
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Reservation::try_from).transpose()
    }

    async fn list_from(
        &self,
        source: &str,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> Result<Vec<ReservationDetailsModel>, sqlx::Error> {
        let sql = format!(
            r"
            SELECT {source}
            WHERE {FILTER_PREDICATE}
            ORDER BY r.check_in_date DESC, r.created_at DESC
            LIMIT $7 OFFSET $8
            "
        );

        sqlx::query_as::<_, ReservationDetailsModel>(&sql)
            .bind(filter.property_id)
            .bind(filter.owner_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.arrival_from)
            .bind(filter.arrival_to)
            .bind(search_term(filter))
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await
    }
}

/// Scalar lookup key for `find_one`
enum Bind<'a> {
    Id(Uuid),
    Text(&'a str),
    BigInt(i64),
}

fn search_term(filter: &ReservationFilter) -> Option<&str> {
    filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Columns of the `reservation_details` view
fn view_source() -> String {
    format!(
        "{RESERVATION_COLUMNS_R}, r.property_name, r.room_type_name, r.room_unit_number \
         FROM reservation_details r"
    )
}

/// The same shape built from base tables, for databases without the view
fn join_source() -> String {
    format!(
        "{RESERVATION_COLUMNS_R}, p.name AS property_name, rt.name AS room_type_name, \
         ru.unit_number AS room_unit_number \
         FROM reservations r \
         JOIN properties p ON p.id = r.property_id \
         LEFT JOIN room_types rt ON rt.id = r.room_type_id \
         LEFT JOIN room_units ru ON ru.id = r.room_unit_id"
    )
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Reservation>> {
        self.find_one("id", Bind::Id(id)).await
    }

    #[instrument(skip(self, token))]
    async fn find_by_guest_token(&self, token: &str) -> RepoResult<Option<Reservation>> {
        self.find_one("guest_token", Bind::Text(token)).await
    }

    #[instrument(skip(self))]
    async fn find_by_beds24_id(&self, booking_id: i64) -> RepoResult<Option<Reservation>> {
        self.find_one("beds24_booking_id", Bind::BigInt(booking_id)).await
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> RepoResult<Vec<ReservationDetails>> {
        let rows = match self.list_from(&view_source(), filter, page).await {
            Ok(rows) => rows,
            Err(e) if is_undefined_table(&e) => {
                warn!("reservation_details view missing, querying base tables");
                self.list_from(&join_source(), filter, page)
                    .await
                    .map_err(map_db_error)?
            }
            Err(e) => return Err(map_db_error(e)),
        };

        try_collect(rows)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: &ReservationFilter) -> RepoResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM reservations r WHERE {FILTER_PREDICATE}");

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(filter.property_id)
            .bind(filter.owner_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.arrival_from)
            .bind(filter.arrival_to)
            .bind(search_term(filter))
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, reservation), fields(reservation_id = %reservation.id))]
    async fn create(&self, reservation: &Reservation) -> RepoResult<()> {
        let [full_name, nationality, address, phone, occupation, passport] =
            registration_columns(reservation.registration.as_ref());

        sqlx::query(
            r"
            INSERT INTO reservations (
                id, property_id, room_type_id, room_unit_id, beds24_booking_id, booking_name,
                booking_email, booking_phone, check_in_date, check_out_date, num_adults,
                num_children, total_amount, currency, status, guest_token, guest_full_name,
                guest_nationality, guest_address, guest_phone, guest_occupation,
                guest_passport_number, checked_in_at, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
            ",
        )
        .bind(reservation.id)
        .bind(reservation.property_id)
        .bind(reservation.room_type_id)
        .bind(reservation.room_unit_id)
        .bind(reservation.beds24_booking_id)
        .bind(&reservation.booking_name)
        .bind(&reservation.booking_email)
        .bind(&reservation.booking_phone)
        .bind(reservation.check_in_date)
        .bind(reservation.check_out_date)
        .bind(reservation.num_adults)
        .bind(reservation.num_children)
        .bind(reservation.total_amount)
        .bind(&reservation.currency)
        .bind(reservation.status.as_str())
        .bind(&reservation.guest_token)
        .bind(full_name)
        .bind(nationality)
        .bind(address)
        .bind(phone)
        .bind(occupation)
        .bind(passport)
        .bind(reservation.checked_in_at)
        .bind(&reservation.notes)
        .bind(reservation.created_at)
        .bind(reservation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::DuplicateBooking(reservation.beds24_booking_id.unwrap_or_default())
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self, reservation), fields(reservation_id = %reservation.id))]
    async fn update(&self, reservation: &Reservation) -> RepoResult<()> {
        let [full_name, nationality, address, phone, occupation, passport] =
            registration_columns(reservation.registration.as_ref());

        let result = sqlx::query(
            r"
            UPDATE reservations
            SET property_id = $2, room_type_id = $3, room_unit_id = $4, booking_name = $5,
                booking_email = $6, booking_phone = $7, check_in_date = $8,
                check_out_date = $9, num_adults = $10, num_children = $11,
                total_amount = $12, currency = $13, status = $14, guest_full_name = $15,
                guest_nationality = $16, guest_address = $17, guest_phone = $18,
                guest_occupation = $19, guest_passport_number = $20, checked_in_at = $21,
                notes = $22, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(reservation.id)
        .bind(reservation.property_id)
        .bind(reservation.room_type_id)
        .bind(reservation.room_unit_id)
        .bind(&reservation.booking_name)
        .bind(&reservation.booking_email)
        .bind(&reservation.booking_phone)
        .bind(reservation.check_in_date)
        .bind(reservation.check_out_date)
        .bind(reservation.num_adults)
        .bind(reservation.num_children)
        .bind(reservation.total_amount)
        .bind(&reservation.currency)
        .bind(reservation.status.as_str())
        .bind(full_name)
        .bind(nationality)
        .bind(address)
        .bind(phone)
        .bind(occupation)
        .bind(passport)
        .bind(reservation.checked_in_at)
        .bind(&reservation.notes)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(reservation_not_found(reservation.id));
        }

        Ok(())
    }

    #[instrument(skip(self, reservation), fields(reservation_id = %reservation.id))]
    async fn record_check_in(&self, reservation: &Reservation) -> RepoResult<Option<Reservation>> {
        let [full_name, nationality, address, phone, occupation, passport] =
            registration_columns(reservation.registration.as_ref());
        let terminal: Vec<&str> = [
            ReservationStatus::CheckedOut,
            ReservationStatus::Cancelled,
            ReservationStatus::NoShow,
        ]
        .iter()
        .map(|s| s.as_str())
        .collect();

        let sql = format!(
            r"
            UPDATE reservations
            SET guest_full_name = $2, guest_nationality = $3, guest_address = $4,
                guest_phone = $5, guest_occupation = $6, guest_passport_number = $7,
                checked_in_at = $8, status = $9, updated_at = NOW()
            WHERE id = $1 AND checked_in_at IS NULL AND NOT (status = ANY($10))
            RETURNING {RESERVATION_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, ReservationModel>(&sql)
            .bind(reservation.id)
            .bind(full_name)
            .bind(nationality)
            .bind(address)
            .bind(phone)
            .bind(occupation)
            .bind(passport)
            .bind(reservation.checked_in_at)
            .bind(reservation.status.as_str())
            .bind(&terminal)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        row.map(Reservation::try_from).transpose()
    }

    #[instrument(skip(self, reservation), fields(beds24_booking_id = ?reservation.beds24_booking_id))]
    async fn upsert_by_beds24_id(
        &self,
        reservation: &Reservation,
    ) -> RepoResult<Upserted<Reservation>> {
        if reservation.beds24_booking_id.is_none() {
            return Err(DomainError::ValidationError(
                "beds24 booking id is required for upsert".to_string(),
            ));
        }

        // The portal token, guest register, notes and an admin-assigned unit
        // survive updates; a checked-in/out stay keeps its status unless the
        // booking is cancelled upstream.
        let sql = format!(
            r"
            INSERT INTO reservations (
                id, property_id, room_type_id, room_unit_id, beds24_booking_id, booking_name,
                booking_email, booking_phone, check_in_date, check_out_date, num_adults,
                num_children, total_amount, currency, status, guest_token, notes,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19)
            ON CONFLICT (beds24_booking_id) DO UPDATE SET
                property_id = EXCLUDED.property_id,
                room_type_id = COALESCE(EXCLUDED.room_type_id, reservations.room_type_id),
                room_unit_id = COALESCE(reservations.room_unit_id, EXCLUDED.room_unit_id),
                booking_name = EXCLUDED.booking_name,
                booking_email = EXCLUDED.booking_email,
                booking_phone = EXCLUDED.booking_phone,
                check_in_date = EXCLUDED.check_in_date,
                check_out_date = EXCLUDED.check_out_date,
                num_adults = EXCLUDED.num_adults,
                num_children = EXCLUDED.num_children,
                total_amount = EXCLUDED.total_amount,
                currency = EXCLUDED.currency,
                status = CASE
                    WHEN reservations.status IN ('checked_in', 'checked_out')
                         AND EXCLUDED.status <> 'cancelled'
                    THEN reservations.status
                    ELSE EXCLUDED.status
                END,
                updated_at = NOW()
            RETURNING {RESERVATION_COLUMNS}, (xmax = 0) AS inserted
            "
        );

        let row = sqlx::query_as::<_, ReservationUpsertModel>(&sql)
            .bind(reservation.id)
            .bind(reservation.property_id)
            .bind(reservation.room_type_id)
            .bind(reservation.room_unit_id)
            .bind(reservation.beds24_booking_id)
            .bind(&reservation.booking_name)
            .bind(&reservation.booking_email)
            .bind(&reservation.booking_phone)
            .bind(reservation.check_in_date)
            .bind(reservation.check_out_date)
            .bind(reservation.num_adults)
            .bind(reservation.num_children)
            .bind(reservation.total_amount)
            .bind(&reservation.currency)
            .bind(reservation.status.as_str())
            .bind(&reservation.guest_token)
            .bind(&reservation.notes)
            .bind(reservation.created_at)
            .bind(reservation.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(Upserted {
            value: Reservation::try_from(row.reservation)?,
            created: row.inserted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_term_trims_and_drops_empty() {
        let mut filter = ReservationFilter::default();
        assert_eq!(search_term(&filter), None);

        filter.search = Some("   ".to_string());
        assert_eq!(search_term(&filter), None);

        filter.search = Some("  kim ".to_string());
        assert_eq!(search_term(&filter), Some("kim"));
    }

    #[test]
    fn test_sources_select_same_names() {
        for source in [view_source(), join_source()] {
            assert!(source.contains("property_name"));
            assert!(source.contains("room_type_name"));
            assert!(source.contains("room_unit_number"));
        }
        assert!(join_source().contains("LEFT JOIN room_units"));
    }
}
