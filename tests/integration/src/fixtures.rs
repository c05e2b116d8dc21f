//! Test fixtures and data generators
//!
//! Staff accounts are seeded straight into the database, since the platform
//! delegates sign-up to the identity provider. Everything else goes through
//! the admin API so the tests exercise the same paths the dashboard does.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use stay_common::{AppConfig, JwtService};
use stay_core::entities::{UserProfile, UserRole};
use stay_core::UserRepository;
use stay_db::{create_pool, DatabaseConfig, PgUserRepository};
use uuid::Uuid;

use crate::helpers::{assert_json, TestServer};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// A seeded staff account with a bearer token
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub token: String,
}

impl StaffUser {
    /// Insert a staff profile and issue a token for it
    pub async fn seed(config: &AppConfig, role: UserRole) -> Result<Self> {
        let pool = create_pool(&DatabaseConfig::from(&config.database)).await?;

        let id = Uuid::new_v4();
        let email = format!("staff{}-{}@example.com", unique_suffix(), &id.simple().to_string()[..8]);
        let mut profile = UserProfile::new(id, email.clone(), role);
        profile.full_name = Some(format!("Test {role:?}"));
        PgUserRepository::new(pool).create(&profile).await?;

        let jwt = JwtService::new(
            &config.jwt.secret,
            &config.jwt.audience,
            config.jwt.access_token_expiry,
        );
        let token = jwt.issue_token(id, Some(email.clone()))?;

        Ok(Self {
            id,
            email,
            role,
            token,
        })
    }

    pub async fn admin(config: &AppConfig) -> Result<Self> {
        Self::seed(config, UserRole::Admin).await
    }

    pub async fn owner(config: &AppConfig) -> Result<Self> {
        Self::seed(config, UserRole::Owner).await
    }

    pub async fn cleaner(config: &AppConfig) -> Result<Self> {
        Self::seed(config, UserRole::Cleaner).await
    }
}

/// Property creation body
pub fn property_body(owner_id: Option<Uuid>) -> Value {
    json!({
        "name": format!("Test House {}", unique_suffix()),
        "ownerId": owner_id,
        "address": "1-2-3 Asakusa, Taito-ku, Tokyo",
        "amenities": ["wifi", "washer"],
        "wifiSsid": "stay-guest",
        "wifiPassword": "welcome-home",
        "checkInTime": "15:00",
        "departureTime": "10:00",
        "timezone": "Asia/Tokyo",
    })
}

/// Reservation creation body for a stay starting `days_ahead` from today
pub fn reservation_body(property_id: Uuid, days_ahead: i64, nights: i64) -> Value {
    let check_in: NaiveDate = (Utc::now() + Duration::days(days_ahead)).date_naive();
    let check_out = check_in + Duration::days(nights);
    json!({
        "propertyId": property_id,
        "bookingName": format!("Guest {}", unique_suffix()),
        "bookingEmail": "guest@example.com",
        "checkInDate": check_in,
        "checkOutDate": check_out,
        "numAdults": 2,
    })
}

/// Registration body for online check-in
pub fn check_in_body(nationality: &str, passport_number: Option<&str>) -> Value {
    json!({
        "fullName": "Alex Morgan",
        "nationality": nationality,
        "address": "221B Baker Street, London",
        "phone": "+44 20 7946 0000",
        "passportNumber": passport_number,
    })
}

/// The parts of a created reservation the tests use
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationFixture {
    pub id: Uuid,
    pub property_id: Uuid,
    pub guest_token: String,
    pub status: String,
}

/// A property with one upcoming reservation, created through the API
#[derive(Debug, Clone)]
pub struct StayFixture {
    pub admin: StaffUser,
    pub property_id: Uuid,
    pub reservation: ReservationFixture,
}

impl StayFixture {
    pub async fn create(server: &TestServer) -> Result<Self> {
        let admin = StaffUser::admin(&server.config).await?;

        let response = server
            .post_auth("/api/admin/properties", &admin.token, &property_body(None))
            .await?;
        let property: Value = assert_json(response, StatusCode::CREATED).await?;
        let property_id: Uuid = serde_json::from_value(property["id"].clone())?;

        let response = server
            .post_auth(
                "/api/admin/reservations",
                &admin.token,
                &reservation_body(property_id, 7, 3),
            )
            .await?;
        let reservation: ReservationFixture = assert_json(response, StatusCode::CREATED).await?;

        Ok(Self {
            admin,
            property_id,
            reservation,
        })
    }

    pub fn guest_path(&self, suffix: &str) -> String {
        format!("/api/guest/{}{}", self.reservation.guest_token, suffix)
    }
}
