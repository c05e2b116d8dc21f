//! Message automation rules and templates

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Event a rule is anchored to, plus the offset direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    /// `delay_minutes` after the booking was created
    OnCreateDelayMin,
    /// `days` before the arrival date, at `at_time` local time
    BeforeArrivalDaysAtTime,
    /// On the arrival day, `hours` before the property check-in time
    ArrivalDayHoursBeforeCheckin,
    /// `hours` after check-in (actual check-in when known)
    AfterCheckinHours,
    /// `hours` before the property departure time on the departure day
    BeforeCheckoutHours,
    /// `days` after the departure date, at `at_time` (default: departure time)
    AfterDepartureDays,
}

impl RuleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnCreateDelayMin => "ON_CREATE_DELAY_MIN",
            Self::BeforeArrivalDaysAtTime => "BEFORE_ARRIVAL_DAYS_AT_TIME",
            Self::ArrivalDayHoursBeforeCheckin => "ARRIVAL_DAY_HOURS_BEFORE_CHECKIN",
            Self::AfterCheckinHours => "AFTER_CHECKIN_HOURS",
            Self::BeforeCheckoutHours => "BEFORE_CHECKOUT_HOURS",
            Self::AfterDepartureDays => "AFTER_DEPARTURE_DAYS",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON_CREATE_DELAY_MIN" => Ok(Self::OnCreateDelayMin),
            "BEFORE_ARRIVAL_DAYS_AT_TIME" => Ok(Self::BeforeArrivalDaysAtTime),
            "ARRIVAL_DAY_HOURS_BEFORE_CHECKIN" => Ok(Self::ArrivalDayHoursBeforeCheckin),
            "AFTER_CHECKIN_HOURS" => Ok(Self::AfterCheckinHours),
            "BEFORE_CHECKOUT_HOURS" => Ok(Self::BeforeCheckoutHours),
            "AFTER_DEPARTURE_DAYS" => Ok(Self::AfterDepartureDays),
            other => Err(DomainError::ValidationError(format!("unknown rule type: {other}"))),
        }
    }
}

/// What to do when the computed send time is already in the past
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackfillPolicy {
    /// Create nothing
    #[default]
    None,
    /// Create the row as `skipped`, never send it
    SkipIfPast,
    /// Send right away as long as the guest has not checked in yet
    UntilCheckin,
}

impl BackfillPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SkipIfPast => "skip_if_past",
            Self::UntilCheckin => "until_checkin",
        }
    }
}

impl fmt::Display for BackfillPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackfillPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "skip_if_past" => Ok(Self::SkipIfPast),
            "until_checkin" => Ok(Self::UntilCheckin),
            other => Err(DomainError::ValidationError(format!(
                "unknown backfill policy: {other}"
            ))),
        }
    }
}

/// Message rule entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRule {
    pub id: Uuid,
    pub property_id: Uuid,
    pub template_id: Uuid,
    pub name: String,
    pub rule_type: RuleType,
    pub delay_minutes: Option<i32>,
    pub days: Option<i32>,
    pub hours: Option<i32>,
    pub at_time: Option<NaiveTime>,
    pub backfill: BackfillPolicy,
    /// IANA timezone; the property timezone applies when unset
    pub timezone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MessageRule {
    pub fn new(property_id: Uuid, template_id: Uuid, name: String, rule_type: RuleType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            property_id,
            template_id,
            name,
            rule_type,
            delay_minutes: None,
            days: None,
            hours: None,
            at_time: None,
            backfill: BackfillPolicy::default(),
            timezone: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check that the offset fields required by the rule type are present
    /// and within one year
    pub fn validate(&self) -> Result<(), DomainError> {
        fn bounded(field: &'static str, value: Option<i32>, max: i32) -> Result<i32, DomainError> {
            match value {
                Some(v) if (0..=max).contains(&v) => Ok(v),
                Some(_) => Err(DomainError::InvalidRule(format!("{field} must be between 0 and {max}"))),
                None => Err(DomainError::InvalidRule(format!("{field} is required"))),
            }
        }

        match self.rule_type {
            RuleType::OnCreateDelayMin => {
                bounded("delay_minutes", self.delay_minutes, MAX_RULE_DELAY_MINUTES)?;
            }
            RuleType::BeforeArrivalDaysAtTime => {
                bounded("days", self.days, MAX_RULE_DAYS)?;
                if self.at_time.is_none() {
                    return Err(DomainError::InvalidRule("at_time is required".to_string()));
                }
            }
            RuleType::ArrivalDayHoursBeforeCheckin
            | RuleType::AfterCheckinHours
            | RuleType::BeforeCheckoutHours => {
                bounded("hours", self.hours, MAX_RULE_HOURS)?;
            }
            RuleType::AfterDepartureDays => {
                bounded("days", self.days, MAX_RULE_DAYS)?;
            }
        }
        Ok(())
    }
}

/// Upper bound for `days` offsets
pub const MAX_RULE_DAYS: i32 = 365;
/// Upper bound for `hours` offsets
pub const MAX_RULE_HOURS: i32 = 365 * 24;
/// Upper bound for `delay_minutes`
pub const MAX_RULE_DELAY_MINUTES: i32 = 365 * 24 * 60;

/// Message template entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub id: Uuid,
    /// `None` for templates shared by every property
    pub property_id: Option<Uuid>,
    pub name: String,
    pub subject: Option<String>,
    pub body: String,
    pub language: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MessageTemplate {
    pub fn new(property_id: Option<Uuid>, name: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            property_id,
            name,
            subject: None,
            body,
            language: "ja".to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Substitute `{{placeholder}}` tokens. Unknown placeholders are kept
    /// verbatim so a typo is visible in the sent message.
    pub fn render(&self, ctx: &TemplateContext) -> String {
        render_placeholders(&self.body, ctx)
    }
}

/// Values available to template placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    pub guest_name: String,
    pub property_name: String,
    pub check_in_date: String,
    pub check_out_date: String,
    pub portal_url: Option<String>,
    pub room_number: Option<String>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
}

impl TemplateContext {
    fn lookup(&self, key: &str) -> Option<&str> {
        match key {
            "guest_name" => Some(&self.guest_name),
            "property_name" => Some(&self.property_name),
            "check_in_date" => Some(&self.check_in_date),
            "check_out_date" => Some(&self.check_out_date),
            "portal_url" => Some(self.portal_url.as_deref().unwrap_or("")),
            "room_number" => Some(self.room_number.as_deref().unwrap_or("")),
            "wifi_ssid" => Some(self.wifi_ssid.as_deref().unwrap_or("")),
            "wifi_password" => Some(self.wifi_password.as_deref().unwrap_or("")),
            _ => None,
        }
    }
}

fn render_placeholders(body: &str, ctx: &TemplateContext) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match ctx.lookup(key) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
