//! Rule timing and backfill evaluation

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::entities::{BackfillPolicy, MessageRule, Property, Reservation, RuleType};
use crate::error::DomainError;

/// The reservation events a rule can be anchored to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationTimeline {
    pub booked_at: DateTime<Utc>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub check_in_time: NaiveTime,
    pub departure_time: NaiveTime,
    /// Actual online check-in, when it happened
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl ReservationTimeline {
    pub fn new(reservation: &Reservation, property: &Property) -> Self {
        Self {
            booked_at: reservation.created_at,
            check_in_date: reservation.check_in_date,
            check_out_date: reservation.check_out_date,
            check_in_time: property.check_in_time,
            departure_time: property.departure_time,
            checked_in_at: reservation.checked_in_at,
        }
    }

    /// Scheduled check-in instant in `tz`
    pub fn scheduled_check_in(&self, tz: Tz) -> Result<DateTime<Utc>, DomainError> {
        local_instant(tz, self.check_in_date, self.check_in_time)
    }

    /// The guest checked in online, or the scheduled check-in time passed
    pub fn check_in_occurred(&self, tz: Tz, now: DateTime<Utc>) -> Result<bool, DomainError> {
        if self.checked_in_at.is_some() {
            return Ok(true);
        }
        Ok(now >= self.scheduled_check_in(tz)?)
    }
}

/// Outcome of evaluating a rule against a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePlan {
    /// Insert a pending row that runs at the given instant
    At(DateTime<Utc>),
    /// Insert a row already marked skipped; it is never sent
    Skipped(DateTime<Utc>),
    /// Insert nothing
    Drop,
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// Resolve a wall-clock date and time in `tz` to a UTC instant.
///
/// Ambiguous local times (DST fold) take the earlier instant; times that
/// fall in a DST gap move forward by one hour.
pub fn local_instant(tz: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, DomainError> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            let shifted = naive.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&shifted).earliest()
        })
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| {
            DomainError::InternalError(format!("cannot resolve local time {naive} in {tz}"))
        })
}

fn offset(field: &'static str, value: Option<i32>) -> Result<i64, DomainError> {
    match value {
        Some(v) if v >= 0 => Ok(i64::from(v)),
        Some(_) => Err(DomainError::InvalidRule(format!("{field} must not be negative"))),
        None => Err(DomainError::InvalidRule(format!("{field} is required"))),
    }
}

fn out_of_range(field: &'static str) -> DomainError {
    DomainError::InvalidRule(format!("{field} moves the send time out of range"))
}

fn shift(
    field: &'static str,
    instant: DateTime<Utc>,
    delta: Option<Duration>,
) -> Result<DateTime<Utc>, DomainError> {
    delta
        .and_then(|d| instant.checked_add_signed(d))
        .ok_or_else(|| out_of_range(field))
}

fn shift_date(
    field: &'static str,
    date: NaiveDate,
    days: i64,
    forward: bool,
) -> Result<NaiveDate, DomainError> {
    let days = Days::new(days.unsigned_abs());
    if forward {
        date.checked_add_days(days)
    } else {
        date.checked_sub_days(days)
    }
    .ok_or_else(|| out_of_range(field))
}

/// Compute when a rule fires for a reservation, in UTC.
///
/// Offsets large enough to leave chrono's date range yield `InvalidRule`.
pub fn compute_run_at(
    rule: &MessageRule,
    timeline: &ReservationTimeline,
    tz: Tz,
) -> Result<DateTime<Utc>, DomainError> {
    match rule.rule_type {
        RuleType::OnCreateDelayMin => {
            let minutes = offset("delay_minutes", rule.delay_minutes)?;
            shift("delay_minutes", timeline.booked_at, Duration::try_minutes(minutes))
        }
        RuleType::BeforeArrivalDaysAtTime => {
            let days = offset("days", rule.days)?;
            let at = rule
                .at_time
                .ok_or_else(|| DomainError::InvalidRule("at_time is required".to_string()))?;
            local_instant(tz, shift_date("days", timeline.check_in_date, days, false)?, at)
        }
        RuleType::ArrivalDayHoursBeforeCheckin => {
            let hours = offset("hours", rule.hours)?;
            let arrival = timeline.scheduled_check_in(tz)?;
            shift("hours", arrival, Duration::try_hours(-hours))
        }
        RuleType::AfterCheckinHours => {
            let hours = offset("hours", rule.hours)?;
            let anchor = match timeline.checked_in_at {
                Some(at) => at,
                None => timeline.scheduled_check_in(tz)?,
            };
            shift("hours", anchor, Duration::try_hours(hours))
        }
        RuleType::BeforeCheckoutHours => {
            let hours = offset("hours", rule.hours)?;
            let departure = local_instant(tz, timeline.check_out_date, timeline.departure_time)?;
            shift("hours", departure, Duration::try_hours(-hours))
        }
        RuleType::AfterDepartureDays => {
            let days = offset("days", rule.days)?;
            let at = rule.at_time.unwrap_or(timeline.departure_time);
            local_instant(tz, shift_date("days", timeline.check_out_date, days, true)?, at)
        }
    }
}

/// Decide what to insert for a rule, applying its backfill policy when the
/// computed time has already elapsed.
pub fn plan(
    rule: &MessageRule,
    timeline: &ReservationTimeline,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<SchedulePlan, DomainError> {
    let run_at = compute_run_at(rule, timeline, tz)?;
    if run_at >= now {
        return Ok(SchedulePlan::At(run_at));
    }

    let decision = match rule.backfill {
        BackfillPolicy::None => SchedulePlan::Drop,
        BackfillPolicy::SkipIfPast => SchedulePlan::Skipped(run_at),
        BackfillPolicy::UntilCheckin => {
            if timeline.check_in_occurred(tz, now)? {
                SchedulePlan::Skipped(run_at)
            } else {
                SchedulePlan::At(now)
            }
        }
    };
    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tokyo() -> Tz {
        parse_timezone("Asia/Tokyo").unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn timeline() -> ReservationTimeline {
        ReservationTimeline {
            booked_at: utc(2024, 2, 1, 3, 0),
            check_in_date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            check_out_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            check_in_time: hm(15, 0),
            departure_time: hm(10, 0),
            checked_in_at: None,
        }
    }

    fn rule(rule_type: RuleType) -> MessageRule {
        MessageRule::new(Uuid::new_v4(), Uuid::new_v4(), "test".to_string(), rule_type)
    }

    fn before_arrival(backfill: BackfillPolicy) -> MessageRule {
        let mut r = rule(RuleType::BeforeArrivalDaysAtTime);
        r.days = Some(1);
        r.at_time = Some(hm(10, 0));
        r.backfill = backfill;
        r
    }

    #[test]
    fn test_before_arrival_days_at_time_uses_rule_timezone() {
        let run_at = compute_run_at(&before_arrival(BackfillPolicy::None), &timeline(), tokyo())
            .unwrap();
        let local = run_at.with_timezone(&tokyo());
        assert_eq!(local.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(local.time(), hm(10, 0));
        // 10:00 JST is 01:00 UTC
        assert_eq!(run_at, utc(2024, 3, 4, 1, 0));
    }

    #[test]
    fn test_future_run_at_is_scheduled_regardless_of_backfill() {
        let now = utc(2024, 2, 20, 0, 0);
        for policy in [
            BackfillPolicy::None,
            BackfillPolicy::SkipIfPast,
            BackfillPolicy::UntilCheckin,
        ] {
            let decision = plan(&before_arrival(policy), &timeline(), tokyo(), now).unwrap();
            assert_eq!(decision, SchedulePlan::At(utc(2024, 3, 4, 1, 0)));
        }
    }

    #[test]
    fn test_skip_if_past_marks_skipped() {
        let now = utc(2024, 3, 4, 6, 0);
        let decision = plan(&before_arrival(BackfillPolicy::SkipIfPast), &timeline(), tokyo(), now)
            .unwrap();
        assert_eq!(decision, SchedulePlan::Skipped(utc(2024, 3, 4, 1, 0)));
    }

    #[test]
    fn test_until_checkin_sends_now_before_check_in() {
        let now = utc(2024, 3, 4, 6, 0);
        let decision =
            plan(&before_arrival(BackfillPolicy::UntilCheckin), &timeline(), tokyo(), now).unwrap();
        assert_eq!(decision, SchedulePlan::At(now));
    }

    #[test]
    fn test_until_checkin_skips_after_online_check_in() {
        let now = utc(2024, 3, 4, 6, 0);
        let mut tl = timeline();
        tl.checked_in_at = Some(utc(2024, 3, 4, 5, 0));
        let decision = plan(&before_arrival(BackfillPolicy::UntilCheckin), &tl, tokyo(), now).unwrap();
        assert_eq!(decision, SchedulePlan::Skipped(utc(2024, 3, 4, 1, 0)));
    }

    #[test]
    fn test_until_checkin_skips_after_scheduled_check_in_time() {
        // 15:00 JST on 2024-03-05 is 06:00 UTC
        let now = utc(2024, 3, 5, 6, 0);
        let decision =
            plan(&before_arrival(BackfillPolicy::UntilCheckin), &timeline(), tokyo(), now).unwrap();
        assert!(matches!(decision, SchedulePlan::Skipped(_)));
    }

    #[test]
    fn test_none_drops_past_due() {
        let now = utc(2024, 3, 4, 6, 0);
        let decision =
            plan(&before_arrival(BackfillPolicy::None), &timeline(), tokyo(), now).unwrap();
        assert_eq!(decision, SchedulePlan::Drop);
    }

    #[test]
    fn test_on_create_delay() {
        let mut r = rule(RuleType::OnCreateDelayMin);
        r.delay_minutes = Some(15);
        let run_at = compute_run_at(&r, &timeline(), tokyo()).unwrap();
        assert_eq!(run_at, utc(2024, 2, 1, 3, 15));
    }

    #[test]
    fn test_arrival_day_hours_before_checkin() {
        let mut r = rule(RuleType::ArrivalDayHoursBeforeCheckin);
        r.hours = Some(3);
        // 12:00 JST on arrival day
        let run_at = compute_run_at(&r, &timeline(), tokyo()).unwrap();
        assert_eq!(run_at, utc(2024, 3, 5, 3, 0));
    }

    #[test]
    fn test_after_checkin_prefers_actual_check_in() {
        let mut r = rule(RuleType::AfterCheckinHours);
        r.hours = Some(2);

        let scheduled = compute_run_at(&r, &timeline(), tokyo()).unwrap();
        assert_eq!(scheduled, utc(2024, 3, 5, 8, 0));

        let mut tl = timeline();
        tl.checked_in_at = Some(utc(2024, 3, 5, 9, 30));
        let actual = compute_run_at(&r, &tl, tokyo()).unwrap();
        assert_eq!(actual, utc(2024, 3, 5, 11, 30));
    }

    #[test]
    fn test_before_checkout_hours() {
        let mut r = rule(RuleType::BeforeCheckoutHours);
        r.hours = Some(12);
        // 10:00 JST on 2024-03-08 minus 12h = 22:00 JST on 03-07 = 13:00 UTC
        let run_at = compute_run_at(&r, &timeline(), tokyo()).unwrap();
        assert_eq!(run_at, utc(2024, 3, 7, 13, 0));
    }

    #[test]
    fn test_after_departure_days_defaults_to_departure_time() {
        let mut r = rule(RuleType::AfterDepartureDays);
        r.days = Some(2);
        let run_at = compute_run_at(&r, &timeline(), tokyo()).unwrap();
        assert_eq!(run_at, utc(2024, 3, 10, 1, 0));

        r.at_time = Some(hm(18, 0));
        let run_at = compute_run_at(&r, &timeline(), tokyo()).unwrap();
        assert_eq!(run_at, utc(2024, 3, 10, 9, 0));
    }

    #[test]
    fn test_missing_offset_is_invalid_rule() {
        let r = rule(RuleType::AfterCheckinHours);
        assert!(matches!(
            compute_run_at(&r, &timeline(), tokyo()),
            Err(DomainError::InvalidRule(_))
        ));
    }

    #[test]
    fn test_dst_gap_moves_forward() {
        let tz = parse_timezone("America/New_York").unwrap();
        // 2024-03-10 02:30 does not exist in New York
        let instant = local_instant(
            tz,
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            hm(2, 30),
        )
        .unwrap();
        assert_eq!(instant, utc(2024, 3, 10, 7, 30));
    }

    #[test]
    fn test_offsets_beyond_date_range_are_invalid_rule() {
        let mut r = before_arrival(BackfillPolicy::SkipIfPast);
        r.days = Some(i32::MAX);
        assert!(matches!(
            plan(&r, &timeline(), tokyo(), utc(2024, 3, 1, 0, 0)),
            Err(DomainError::InvalidRule(_))
        ));

        let mut r = rule(RuleType::AfterDepartureDays);
        r.days = Some(i32::MAX);
        assert!(matches!(
            compute_run_at(&r, &timeline(), tokyo()),
            Err(DomainError::InvalidRule(_))
        ));
    }

    #[test]
    fn test_invalid_timezone() {
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(DomainError::InvalidTimezone(_))
        ));
    }
}
