//! Dashboard aggregates derived from the order list on every request.
//!
//! All functions take the current time explicitly; calendar boundaries (today,
//! this month, this year) are evaluated in the time zone of `now`.

use crate::domain::order::Order;
use crate::error::ShopError;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Offset, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const WEEK_LABELS: [&str; 4] = ["Week 1", "Week 2", "Week 3", "Week 4"];
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_revenue: Decimal,
    pub total_orders: usize,
    pub pending_orders: usize,
}

/// Chart data: `labels[i]` pairs with `data[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RevenueSeries {
    pub labels: Vec<String>,
    pub data: Vec<Decimal>,
}

impl RevenueSeries {
    fn fixed(labels: &[&str], data: Vec<Decimal>) -> Self {
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            data,
        }
    }

    pub fn total(&self) -> Decimal {
        self.data
            .iter()
            .fold(Decimal::ZERO, |total, value| total.saturating_add(*value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevenueRange {
    /// Current month in four day-of-month buckets.
    #[default]
    MonthByWeek,
    /// Current year by calendar month.
    YearByMonth,
    /// One bucket per year with orders.
    AllYears,
}

impl RevenueRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueRange::MonthByWeek => "month-by-week",
            RevenueRange::YearByMonth => "year-by-month",
            RevenueRange::AllYears => "all-years",
        }
    }

    /// Parses a range key, falling back to `month-by-week` for anything unknown.
    pub fn from_key(key: &str) -> Self {
        key.parse().unwrap_or_default()
    }
}

impl fmt::Display for RevenueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevenueRange {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month-by-week" => Ok(RevenueRange::MonthByWeek),
            "year-by-month" => Ok(RevenueRange::YearByMonth),
            "all-years" => Ok(RevenueRange::AllYears),
            other => Err(ShopError::InvalidRange(other.to_string())),
        }
    }
}

/// Local midnight at the start of `now`'s day, as a UTC instant.
fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = now.date_naive().and_time(NaiveTime::MIN);
    match now.timezone().from_local_datetime(&midnight).earliest() {
        Some(start) => start.with_timezone(&Utc),
        // Midnight skipped by a DST change: use the current offset.
        None => {
            let offset = Duration::seconds(i64::from(now.offset().fix().local_minus_utc()));
            Utc.from_utc_datetime(&(midnight - offset))
        }
    }
}

/// Revenue, order count and pending count for orders placed today.
pub fn daily_stats<Tz: TimeZone>(orders: &[Order], now: &DateTime<Tz>) -> StatsSnapshot {
    let since = start_of_day(now);
    let todays = orders.iter().filter(|o| o.timestamp >= since);

    let mut snapshot = StatsSnapshot {
        total_revenue: Decimal::ZERO,
        total_orders: 0,
        pending_orders: 0,
    };
    for order in todays {
        snapshot.total_revenue = snapshot.total_revenue.saturating_add(order.price);
        snapshot.total_orders += 1;
        if order.status.is_pending() {
            snapshot.pending_orders += 1;
        }
    }
    snapshot
}

fn week_of_month(day: u32) -> usize {
    match day {
        0..=7 => 0,
        8..=14 => 1,
        15..=21 => 2,
        _ => 3,
    }
}

/// Buckets order revenue for a dashboard chart.
pub fn revenue_series<Tz: TimeZone>(
    orders: &[Order],
    range: RevenueRange,
    now: &DateTime<Tz>,
) -> RevenueSeries {
    let tz = now.timezone();
    let local_dates = orders
        .iter()
        .map(|o| (o.timestamp.with_timezone(&tz).date_naive(), o.price));

    match range {
        RevenueRange::MonthByWeek => {
            let mut data = vec![Decimal::ZERO; WEEK_LABELS.len()];
            for (date, price) in local_dates {
                if date.year() == now.year() && date.month() == now.month() {
                    let bucket = &mut data[week_of_month(date.day())];
                    *bucket = bucket.saturating_add(price);
                }
            }
            RevenueSeries::fixed(&WEEK_LABELS, data)
        }
        RevenueRange::YearByMonth => {
            let mut data = vec![Decimal::ZERO; MONTH_LABELS.len()];
            for (date, price) in local_dates {
                if date.year() == now.year() {
                    let bucket = &mut data[date.month0() as usize];
                    *bucket = bucket.saturating_add(price);
                }
            }
            RevenueSeries::fixed(&MONTH_LABELS, data)
        }
        RevenueRange::AllYears => {
            let mut years: BTreeMap<i32, Decimal> = BTreeMap::new();
            for (date, price) in local_dates {
                let bucket = years.entry(date.year()).or_default();
                *bucket = bucket.saturating_add(price);
            }
            let (labels, data) = years
                .into_iter()
                .map(|(year, total)| (year.to_string(), total))
                .unzip();
            RevenueSeries { labels, data }
        }
    }
}
