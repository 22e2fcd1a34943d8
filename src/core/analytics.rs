//! Analytics - Per-listing counters, totals and daily activity series.
//!
//! The pure half ([`summarize`], [`build_daily_series`], [`TimeRange`]) never fails. The store
//! half reads the event tables (`property_views`, `contact_inquiries`, `viewing_schedules`,
//! `favorites`) and is wrapped by [`build_report`], which logs a store failure and returns
//! [`AnalyticsReport::zero`] instead of passing the error on.

use crate::{
    entities::{
        Favorite, Inquiry, Property as PropertyEntity, PropertyView, Viewing, favorite, inquiry,
        property, property_view, viewing,
    },
    errors::Result,
};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error, instrument};

/// Counters for one listing. Read-only projection of the event tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub property_id: String,
    pub title: String,
    pub total_views: u64,
    pub views_7d: u64,
    pub views_30d: u64,
    pub total_inquiries: u64,
    pub inquiries_7d: u64,
    pub total_viewings: u64,
    pub total_favorites: u64,
}

impl AnalyticsSnapshot {
    /// Inquiries per hundred views for this listing.
    #[must_use]
    pub fn conversion_rate(&self) -> f64 {
        conversion_rate(self.total_inquiries, self.total_views)
    }
}

/// `inquiries / views * 100`, 0 when there are no views, never above 100.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn conversion_rate(inquiries: u64, views: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    (inquiries as f64 / views as f64 * 100.0).clamp(0.0, 100.0)
}

/// Which snapshots a summary covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnalyticsScope {
    /// Every snapshot passed in
    #[default]
    All,
    /// Only the snapshot of this listing
    Property(String),
}

impl AnalyticsScope {
    fn includes(&self, snapshot: &AnalyticsSnapshot) -> bool {
        match self {
            Self::All => true,
            Self::Property(id) => snapshot.property_id == *id,
        }
    }
}

/// Totals across a scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_views: u64,
    pub views_7d: u64,
    pub views_30d: u64,
    pub total_inquiries: u64,
    pub inquiries_7d: u64,
    pub total_viewings: u64,
    pub total_favorites: u64,
    /// Percentage in [0, 100]
    pub conversion_rate: f64,
}

/// Sums every counter over the snapshots in `scope`.
#[must_use]
pub fn summarize(snapshots: &[AnalyticsSnapshot], scope: &AnalyticsScope) -> AnalyticsSummary {
    let mut summary = AnalyticsSummary::default();
    for snapshot in snapshots.iter().filter(|s| scope.includes(s)) {
        summary.total_views += snapshot.total_views;
        summary.views_7d += snapshot.views_7d;
        summary.views_30d += snapshot.views_30d;
        summary.total_inquiries += snapshot.total_inquiries;
        summary.inquiries_7d += snapshot.inquiries_7d;
        summary.total_viewings += snapshot.total_viewings;
        summary.total_favorites += snapshot.total_favorites;
    }
    summary.conversion_rate = conversion_rate(summary.total_inquiries, summary.total_views);
    summary
}

/// Requested reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
    /// Everything, which in practice means the longest allowed window
    All,
    /// Inclusive calendar dates
    Custom { from: NaiveDate, to: NaiveDate },
}

impl TimeRange {
    /// Reads `7d`, `30d`, `90d`, `all` or `custom`. A custom range needs both dates;
    /// anything unrecognised or incomplete falls back to the 30-day default.
    #[must_use]
    pub fn parse(range: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        match (range.trim().to_ascii_lowercase().as_str(), from, to) {
            ("7d", _, _) => Self::Last7Days,
            ("30d", _, _) => Self::Last30Days,
            ("90d", _, _) => Self::Last90Days,
            ("all", _, _) => Self::All,
            ("custom", Some(from), Some(to)) => Self::Custom { from, to },
            _ => Self::default(),
        }
    }

    /// Inclusive `(from, to)` dates for this range as of `today`, at most `max_days` long.
    /// Presets end today. A custom range longer than the cap keeps its latest days.
    /// Returns None when a custom `from` is after `to`.
    #[must_use]
    pub fn bounds(self, today: NaiveDate, max_days: u32) -> Option<(NaiveDate, NaiveDate)> {
        let max_days = max_days.max(1);
        let ending_today = |days: u32| {
            let days = days.min(max_days);
            today
                .checked_sub_days(Days::new(u64::from(days - 1)))
                .map(|from| (from, today))
        };

        match self {
            Self::Last7Days => ending_today(7),
            Self::Last30Days => ending_today(30),
            Self::Last90Days => ending_today(90),
            Self::All => ending_today(max_days),
            Self::Custom { from, to } => {
                if from > to {
                    return None;
                }
                let earliest = to
                    .checked_sub_days(Days::new(u64::from(max_days - 1)))
                    .unwrap_or(from);
                Some((from.max(earliest), to))
            }
        }
    }
}

/// Kind of dated event feeding the daily series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    View,
    Inquiry,
    ViewingRequest,
    Favorite,
}

/// One dated event attributed to a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEvent {
    pub property_id: String,
    pub kind: ActivityKind,
    pub at: DateTime<Utc>,
}

/// Counters attributed to one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub views: u64,
    pub inquiries: u64,
    pub viewing_requests: u64,
    pub favorites: u64,
}

impl DailyPoint {
    const fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            views: 0,
            inquiries: 0,
            viewing_requests: 0,
            favorites: 0,
        }
    }
}

/// One point per day from `from` to `to` inclusive, zero-filled. Events outside the range
/// are ignored; an inverted range gives an empty series.
#[must_use]
pub fn build_daily_series(
    events: &[ActivityEvent],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, DailyPoint> = from
        .iter_days()
        .take_while(|day| *day <= to)
        .map(|day| (day, DailyPoint::empty(day)))
        .collect();

    for event in events {
        if let Some(point) = days.get_mut(&event.at.date_naive()) {
            match event.kind {
                ActivityKind::View => point.views += 1,
                ActivityKind::Inquiry => point.inquiries += 1,
                ActivityKind::ViewingRequest => point.viewing_requests += 1,
                ActivityKind::Favorite => point.favorites += 1,
            }
        }
    }
    days.into_values().collect()
}

/// Everything an analytics screen renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub summary: AnalyticsSummary,
    pub snapshots: Vec<AnalyticsSnapshot>,
    pub series: Vec<DailyPoint>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl AnalyticsReport {
    /// All totals zero, no snapshots, empty series.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }
}

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Records one detail-page view.
///
/// # Errors
/// Returns an error if the insert fails (including an unknown property id).
#[instrument(skip(db))]
pub async fn record_view(
    db: &DatabaseConnection,
    property_id: &str,
    session_id: Option<String>,
    user_agent: Option<String>,
) -> Result<()> {
    let view = property_view::ActiveModel {
        property_id: Set(property_id.to_string()),
        session_id: Set(session_id),
        user_agent: Set(user_agent),
        viewed_at: Set(Utc::now()),
        ..Default::default()
    };
    view.insert(db).await?;
    Ok(())
}

async fn property_titles(
    db: &DatabaseConnection,
    ids: Option<&[String]>,
) -> Result<Vec<(String, String)>> {
    let mut select = PropertyEntity::find()
        .select_only()
        .column(property::Column::Id)
        .column(property::Column::Title);
    if let Some(ids) = ids {
        select = select.filter(property::Column::Id.is_in(ids.iter().cloned()));
    }
    Ok(select
        .order_by_desc(property::Column::CreatedAt)
        .into_tuple()
        .all(db)
        .await?)
}

/// Computes snapshots for the listings in `ids`, or for every listing when `ids` is None.
/// Rolling windows (7/30 days) are measured back from `now`.
///
/// # Errors
/// Returns an error if any of the event queries fail.
#[instrument(skip(db, ids))]
pub async fn list_analytics(
    db: &DatabaseConnection,
    ids: Option<&[String]>,
    now: DateTime<Utc>,
) -> Result<Vec<AnalyticsSnapshot>> {
    let titles = property_titles(db, ids).await?;
    if titles.is_empty() {
        return Ok(Vec::new());
    }
    let property_ids: Vec<String> = titles.iter().map(|(id, _)| id.clone()).collect();
    let week_ago = now - chrono::Duration::days(7);
    let month_ago = now - chrono::Duration::days(30);

    let mut snapshots: HashMap<String, AnalyticsSnapshot> = titles
        .into_iter()
        .map(|(id, title)| {
            let snapshot = AnalyticsSnapshot {
                property_id: id.clone(),
                title,
                ..AnalyticsSnapshot::default()
            };
            (id, snapshot)
        })
        .collect();

    let views = PropertyView::find()
        .filter(property_view::Column::PropertyId.is_in(property_ids.iter().cloned()))
        .all(db)
        .await?;
    for view in views {
        if let Some(s) = snapshots.get_mut(&view.property_id) {
            s.total_views += 1;
            s.views_7d += u64::from(view.viewed_at >= week_ago);
            s.views_30d += u64::from(view.viewed_at >= month_ago);
        }
    }

    let inquiries = Inquiry::find()
        .filter(inquiry::Column::PropertyId.is_in(property_ids.iter().cloned()))
        .all(db)
        .await?;
    for row in inquiries {
        if let Some(s) = snapshots.get_mut(&row.property_id) {
            s.total_inquiries += 1;
            s.inquiries_7d += u64::from(row.created_at >= week_ago);
        }
    }

    let viewings = Viewing::find()
        .filter(viewing::Column::PropertyId.is_in(property_ids.iter().cloned()))
        .all(db)
        .await?;
    for row in viewings {
        if let Some(s) = snapshots.get_mut(&row.property_id) {
            s.total_viewings += 1;
        }
    }

    let favorites = Favorite::find()
        .filter(favorite::Column::PropertyId.is_in(property_ids.iter().cloned()))
        .all(db)
        .await?;
    for row in favorites {
        if let Some(s) = snapshots.get_mut(&row.property_id) {
            s.total_favorites += 1;
        }
    }

    // keep the newest-first order of the property query
    Ok(property_ids
        .iter()
        .filter_map(|id| snapshots.remove(id))
        .collect())
}

/// Dated events between `from` and `to` (inclusive days) for the listings in `ids`, or for
/// every listing when `ids` is None.
///
/// # Errors
/// Returns an error if any of the event queries fail.
#[instrument(skip(db, ids))]
pub async fn fetch_activity(
    db: &DatabaseConnection,
    ids: Option<&[String]>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<ActivityEvent>> {
    if from > to {
        return Ok(Vec::new());
    }
    let start = start_of(from);
    let end = start_of(to) + chrono::Duration::days(1);
    let mut events = Vec::new();

    let mut views = PropertyView::find()
        .filter(property_view::Column::ViewedAt.gte(start))
        .filter(property_view::Column::ViewedAt.lt(end));
    if let Some(ids) = ids {
        views = views.filter(property_view::Column::PropertyId.is_in(ids.iter().cloned()));
    }
    events.extend(views.all(db).await?.into_iter().map(|row| ActivityEvent {
        property_id: row.property_id,
        kind: ActivityKind::View,
        at: row.viewed_at,
    }));

    let mut inquiries = Inquiry::find()
        .filter(inquiry::Column::CreatedAt.gte(start))
        .filter(inquiry::Column::CreatedAt.lt(end));
    if let Some(ids) = ids {
        inquiries = inquiries.filter(inquiry::Column::PropertyId.is_in(ids.iter().cloned()));
    }
    events.extend(inquiries.all(db).await?.into_iter().map(|row| ActivityEvent {
        property_id: row.property_id,
        kind: ActivityKind::Inquiry,
        at: row.created_at,
    }));

    let mut viewings = Viewing::find()
        .filter(viewing::Column::CreatedAt.gte(start))
        .filter(viewing::Column::CreatedAt.lt(end));
    if let Some(ids) = ids {
        viewings = viewings.filter(viewing::Column::PropertyId.is_in(ids.iter().cloned()));
    }
    events.extend(viewings.all(db).await?.into_iter().map(|row| ActivityEvent {
        property_id: row.property_id,
        kind: ActivityKind::ViewingRequest,
        at: row.created_at,
    }));

    let mut favorites = Favorite::find()
        .filter(favorite::Column::CreatedAt.gte(start))
        .filter(favorite::Column::CreatedAt.lt(end));
    if let Some(ids) = ids {
        favorites = favorites.filter(favorite::Column::PropertyId.is_in(ids.iter().cloned()));
    }
    events.extend(favorites.all(db).await?.into_iter().map(|row| ActivityEvent {
        property_id: row.property_id,
        kind: ActivityKind::Favorite,
        at: row.created_at,
    }));

    debug!("Fetched {} activity events", events.len());
    Ok(events)
}

/// What one analytics request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    /// Listings the caller may see; None means all of them
    pub property_ids: Option<Vec<String>>,
    pub scope: AnalyticsScope,
    pub range: TimeRange,
    pub max_range_days: u32,
}

async fn try_build_report(
    db: &DatabaseConnection,
    request: &ReportRequest,
    now: DateTime<Utc>,
) -> Result<AnalyticsReport> {
    let ids = request.property_ids.as_deref();
    let mut snapshots = list_analytics(db, ids, now).await?;
    if let AnalyticsScope::Property(id) = &request.scope {
        snapshots.retain(|s| s.property_id == *id);
    }
    let summary = summarize(&snapshots, &AnalyticsScope::All);

    let Some((from, to)) = request.range.bounds(now.date_naive(), request.max_range_days) else {
        return Ok(AnalyticsReport {
            summary,
            snapshots,
            ..AnalyticsReport::default()
        });
    };

    let scoped_ids: Vec<String> = snapshots.iter().map(|s| s.property_id.clone()).collect();
    let events = fetch_activity(db, Some(&scoped_ids), from, to).await?;

    Ok(AnalyticsReport {
        summary,
        snapshots,
        series: build_daily_series(&events, from, to),
        from: Some(from),
        to: Some(to),
    })
}

/// Builds the full report. Store failures are logged and produce [`AnalyticsReport::zero`].
pub async fn build_report(
    db: &DatabaseConnection,
    request: &ReportRequest,
    now: DateTime<Utc>,
) -> AnalyticsReport {
    match try_build_report(db, request, now).await {
        Ok(report) => report,
        Err(e) => {
            error!("Failed to load analytics, showing zeros: {}", e);
            AnalyticsReport::zero()
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{favorite as favorites, inquiry as inquiries};
    use crate::test_utils::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot(id: &str, views: u64, inquiries: u64) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            property_id: id.to_string(),
            total_views: views,
            total_inquiries: inquiries,
            total_favorites: 1,
            ..AnalyticsSnapshot::default()
        }
    }

    #[test]
    fn test_conversion_rate_bounds() {
        assert_eq!(conversion_rate(0, 0), 0.0);
        assert_eq!(conversion_rate(5, 0), 0.0);
        assert_eq!(conversion_rate(1, 4), 25.0);
        assert_eq!(conversion_rate(9, 3), 100.0);
        for views in 0..20 {
            for inquiries in 0..20 {
                let rate = conversion_rate(inquiries, views);
                assert!((0.0..=100.0).contains(&rate));
            }
        }
    }

    #[test]
    fn test_summarize_scopes() {
        let snapshots = vec![snapshot("a", 10, 1), snapshot("b", 30, 3)];

        let all = summarize(&snapshots, &AnalyticsScope::All);
        assert_eq!(all.total_views, 40);
        assert_eq!(all.total_inquiries, 4);
        assert_eq!(all.total_favorites, 2);
        assert_eq!(all.conversion_rate, 10.0);

        let one = summarize(&snapshots, &AnalyticsScope::Property("b".to_string()));
        assert_eq!(one.total_views, 30);
        assert_eq!(one.total_favorites, 1);

        let none = summarize(&[], &AnalyticsScope::All);
        assert_eq!(none, AnalyticsSummary::default());
    }

    #[test]
    fn test_preset_ranges_end_today() {
        let today = day(2025, 3, 31);
        assert_eq!(
            TimeRange::Last7Days.bounds(today, 90),
            Some((day(2025, 3, 25), today))
        );
        assert_eq!(
            TimeRange::Last30Days.bounds(today, 90),
            Some((day(2025, 3, 2), today))
        );
        let (from, to) = TimeRange::All.bounds(today, 90).unwrap();
        assert_eq!((to - from).num_days() + 1, 90);
        let (from, _) = TimeRange::Last90Days.bounds(today, 10).unwrap();
        assert_eq!(from, day(2025, 3, 22));
    }

    #[test]
    fn test_custom_range_edges() {
        let today = day(2025, 6, 1);
        let inverted = TimeRange::Custom {
            from: day(2025, 5, 10),
            to: day(2025, 5, 1),
        };
        assert_eq!(inverted.bounds(today, 90), None);

        let long = TimeRange::Custom {
            from: day(2024, 1, 1),
            to: day(2025, 5, 31),
        };
        let (from, to) = long.bounds(today, 90).unwrap();
        assert_eq!(to, day(2025, 5, 31));
        assert_eq!((to - from).num_days() + 1, 90);

        let single = TimeRange::Custom {
            from: day(2025, 5, 5),
            to: day(2025, 5, 5),
        };
        assert_eq!(single.bounds(today, 90), Some((day(2025, 5, 5), day(2025, 5, 5))));
    }

    #[test]
    fn test_time_range_parse() {
        assert_eq!(TimeRange::parse("7d", None, None), TimeRange::Last7Days);
        assert_eq!(TimeRange::parse("ALL", None, None), TimeRange::All);
        assert_eq!(TimeRange::parse("custom", Some(day(2025, 1, 1)), None), TimeRange::Last30Days);
        assert_eq!(TimeRange::parse("weekly", None, None), TimeRange::Last30Days);
        assert_eq!(
            TimeRange::parse("custom", Some(day(2025, 1, 1)), Some(day(2025, 1, 2))),
            TimeRange::Custom {
                from: day(2025, 1, 1),
                to: day(2025, 1, 2)
            }
        );
    }

    #[test]
    fn test_daily_series_is_dense() {
        let at = |d: u32, h: u32| Utc.with_ymd_and_hms(2025, 4, d, h, 0, 0).unwrap();
        let event = |kind, d, h| ActivityEvent {
            property_id: "p".to_string(),
            kind,
            at: at(d, h),
        };
        let events = vec![
            event(ActivityKind::View, 1, 9),
            event(ActivityKind::View, 1, 23),
            event(ActivityKind::Inquiry, 3, 12),
            event(ActivityKind::Favorite, 3, 13),
            event(ActivityKind::ViewingRequest, 5, 8),
            event(ActivityKind::View, 9, 8),
        ];

        let series = build_daily_series(&events, day(2025, 4, 1), day(2025, 4, 5));
        assert_eq!(series.len(), 5);
        assert_eq!(series[0].views, 2);
        assert_eq!(series[1], DailyPoint::empty(day(2025, 4, 2)));
        assert_eq!(series[2].inquiries, 1);
        assert_eq!(series[2].favorites, 1);
        assert_eq!(series[4].viewing_requests, 1);
        assert!(series.windows(2).all(|w| w[1].date == w[0].date.succ_opt().unwrap()));

        assert!(build_daily_series(&events, day(2025, 4, 5), day(2025, 4, 1)).is_empty());
    }

    #[tokio::test]
    async fn test_list_analytics_counts_events() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_property(&db, "A", 100.0).await?;
        let b = create_test_property(&db, "B", 200.0).await?;

        for _ in 0..4 {
            record_view(&db, &a.id, None, None).await?;
        }
        record_view(&db, &b.id, Some("s1".to_string()), None).await?;
        inquiries::create_inquiry(&db, &a.id, &inquiry_input()).await?;
        favorites::toggle_favorite(&db, "user-1", &a.id).await?;

        let snapshots = list_analytics(&db, None, Utc::now()).await?;
        assert_eq!(snapshots.len(), 2);
        let snap_a = snapshots.iter().find(|s| s.property_id == a.id).unwrap();
        assert_eq!(snap_a.title, "A");
        assert_eq!(snap_a.total_views, 4);
        assert_eq!(snap_a.views_7d, 4);
        assert_eq!(snap_a.views_30d, 4);
        assert_eq!(snap_a.total_inquiries, 1);
        assert_eq!(snap_a.inquiries_7d, 1);
        assert_eq!(snap_a.total_favorites, 1);
        assert_eq!(snap_a.conversion_rate(), 25.0);

        let only_b = list_analytics(&db, Some(&[b.id.clone()]), Utc::now()).await?;
        assert_eq!(only_b.len(), 1);
        assert_eq!(only_b[0].total_views, 1);

        assert!(list_analytics(&db, Some(&[]), Utc::now()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_rolling_windows_use_now() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_property(&db, "A", 100.0).await?;
        record_view(&db, &a.id, None, None).await?;

        let later = Utc::now() + chrono::Duration::days(10);
        let snapshots = list_analytics(&db, None, later).await?;
        assert_eq!(snapshots[0].total_views, 1);
        assert_eq!(snapshots[0].views_7d, 0);
        assert_eq!(snapshots[0].views_30d, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_build_report_for_one_property() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_property(&db, "A", 100.0).await?;
        let b = create_test_property(&db, "B", 100.0).await?;
        record_view(&db, &a.id, None, None).await?;
        record_view(&db, &a.id, None, None).await?;
        record_view(&db, &b.id, None, None).await?;

        let request = ReportRequest {
            property_ids: None,
            scope: AnalyticsScope::Property(a.id.clone()),
            range: TimeRange::Last7Days,
            max_range_days: 90,
        };
        let report = build_report(&db, &request, Utc::now()).await;

        assert_eq!(report.snapshots.len(), 1);
        assert_eq!(report.summary.total_views, 2);
        assert_eq!(report.series.len(), 7);
        assert_eq!(report.series.iter().map(|p| p.views).sum::<u64>(), 2);
        assert_eq!(report.to, Some(Utc::now().date_naive()));
        Ok(())
    }

    #[tokio::test]
    async fn test_inverted_custom_range_gives_empty_series() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_property(&db, "A", 100.0).await?;
        record_view(&db, &a.id, None, None).await?;

        let request = ReportRequest {
            property_ids: None,
            scope: AnalyticsScope::All,
            range: TimeRange::Custom {
                from: day(2025, 5, 2),
                to: day(2025, 5, 1),
            },
            max_range_days: 90,
        };
        let report = build_report(&db, &request, Utc::now()).await;
        assert!(report.series.is_empty());
        assert_eq!(report.summary.total_views, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_store_failure_yields_zero_report() -> Result<()> {
        // no tables: every query fails
        let db = sea_orm::Database::connect("sqlite::memory:").await?;
        let request = ReportRequest {
            property_ids: None,
            scope: AnalyticsScope::All,
            range: TimeRange::Last30Days,
            max_range_days: 90,
        };
        let report = build_report(&db, &request, Utc::now()).await;
        assert_eq!(report, AnalyticsReport::zero());
        Ok(())
    }
}
