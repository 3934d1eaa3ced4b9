//! Recency grouping for the conversation sidebar
//!
//! Conversations are partitioned into seven fixed buckets relative to the
//! current instant. Day comparisons use the conversation's calendar day in
//! the timezone of `now`; the "this month" and "last month" checks compare
//! the raw timestamp instead. Both styles are kept exactly as they are so a
//! conversation lands in the same bucket it always has.

use crate::conversation::Conversation;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, TimeZone, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// First day of the week for the week-based buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// Weeks run Sunday through Saturday
    #[default]
    Sunday,
    /// Weeks run Monday through Sunday
    Monday,
}

impl WeekStart {
    /// Number of days between the start of the week and `day`
    pub fn days_into_week(self, day: Weekday) -> u64 {
        match self {
            WeekStart::Sunday => u64::from(day.num_days_from_sunday()),
            WeekStart::Monday => u64::from(day.num_days_from_monday()),
        }
    }

    /// Parse from a case-insensitive name
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            "monday" | "mon" => Ok(WeekStart::Monday),
            other => Err(format!("Invalid week start: {}", other)),
        }
    }
}

/// One of the recency groups shown in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Today,
    Yesterday,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
    Older,
}

impl Bucket {
    /// All buckets in display order
    pub const ALL: [Bucket; 7] = [
        Bucket::Today,
        Bucket::Yesterday,
        Bucket::ThisWeek,
        Bucket::LastWeek,
        Bucket::ThisMonth,
        Bucket::LastMonth,
        Bucket::Older,
    ];

    /// Heading shown above the group
    pub fn label(self) -> &'static str {
        match self {
            Bucket::Today => "Today",
            Bucket::Yesterday => "Yesterday",
            Bucket::ThisWeek => "This Week",
            Bucket::LastWeek => "Last Week",
            Bucket::ThisMonth => "This Month",
            Bucket::LastMonth => "Last Month",
            Bucket::Older => "Older",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Conversations partitioned by recency
///
/// Each bucket keeps the relative order of the input list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedConversations {
    pub today: Vec<Conversation>,
    pub yesterday: Vec<Conversation>,
    pub this_week: Vec<Conversation>,
    pub last_week: Vec<Conversation>,
    pub this_month: Vec<Conversation>,
    pub last_month: Vec<Conversation>,
    pub older: Vec<Conversation>,
}

impl CategorizedConversations {
    /// Conversations in the given bucket
    pub fn get(&self, bucket: Bucket) -> &[Conversation] {
        match bucket {
            Bucket::Today => &self.today,
            Bucket::Yesterday => &self.yesterday,
            Bucket::ThisWeek => &self.this_week,
            Bucket::LastWeek => &self.last_week,
            Bucket::ThisMonth => &self.this_month,
            Bucket::LastMonth => &self.last_month,
            Bucket::Older => &self.older,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<Conversation> {
        match bucket {
            Bucket::Today => &mut self.today,
            Bucket::Yesterday => &mut self.yesterday,
            Bucket::ThisWeek => &mut self.this_week,
            Bucket::LastWeek => &mut self.last_week,
            Bucket::ThisMonth => &mut self.this_month,
            Bucket::LastMonth => &mut self.last_month,
            Bucket::Older => &mut self.older,
        }
    }

    /// Iterate over all buckets in display order, including empty ones
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[Conversation])> {
        Bucket::ALL.into_iter().map(move |b| (b, self.get(b)))
    }

    /// Iterate over the buckets that contain at least one conversation
    pub fn non_empty(&self) -> impl Iterator<Item = (Bucket, &[Conversation])> {
        self.iter().filter(|(_, convs)| !convs.is_empty())
    }

    /// Apply a case-insensitive search over title and last message
    ///
    /// Each bucket is filtered independently. An empty term yields an
    /// unchanged copy.
    pub fn filter(&self, term: &str) -> Self {
        if term.is_empty() {
            return self.clone();
        }
        let keep = |convs: &[Conversation]| -> Vec<Conversation> {
            convs.iter().filter(|c| c.matches(term)).cloned().collect()
        };
        Self {
            today: keep(&self.today),
            yesterday: keep(&self.yesterday),
            this_week: keep(&self.this_week),
            last_week: keep(&self.last_week),
            this_month: keep(&self.this_month),
            last_month: keep(&self.last_month),
            older: keep(&self.older),
        }
    }

    /// True when at least one bucket is non-empty
    pub fn has_results(&self) -> bool {
        self.iter().any(|(_, convs)| !convs.is_empty())
    }

    /// Total number of conversations across all buckets
    pub fn len(&self) -> usize {
        self.iter().map(|(_, convs)| convs.len()).sum()
    }

    /// True when there are no conversations at all
    pub fn is_empty(&self) -> bool {
        !self.has_results()
    }
}

/// Calendar boundaries derived from the current instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Boundaries {
    today: NaiveDate,
    yesterday: NaiveDate,
    this_week_start: NaiveDate,
    last_week_start: NaiveDate,
    this_month_start: NaiveDateTime,
    last_month_start: NaiveDateTime,
}

impl Boundaries {
    fn new(now: NaiveDateTime, week_start: WeekStart) -> Self {
        let today = now.date();
        let yesterday = today - Days::new(1);
        let this_week_start = today - Days::new(week_start.days_into_week(today.weekday()));
        let last_week_start = this_week_start - Days::new(7);

        let this_month_first = today.with_day(1).unwrap_or(today);
        let last_month_first = if this_month_first.month() == 1 {
            NaiveDate::from_ymd_opt(this_month_first.year() - 1, 12, 1)
        } else {
            NaiveDate::from_ymd_opt(this_month_first.year(), this_month_first.month() - 1, 1)
        }
        .unwrap_or(this_month_first);

        Self {
            today,
            yesterday,
            this_week_start,
            last_week_start,
            this_month_start: this_month_first.and_time(chrono::NaiveTime::MIN),
            last_month_start: last_month_first.and_time(chrono::NaiveTime::MIN),
        }
    }

    /// First matching rule wins; day-based checks precede month checks
    fn classify(&self, updated_at: NaiveDateTime) -> Bucket {
        let day = updated_at.date();

        if day == self.today {
            Bucket::Today
        } else if day == self.yesterday {
            Bucket::Yesterday
        } else if day >= self.this_week_start && day < self.today {
            Bucket::ThisWeek
        } else if day >= self.last_week_start && day < self.this_week_start {
            Bucket::LastWeek
        } else if updated_at >= self.this_month_start && day < self.this_week_start {
            Bucket::ThisMonth
        } else if updated_at >= self.last_month_start && updated_at < self.this_month_start {
            Bucket::LastMonth
        } else {
            Bucket::Older
        }
    }
}

/// Partition conversations into recency buckets
///
/// Every input conversation appears in exactly one bucket, and each bucket
/// preserves the input order. Timestamps are interpreted in the timezone of
/// `now`.
///
/// # Examples
///
/// ```
/// use chatline::conversation::{categorize, Conversation, WeekStart};
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
/// let conv = Conversation {
///     id: "c1".to_string(),
///     title: "Standup notes".to_string(),
///     last_message: None,
///     created_at: None,
///     updated_at: Utc.with_ymd_and_hms(2024, 3, 12, 9, 0, 0).unwrap(),
/// };
/// let buckets = categorize(&now, &[conv], WeekStart::Sunday);
/// assert_eq!(buckets.this_week.len(), 1);
/// ```
pub fn categorize<Tz: TimeZone>(
    now: &DateTime<Tz>,
    conversations: &[Conversation],
    week_start: WeekStart,
) -> CategorizedConversations {
    let tz = now.timezone();
    let boundaries = Boundaries::new(now.naive_local(), week_start);

    let mut categorized = CategorizedConversations::default();
    for conversation in conversations {
        let local = conversation.updated_at.with_timezone(&tz).naive_local();
        categorized
            .get_mut(boundaries.classify(local))
            .push(conversation.clone());
    }

    tracing::debug!(
        "Categorized {} conversations (today={}, yesterday={}, older={})",
        conversations.len(),
        categorized.today.len(),
        categorized.yesterday.len(),
        categorized.older.len()
    );

    categorized
}
