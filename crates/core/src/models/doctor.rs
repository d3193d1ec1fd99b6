use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::Document;

/// Availability window for a single weekday.
///
/// `start`/`end` are `HH:MM` times of day; both are irrelevant when
/// `available` is false. An inverted or zero-length window simply yields no
/// bookable slots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DayWindow {
    pub available: bool,
    #[serde(with = "super::time_hm::option", default)]
    #[schema(value_type = Option<String>, example = "09:00")]
    pub start: Option<NaiveTime>,
    #[serde(with = "super::time_hm::option", default)]
    #[schema(value_type = Option<String>, example = "17:00")]
    pub end: Option<NaiveTime>,
}

/// Weekly booking windows, one entry per weekday.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeeklyAvailability {
    #[serde(default)]
    pub monday: DayWindow,
    #[serde(default)]
    pub tuesday: DayWindow,
    #[serde(default)]
    pub wednesday: DayWindow,
    #[serde(default)]
    pub thursday: DayWindow,
    #[serde(default)]
    pub friday: DayWindow,
    #[serde(default)]
    pub saturday: DayWindow,
    #[serde(default)]
    pub sunday: DayWindow,
}

impl WeeklyAvailability {
    pub fn day(&self, weekday: Weekday) -> &DayWindow {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }
}

/// Role-specific extension of a user with the doctor role.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: String,
    pub license_number: String,
    pub experience: u32,
    pub consultation_fee: f64,
    pub bio: Option<String>,
    pub availability: WeeklyAvailability,
    pub rating: f64,
    pub total_reviews: u32,
    pub is_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Doctor {
    const COLLECTION: &'static str = "doctors";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct DoctorListQuery {
    pub specialization: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct UpdateAvailabilityRequest {
    pub availability: WeeklyAvailability,
}

/// Aggregate counters surfaced on the doctor dashboard.
#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorStats {
    pub total_appointments: u64,
    pub completed_appointments: u64,
    pub today_appointments: u64,
    pub rating: f64,
    pub experience: u32,
    pub total_reviews: u32,
}
