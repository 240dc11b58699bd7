use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One fetched timetable page: every venue of a cluster on a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAvailability {
    #[serde(with = "compact_date")]
    pub date: NaiveDate,
    pub url: String,
    pub venues: Vec<VenueAvailability>,
    pub total_venues: usize,
    /// Venue rows that were parsed, with or without slots
    pub venues_with_slots: usize,
    /// Venues having at least one bookable slot
    #[serde(default)]
    pub venues_with_available_slots: usize,
}

impl DayAvailability {
    pub fn new(
        date: NaiveDate,
        url: String,
        venues: Vec<VenueAvailability>,
        total_venues: usize,
    ) -> Self {
        let venues_with_available_slots = venues
            .iter()
            .filter(|venue| venue.available_slots.iter().any(|slot| slot.is_available))
            .count();

        Self {
            date,
            url,
            venues_with_slots: venues.len(),
            venues,
            total_venues,
            venues_with_available_slots,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueAvailability {
    pub venue_id: u32,
    pub venue_name: String,
    /// Every slot of the row, whatever its status
    pub available_slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub time: String,
    pub time_from: String,
    pub time_to: String,
    pub price: Option<String>,
    pub status: SlotStatus,
    pub is_available: bool,
    pub reason: Option<String>,
}

impl Slot {
    pub fn new(
        time_from: String,
        time_to: String,
        price: Option<String>,
        status: SlotStatus,
        is_available: bool,
        reason: Option<String>,
    ) -> Self {
        Self {
            time: format!("{}-{}", time_from, time_to),
            time_from,
            time_to,
            price,
            status,
            is_available,
            reason,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SlotStatus {
    Available,
    /// Shown as free but without a booking action
    Unavailable,
    Blocked,
    NotOffered,
    Unknown,
}

/// Dates travel as `YYYYMMDD`, the format of the booking URLs
pub mod compact_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y%m%d";

    pub fn format(date: &NaiveDate) -> String {
        date.format(FORMAT).to_string()
    }

    pub fn serialize<S>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&format(date))
    }

    pub fn deserialize<'de, D>(d: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(d)?;

        NaiveDate::parse_from_str(&value, FORMAT).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(status: SlotStatus, is_available: bool) -> Slot {
        Slot::new("08:00".into(), "09:00".into(), None, status, is_available, None)
    }

    #[test_log::test]
    fn should_count_parsed_venues_and_venues_with_a_bookable_slot() {
        let day = DayAvailability::new(
            NaiveDate::from_ymd_opt(2026, 2, 9).unwrap(),
            "http://localhost".to_string(),
            vec![
                VenueAvailability {
                    venue_id: 1,
                    venue_name: "Turnsaal A".to_string(),
                    available_slots: vec![
                        slot(SlotStatus::Blocked, false),
                        slot(SlotStatus::Available, true),
                    ],
                },
                VenueAvailability {
                    venue_id: 2,
                    venue_name: "Turnsaal B".to_string(),
                    available_slots: vec![slot(SlotStatus::Unavailable, false)],
                },
                VenueAvailability {
                    venue_id: 3,
                    venue_name: "Turnsaal C".to_string(),
                    available_slots: vec![],
                },
            ],
            4,
        );

        assert_eq!(day.venues_with_slots, 3);
        assert_eq!(day.venues_with_available_slots, 1);
        assert_eq!(day.total_venues, 4);
    }

    #[test_log::test]
    fn should_serialize_status_and_date_like_the_viewer_expects() {
        let day = DayAvailability::new(
            NaiveDate::from_ymd_opt(2026, 2, 9).unwrap(),
            "http://localhost".to_string(),
            vec![],
            0,
        );

        let json = serde_json::to_value(&day).unwrap();
        let status = serde_json::to_value(SlotStatus::NotOffered).unwrap();
        let status_name: &'static str = SlotStatus::NotOffered.into();

        assert_eq!(json["date"], "20260209");
        assert_eq!(status, "not_offered");
        assert_eq!(status_name, "not_offered");
    }

    #[test_log::test]
    fn should_join_slot_time_range() {
        let slot = slot(SlotStatus::Unknown, false);

        assert_eq!(slot.time, "08:00-09:00");
    }
}
