use crate::venuzle::model::{compact_date, DayAvailability, SlotStatus};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the viewer needs: a day by start-time grid plus the raw days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueCalendar {
    pub calendar_grid: BTreeMap<String, CalendarDay>,
    pub sorted_times: Vec<String>,
    pub sorted_dates: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_days: usize,
    pub all_days_data: Vec<DayAvailability>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day_name: String,
    pub day_of_week: String,
    pub date_formatted: String,
    pub slots_by_time: BTreeMap<String, Vec<CalendarEntry>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub venue_id: u32,
    pub venue_name: String,
    pub time_range: String,
    pub time_to: String,
    pub price: Option<String>,
    pub status: SlotStatus,
    pub is_available: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub day_name: String,
    pub listed_slots: usize,
    pub available_slots: usize,
    pub slots_by_status: BTreeMap<&'static str, usize>,
}

impl VenueCalendar {
    pub fn from_days(all_days_data: Vec<DayAvailability>) -> Self {
        let calendar_grid: BTreeMap<String, CalendarDay> = all_days_data
            .iter()
            .map(|day| (compact_date::format(&day.date), CalendarDay::from_day(day)))
            .collect();

        let sorted_times = calendar_grid
            .values()
            .flat_map(|day| day.slots_by_time.keys())
            .unique()
            .sorted()
            .cloned()
            .collect();

        Self {
            sorted_dates: calendar_grid.keys().cloned().collect(),
            sorted_times,
            calendar_grid,
            start_date: all_days_data.first().map(|day| compact_date::format(&day.date)),
            end_date: all_days_data.last().map(|day| compact_date::format(&day.date)),
            total_days: all_days_data.len(),
            all_days_data,
        }
    }

    pub fn summary(&self) -> Vec<DaySummary> {
        self.calendar_grid
            .values()
            .map(|day| {
                let entries = day.slots_by_time.values().flatten();

                DaySummary {
                    day_name: day.day_name.clone(),
                    listed_slots: entries.clone().count(),
                    available_slots: entries.clone().filter(|entry| entry.is_available).count(),
                    slots_by_status: entries
                        .map(|entry| -> &'static str { entry.status.into() })
                        .counts()
                        .into_iter()
                        .collect(),
                }
            })
            .collect()
    }
}

impl CalendarDay {
    fn from_day(day: &DayAvailability) -> Self {
        let mut slots_by_time: BTreeMap<String, Vec<CalendarEntry>> = BTreeMap::new();

        for venue in &day.venues {
            for slot in &venue.available_slots {
                slots_by_time
                    .entry(slot.time_from.clone())
                    .or_default()
                    .push(CalendarEntry {
                        venue_id: venue.venue_id,
                        venue_name: venue.venue_name.clone(),
                        time_range: slot.time.clone(),
                        time_to: slot.time_to.clone(),
                        price: slot.price.clone(),
                        status: slot.status,
                        is_available: slot.is_available,
                        reason: slot.reason.clone(),
                    });
            }
        }

        Self {
            day_name: day.date.format("%a %d.%m").to_string(),
            day_of_week: day.date.format("%A").to_string(),
            date_formatted: day.date.format("%d.%m.%Y").to_string(),
            slots_by_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venuzle::model::{Slot, VenueAvailability};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn slot(from: &str, to: &str, status: SlotStatus) -> Slot {
        let is_available = status == SlotStatus::Available;
        let price = is_available.then(|| "€ 10,00".to_string());

        Slot::new(from.into(), to.into(), price, status, is_available, None)
    }

    fn day(d: u32, venues: Vec<VenueAvailability>) -> DayAvailability {
        let total = venues.len();

        DayAvailability::new(
            NaiveDate::from_ymd_opt(2026, 2, d).unwrap(),
            format!("http://localhost/c/6/202602{:02}/ajax/", d),
            venues,
            total,
        )
    }

    fn venue(id: u32, name: &str, slots: Vec<Slot>) -> VenueAvailability {
        VenueAvailability {
            venue_id: id,
            venue_name: name.to_string(),
            available_slots: slots,
        }
    }

    #[test_log::test]
    fn should_group_slots_by_start_time() {
        let calendar = VenueCalendar::from_days(vec![day(
            9,
            vec![
                venue(
                    86,
                    "Turnsaal 1",
                    vec![
                        slot("17:00", "18:00", SlotStatus::Available),
                        slot("08:00", "09:00", SlotStatus::Blocked),
                    ],
                ),
                venue(87, "Turnsaal 2", vec![slot("17:00", "19:00", SlotStatus::Unavailable)]),
            ],
        )]);

        let monday = &calendar.calendar_grid["20260209"];
        let at_five = &monday.slots_by_time["17:00"];

        assert_eq!(monday.day_name, "Mon 09.02");
        assert_eq!(monday.day_of_week, "Monday");
        assert_eq!(monday.date_formatted, "09.02.2026");
        assert_eq!(
            monday.slots_by_time.keys().collect::<Vec<&String>>(),
            vec!["08:00", "17:00"]
        );
        assert_eq!(
            at_five.iter().map(|entry| entry.venue_id).collect::<Vec<u32>>(),
            vec![86, 87]
        );
        assert_eq!(at_five[1].time_range, "17:00-19:00");
        assert_eq!(at_five[1].status, SlotStatus::Unavailable);
    }

    #[test_log::test]
    fn should_collect_sorted_times_and_dates_across_days() {
        let calendar = VenueCalendar::from_days(vec![
            day(10, vec![venue(1, "A", vec![slot("19:00", "20:00", SlotStatus::Blocked)])]),
            day(9, vec![venue(1, "A", vec![slot("07:00", "08:00", SlotStatus::Available)])]),
            day(11, vec![]),
        ]);

        assert_eq!(calendar.sorted_times, vec!["07:00", "19:00"]);
        assert_eq!(calendar.sorted_dates, vec!["20260209", "20260210", "20260211"]);
        assert_eq!(calendar.start_date.as_deref(), Some("20260210"));
        assert_eq!(calendar.end_date.as_deref(), Some("20260211"));
        assert_eq!(calendar.total_days, 3);
        assert!(calendar.calendar_grid["20260211"].slots_by_time.is_empty());
    }

    #[test_log::test]
    fn when_there_are_no_days_should_have_no_bounds() {
        let calendar = VenueCalendar::from_days(vec![]);

        assert_eq!(calendar.start_date, None);
        assert_eq!(calendar.end_date, None);
        assert_eq!(calendar.total_days, 0);
        assert!(calendar.sorted_times.is_empty());
    }

    #[test_log::test]
    fn should_summarize_listed_and_available_slots() {
        let calendar = VenueCalendar::from_days(vec![day(
            9,
            vec![venue(
                86,
                "Turnsaal 1",
                vec![
                    slot("07:00", "08:00", SlotStatus::Available),
                    slot("08:00", "09:00", SlotStatus::Blocked),
                    slot("09:00", "10:00", SlotStatus::Available),
                ],
            )],
        )]);

        assert_eq!(
            calendar.summary(),
            vec![DaySummary {
                day_name: "Mon 09.02".to_string(),
                listed_slots: 3,
                available_slots: 2,
                slots_by_status: BTreeMap::from([("available", 2), ("blocked", 1)]),
            }]
        );
    }
}
