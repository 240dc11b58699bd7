use super::model::{DayAvailability, Slot, SlotStatus, VenueAvailability};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

/// The timetable starts at 07:00
const FIRST_HOUR: u32 = 7;
/// Each hour is split into 12 cells of 5 minutes
const UNITS_PER_HOUR: u32 = 12;
const MINUTES_PER_UNIT: u32 = 5;
/// No cell spans more than a whole day
const MAX_COLSPAN: u32 = 24 * UNITS_PER_HOUR;

const PADDING_STYLE: &str = "width: 0px";
const NOT_OFFERED_CLASS: &str = "noDisplay";
const FREE_CLASS: &str = "free-slots";
const BLOCKED_CLASS: &str = "blocked-slot";

lazy_static! {
    static ref ROW: Selector = Selector::parse("tr").expect("Invalid row selector");
    static ref CELL: Selector = Selector::parse("td").expect("Invalid cell selector");
    static ref ROW_LINK: Selector =
        Selector::parse("a.timetable-row-link").expect("Invalid row link selector");
    static ref FACILITY_NAME: Selector =
        Selector::parse("span.facility_name").expect("Invalid facility selector");
    static ref SLOT_CELL: Selector = Selector::parse("td.slot").expect("Invalid slot selector");
    static ref VENUE_ID: Regex = Regex::new(r"/v/(\d+)/").expect("Invalid venue id regex");
    static ref BOOK_CALL: Regex =
        Regex::new(r"book\((\d+),'([^']+)','([^']+)'\)").expect("Invalid book call regex");
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Response has no timetable rows")]
    NoTimetableRows,
}

/// Raw content of one AJAX timetable response, one row per venue
#[derive(Debug)]
pub struct TimetableResponse {
    pub rows: Vec<TimetableRow>,
    /// Every `<tr>`, including the ones that are not venues
    pub total_rows: usize,
}

#[derive(Debug)]
pub struct TimetableRow {
    pub venue_id: u32,
    pub venue_name: String,
    pub cells: Vec<ResponseSlotCell>,
}

#[derive(Debug, Default, Clone)]
pub struct ResponseSlotCell {
    pub classes: Vec<String>,
    pub colspan: u32,
    pub style: String,
    pub onclick: String,
    pub text: String,
    pub title: Option<String>,
    pub aria_label: Option<String>,
}

impl TimetableResponse {
    pub fn parse(html: &str) -> Result<Self, ParseError> {
        let document = Html::parse_fragment(&wrap_bare_rows(html));
        let all_rows: Vec<ElementRef> = document.select(&ROW).collect();

        if all_rows.is_empty() {
            return Err(ParseError::NoTimetableRows);
        }

        let rows = all_rows
            .iter()
            .filter_map(|row| TimetableRow::parse(*row))
            .collect::<Vec<TimetableRow>>();

        debug!("Found {} rows, {} venues", all_rows.len(), rows.len());

        Ok(Self {
            total_rows: all_rows.len(),
            rows,
        })
    }

    pub fn to_model(&self, date: NaiveDate, url: String) -> DayAvailability {
        let venues = self
            .rows
            .iter()
            .map(|row| VenueAvailability {
                venue_id: row.venue_id,
                venue_name: row.venue_name.clone(),
                available_slots: row.to_slots(),
            })
            .collect();

        DayAvailability::new(date, url, venues, self.total_rows)
    }
}

impl TimetableRow {
    fn parse(row: ElementRef) -> Option<Self> {
        let first_cell = row.select(&CELL).next()?;
        let link = first_cell.select(&ROW_LINK).next()?;

        let venue_name = Self::venue_name(link);
        let venue_id = VENUE_ID
            .captures(link.value().attr("href").unwrap_or_default())
            .and_then(|captures| captures[1].parse::<u32>().ok())
            .filter(|id| *id != 0);

        let Some(venue_id) = venue_id else {
            debug!("Skipping row '{}' without a venue id", venue_name);
            return None;
        };

        Some(Self {
            venue_id,
            venue_name,
            cells: row.select(&SLOT_CELL).map(ResponseSlotCell::parse).collect(),
        })
    }

    /// Either "Facility - Venue" when the link carries a facility span, or the link text
    fn venue_name(link: ElementRef) -> String {
        let name = match link.select(&FACILITY_NAME).next() {
            Some(facility) => {
                let facility_name = joined_text(facility.text());
                let own_text = joined_text(
                    link.children()
                        .filter_map(|node| node.value().as_text())
                        .map(|text| &**text),
                );

                if own_text.is_empty() {
                    facility_name
                } else {
                    format!("{} - {}", facility_name, own_text)
                }
            }
            None => joined_text(link.text()),
        };

        collapse_whitespace(&name)
    }

    fn to_slots(&self) -> Vec<Slot> {
        let mut offset = 0;
        let mut slots = Vec::new();

        for cell in self.cells.iter().filter(|cell| !cell.is_padding()) {
            if let Some(slot) = cell.to_slot(offset) {
                slots.push(slot);
            }

            offset = offset.saturating_add(cell.colspan);
        }

        slots
    }
}

impl ResponseSlotCell {
    fn parse(cell: ElementRef) -> Self {
        let element = cell.value();
        let colspan = match element.attr("colspan") {
            None => 1,
            Some(value) => value.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!("Invalid colspan '{}', assuming 1", value);
                1
            }),
        };
        let colspan = match u32::try_from(colspan) {
            Ok(colspan) if colspan <= MAX_COLSPAN => colspan,
            _ => {
                warn!("Colspan {} longer than a day, capping at {}", colspan, MAX_COLSPAN);
                MAX_COLSPAN
            }
        };

        Self {
            classes: element.classes().map(str::to_string).collect(),
            colspan,
            style: element.attr("style").unwrap_or_default().to_string(),
            onclick: element.attr("onclick").unwrap_or_default().to_string(),
            text: cell.text().collect::<String>(),
            title: element.attr("title").map(str::to_string),
            aria_label: element.attr("aria-label").map(str::to_string),
        }
    }

    fn is_padding(&self) -> bool {
        self.style.contains(PADDING_STYLE)
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn is_bookable(&self) -> bool {
        self.onclick.contains("book")
    }

    /// Cells shorter than an hour are layout spacers
    fn to_slot(&self, offset: u32) -> Option<Slot> {
        if self.colspan < UNITS_PER_HOUR {
            return None;
        }

        let is_available = self.is_bookable();
        let (time_from, time_to) = self
            .booked_times()
            .unwrap_or_else(|| {
                (
                    format_offset(offset),
                    format_offset(offset.saturating_add(self.colspan)),
                )
            });

        Some(Slot::new(
            time_from,
            time_to,
            non_empty(&self.text),
            self.status(is_available),
            is_available,
            self.reason(),
        ))
    }

    fn status(&self, is_available: bool) -> SlotStatus {
        if self.has_class(NOT_OFFERED_CLASS) {
            SlotStatus::NotOffered
        } else if self.has_class(FREE_CLASS) {
            if is_available {
                SlotStatus::Available
            } else {
                SlotStatus::Unavailable
            }
        } else if self.has_class(BLOCKED_CLASS) {
            SlotStatus::Blocked
        } else {
            SlotStatus::Unknown
        }
    }

    fn reason(&self) -> Option<String> {
        self.title
            .as_deref()
            .and_then(non_empty)
            .or_else(|| self.aria_label.as_deref().and_then(non_empty))
    }

    /// Exact times from `book(<id>,'<...HHMM>','<...HHMM>')`
    fn booked_times(&self) -> Option<(String, String)> {
        if !self.is_bookable() {
            return None;
        }

        let captures = BOOK_CALL.captures(&self.onclick)?;

        Some((hhmm_suffix(&captures[2])?, hhmm_suffix(&captures[3])?))
    }
}

/// Bare `<tr>` fragments are dropped by the HTML5 tree builder outside a table
fn wrap_bare_rows(html: &str) -> String {
    if html.to_ascii_lowercase().contains("<table") {
        html.to_string()
    } else {
        format!("<table>{}</table>", html)
    }
}

fn format_offset(units: u32) -> String {
    let hour = FIRST_HOUR + units / UNITS_PER_HOUR;
    let minute = (units % UNITS_PER_HOUR) * MINUTES_PER_UNIT;

    format!("{:02}:{:02}", hour, minute)
}

fn hhmm_suffix(timestamp: &str) -> Option<String> {
    let digits = timestamp.get(timestamp.len().checked_sub(4)?..)?;

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(format!("{}:{}", &digits[..2], &digits[2..]))
}

fn joined_text<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    pieces
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
