//! Markdown rendering of flight and hotel offers.
//!
//! Pure functions: every row whose source field is absent is left out, and an
//! absent or empty offer list renders an explicit "no results" line.

use crate::models::{Airport, FlightOffer, HotelOffer};

pub const FLIGHTS_HEADING: &str = "## ✈️ Flights";
pub const HOTELS_HEADING: &str = "## 🏨 Hotels";
pub const NO_FLIGHTS: &str = "No flight information available.";
pub const NO_HOTELS: &str = "No hotel information available.";
pub const UNNAMED_FLIGHT: &str = "Flight";
pub const UNNAMED_HOTEL: &str = "Hotel";

const TABLE_HEADER: &str = "| Item | Details |\n|------|---------|\n";
const SEPARATOR: &str = "---\n\n";

pub fn format_flights(offers: Option<&[FlightOffer]>) -> String {
    let mut out = format!("{FLIGHTS_HEADING}\n\n");
    let offers = match offers {
        Some(offers) if !offers.is_empty() => offers,
        _ => {
            out.push_str(NO_FLIGHTS);
            out.push('\n');
            return out;
        }
    };

    for (index, flight) in offers.iter().enumerate() {
        let title = match (text(&flight.airline), present(&flight.flight_number)) {
            (Some(airline), Some(number)) => format!("{airline} {number}"),
            (Some(airline), None) => airline.to_string(),
            (None, Some(number)) => number.to_string(),
            (None, None) => UNNAMED_FLIGHT.to_string(),
        };
        out.push_str(&format!("### {}. {title}\n\n", index + 1));
        out.push_str(TABLE_HEADER);

        if let Some(airport) = &flight.departure_airport {
            if let Some(label) = airport_label(airport) {
                push_row(&mut out, "🛫 **Departure**", &label);
            }
            if let Some(time) = present(&airport.time) {
                push_row(&mut out, "🕐 **Departure time**", time);
            }
        }
        if let Some(airport) = &flight.arrival_airport {
            if let Some(label) = airport_label(airport) {
                push_row(&mut out, "🛬 **Arrival**", &label);
            }
            if let Some(time) = present(&airport.time) {
                push_row(&mut out, "🕐 **Arrival time**", time);
            }
        }
        if let Some(minutes) = flight.duration {
            push_row(&mut out, "⏱️ **Duration**", &format_duration(minutes));
        }
        if let Some(airplane) = present(&flight.airplane) {
            push_row(&mut out, "✈️ **Aircraft**", airplane);
        }
        if let Some(class) = present(&flight.travel_class) {
            push_row(&mut out, "💺 **Class**", class);
        }
        if let Some(price) = flight.price {
            push_row(&mut out, "💰 **Price**", &format!("**NT$ {}**", format_price(price)));
        }
        out.push('\n');
        out.push_str(SEPARATOR);
    }
    out
}

pub fn format_hotels(offers: Option<&[HotelOffer]>) -> String {
    let mut out = format!("{HOTELS_HEADING}\n\n");
    let offers = match offers {
        Some(offers) if !offers.is_empty() => offers,
        _ => {
            out.push_str(NO_HOTELS);
            out.push('\n');
            return out;
        }
    };

    for (index, hotel) in offers.iter().enumerate() {
        let name = text(&hotel.name).unwrap_or(UNNAMED_HOTEL);
        out.push_str(&format!("### {}. {name}\n\n", index + 1));
        out.push_str(TABLE_HEADER);

        if let Some(class) = present(&hotel.hotel_class) {
            push_row(&mut out, "⭐ **Class**", class);
        }
        if let Some(lowest) = hotel.rate_per_night.as_ref().and_then(|r| present(&r.lowest)) {
            push_row(&mut out, "💰 **Price**", &format!("**{lowest}** / night"));
        }
        let rating = hotel.overall_rating.filter(|r| *r > 0.0);
        let reviews = hotel.reviews.filter(|n| *n > 0);
        if let (Some(rating), Some(reviews)) = (rating, reviews) {
            push_row(
                &mut out,
                "📊 **Rating**",
                &format!("{rating:.1}/5.0 ({reviews} reviews)"),
            );
        }
        if let Some(landmark) = walkable_landmark(hotel) {
            push_row(&mut out, "📍 **Nearby**", &landmark);
        }
        out.push('\n');
        out.push_str(SEPARATOR);
    }
    out
}

/// "Hh Mm" from a duration in minutes.
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Thousands-grouped price with at most two decimals, trailing zeros dropped.
pub fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    let whole = group_thousands(cents / 100);
    match cents % 100 {
        0 => format!("{sign}{whole}"),
        frac if frac % 10 == 0 => format!("{sign}{whole}.{}", frac / 10),
        frac => format!("{sign}{whole}.{frac:02}"),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn airport_label(airport: &Airport) -> Option<String> {
    match (text(&airport.name), text(&airport.id)) {
        (Some(name), Some(id)) => Some(format!("{name} ({id})")),
        (Some(name), None) => Some(name.to_string()),
        (None, Some(id)) => Some(id.to_string()),
        (None, None) => None,
    }
}

/// Non-blank text, trimmed.
fn text(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|s| !s.is_empty())
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().and_then(text)
}

/// First nearby place that lists a walking route.
fn walkable_landmark(hotel: &HotelOffer) -> Option<String> {
    hotel.nearby_places.iter().find_map(|place| {
        let name = text(&place.name)?;
        let walk = place.transportations.iter().find(|t| t.is_walking())?;
        Some(match present(&walk.duration) {
            Some(duration) => format!("{name} ({duration} walk)"),
            None => format!("{name} (walkable)"),
        })
    })
}

fn push_row(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!("| {label} | {value} |\n"));
}
