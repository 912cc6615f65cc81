use crate::facility::{Facility, FacilityKind};
use std::fmt::Write;

const UNKNOWN_UPDATE_TIME: &str = "inconnue";

/// Popup markup for a facility. Upstream text is escaped.
pub fn popup_for(facility: &Facility) -> String {
    match facility.kind {
        FacilityKind::Station => station_popup(facility),
        FacilityKind::Parking => parking_popup(facility),
    }
}

fn station_popup(facility: &Facility) -> String {
    let updated = facility.last_modified.map_or_else(
        || UNKNOWN_UPDATE_TIME.to_string(),
        |ts| ts.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
    );
    let status_class = if facility.state.is_in_service() {
        "active"
    } else {
        "inactive"
    };

    let mut out = String::new();
    let _ = write!(
        out,
        "<div class=\"custom-popup\"><h3>{}</h3>",
        escape_html(&facility.name)
    );
    if let Some(address) = &facility.address {
        let _ = write!(out, "<p class=\"address\">{}</p>", escape_html(address));
    }
    out.push_str("<div class=\"stats\">");
    let _ = write!(
        out,
        "<div class=\"stat-item\"><span class=\"stat-value\">{}</span><span class=\"stat-label\">Vélos</span></div>",
        facility.available_units
    );
    if let Some(slots) = facility.available_slots {
        let _ = write!(
            out,
            "<div class=\"stat-item\"><span class=\"stat-value\">{slots}</span><span class=\"stat-label\">Places</span></div>"
        );
    }
    let _ = write!(
        out,
        "</div><div class=\"status {status_class}\">{}</div><div class=\"update-time\">Mise à jour : {updated}</div></div>",
        escape_html(facility.state.label())
    );
    out
}

fn parking_popup(facility: &Facility) -> String {
    format!(
        "<b>{}</b><br>Places disponibles: {}",
        escape_html(&facility.name),
        facility.available_units
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::{OperationalState, RawPosition};
    use crate::geo::SourceCrs;
    use chrono::{TimeZone, Utc};

    fn station() -> Facility {
        Facility {
            id: "RIHOUR".to_string(),
            name: "RIHOUR <centre>".to_string(),
            address: Some("PLACE RIHOUR".to_string()),
            kind: FacilityKind::Station,
            raw_position: RawPosition { x: 3.06, y: 50.63, crs: SourceCrs::Wgs84 },
            available_units: 7,
            available_slots: Some(13),
            state: OperationalState::InService,
            last_modified: Utc.with_ymd_and_hms(2024, 11, 5, 9, 12, 44).single(),
        }
    }

    #[test]
    fn station_popup_lists_counters_and_update_time() {
        let popup = popup_for(&station());
        assert!(popup.contains("RIHOUR &lt;centre&gt;"));
        assert!(popup.contains("PLACE RIHOUR"));
        assert!(popup.contains(">7<"));
        assert!(popup.contains(">13<"));
        assert!(popup.contains("status active"));
        assert!(popup.contains("Tue, 05 Nov 2024 09:12:44 GMT"));
    }

    #[test]
    fn out_of_service_station_shows_upstream_label() {
        let mut facility = station();
        facility.state = OperationalState::OutOfService("HORS SERVICE".to_string());
        facility.last_modified = None;

        let popup = popup_for(&facility);
        assert!(popup.contains("status inactive"));
        assert!(popup.contains("HORS SERVICE"));
        assert!(popup.contains(UNKNOWN_UPDATE_TIME));
    }

    #[test]
    fn parking_popup_shows_free_places() {
        let mut facility = station();
        facility.kind = FacilityKind::Parking;
        facility.name = "Euralille".to_string();
        facility.available_units = 412;

        assert_eq!(popup_for(&facility), "<b>Euralille</b><br>Places disponibles: 412");
    }
}
