//! Accessibility annotation of provider payloads
//!
//! Hotel results carry machine-readable accessibility signals in two
//! provider-specific shapes; flight offers carry none at all. The extractors
//! here turn each shape into a uniform record that is attached alongside the
//! raw payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Consumer hotel search amenity id meaning "wheelchair accessible".
pub const WHEELCHAIR_AMENITY_ID: i64 = 53;

/// Facility-description keywords treated as accessibility signals.
///
/// Substring matching is deliberately loose and can false-positive, e.g.
/// plain "parking" or "bathroom" descriptions with no accessible variant.
/// Callers should treat a `true` as "worth confirming", not a guarantee.
const ACCESSIBILITY_KEYWORDS: [&str; 7] = [
    "wheelchair",
    "accessible",
    "mobility",
    "elevator",
    "ramp",
    "parking",
    "bathroom",
];

/// Accessibility record attached to each hotel result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelAccessibility {
    pub wheelchair_accessible: bool,
    pub accessible_room_available: bool,
    /// The amenity id inspected, included so callers can re-check raw data
    pub wheelchair_amenity_id: i64,
    /// All facility descriptions for the property (GDS results only)
    pub facility_list: Vec<String>,
}

/// Accessibility record attached to each flight offer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightAccessibility {
    pub wheelchair_available: bool,
    pub wheelchair_stowage: bool,
    pub accessible_lavatory: bool,
    pub extra_legroom_available: bool,
    pub special_service_codes: Vec<String>,
    pub companion_required: bool,
    pub special_meals_available: bool,
    pub notes: String,
}

/// Extract accessibility signals from a consumer hotel property.
///
/// Looks for amenity id 53 in the `amenities` array. Entries that are not
/// objects or lack a numeric `id` are skipped; a missing or empty array
/// yields an all-false record.
#[must_use]
pub fn extract_hotel_accessibility(property: &Value) -> HotelAccessibility {
    let has_wheelchair_amenity = property
        .get("amenities")
        .and_then(Value::as_array)
        .is_some_and(|amenities| {
            amenities.iter().any(|entry| {
                entry
                    .get("id")
                    .and_then(Value::as_i64)
                    .is_some_and(|id| id == WHEELCHAIR_AMENITY_ID)
            })
        });
    HotelAccessibility {
        wheelchair_accessible: has_wheelchair_amenity,
        accessible_room_available: has_wheelchair_amenity,
        wheelchair_amenity_id: WHEELCHAIR_AMENITY_ID,
        facility_list: Vec::new(),
    }
}

/// Extract accessibility signals from a GDS hotel record.
///
/// Facilities come as objects with a `description` or as bare strings; both
/// forms are scanned for accessibility keywords with case-insensitive
/// substring matching. The full description list is preserved so callers can
/// inspect what triggered the match.
#[must_use]
pub fn extract_amadeus_hotel_accessibility(hotel: &Value) -> HotelAccessibility {
    let facility_list: Vec<String> = hotel
        .get("facilities")
        .and_then(Value::as_array)
        .map(|facilities| {
            facilities
                .iter()
                .filter_map(|f| {
                    f.get("description")
                        .and_then(Value::as_str)
                        .or_else(|| f.as_str())
                })
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let has_accessibility_keyword = facility_list.iter().any(|description| {
        let lowered = description.to_lowercase();
        ACCESSIBILITY_KEYWORDS
            .iter()
            .any(|keyword| lowered.contains(keyword))
    });

    HotelAccessibility {
        wheelchair_accessible: has_accessibility_keyword,
        accessible_room_available: has_accessibility_keyword,
        wheelchair_amenity_id: WHEELCHAIR_AMENITY_ID,
        facility_list,
    }
}

/// Build the fixed accessibility record for a GDS flight offer.
///
/// Standard offer payloads carry no cabin accessibility data, so every flag
/// is false and the note directs travelers to the airline's SSR process.
/// The record documents the absence of data rather than inferring it.
#[must_use]
pub fn extract_flight_accessibility(_offer: &Value) -> FlightAccessibility {
    FlightAccessibility {
        wheelchair_available: false,
        wheelchair_stowage: false,
        accessible_lavatory: false,
        extra_legroom_available: false,
        special_service_codes: Vec::new(),
        companion_required: false,
        special_meals_available: false,
        notes: "Check with airline for accessibility accommodations. Request IATA Special \
                Service Request (SSR) codes when booking: WCHR (wheelchair), WCHS (wheelchair \
                with stowage), STCR (stretcher), DEAF, BLND, PRMK (mobility disability)."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_wheelchair_amenity_detected() {
        let property = json!({
            "name": "Accessible Hotel",
            "amenities": [
                { "id": 1, "name": "WiFi" },
                { "id": 53, "name": "Wheelchair accessible" },
                { "id": 5, "name": "Parking" },
            ],
        });
        let accessibility = extract_hotel_accessibility(&property);
        assert!(accessibility.wheelchair_accessible);
        assert!(accessibility.accessible_room_available);
        assert_eq!(accessibility.wheelchair_amenity_id, 53);
    }

    #[test]
    fn test_hotel_without_wheelchair_amenity() {
        let property = json!({
            "name": "Standard Hotel",
            "amenities": [{ "id": 1, "name": "WiFi" }, { "id": 5, "name": "Parking" }],
        });
        let accessibility = extract_hotel_accessibility(&property);
        assert!(!accessibility.wheelchair_accessible);
        assert!(!accessibility.accessible_room_available);
    }

    #[test]
    fn test_hotel_missing_or_empty_amenities() {
        let no_field = extract_hotel_accessibility(&json!({ "name": "Simple Hotel" }));
        assert!(!no_field.wheelchair_accessible);
        assert_eq!(no_field.wheelchair_amenity_id, 53);

        let empty = extract_hotel_accessibility(&json!({ "amenities": [] }));
        assert!(!empty.wheelchair_accessible);
    }

    #[test]
    fn test_malformed_amenity_entries_are_skipped() {
        let property = json!({
            "name": "Malformed Hotel",
            "amenities": ["WiFi", { "id": 53 }, null],
        });
        let accessibility = extract_hotel_accessibility(&property);
        assert!(accessibility.wheelchair_accessible);
    }

    #[test]
    fn test_amadeus_facilities_detected() {
        let hotel = json!({
            "name": "Accessible Hotel",
            "facilities": [
                { "description": "Wheelchair accessible rooms" },
                { "description": "Accessible bathroom with grab bars" },
                { "description": "Elevator" },
                { "description": "Accessible parking" },
            ],
        });
        let accessibility = extract_amadeus_hotel_accessibility(&hotel);
        assert!(accessibility.wheelchair_accessible);
        assert!(accessibility.accessible_room_available);
        assert_eq!(accessibility.facility_list.len(), 4);
    }

    #[test]
    fn test_amadeus_without_accessibility_keywords() {
        let hotel = json!({
            "facilities": [
                { "description": "WiFi" },
                { "description": "Restaurant" },
                { "description": "Gym" },
            ],
        });
        let accessibility = extract_amadeus_hotel_accessibility(&hotel);
        assert!(!accessibility.wheelchair_accessible);
        assert_eq!(accessibility.facility_list.len(), 3);
    }

    #[test]
    fn test_amadeus_bare_string_facilities_are_scanned() {
        let hotel = json!({
            "facilities": [
                "Wheelchair ramp",
                { "description": "Restaurant" },
            ],
        });
        let accessibility = extract_amadeus_hotel_accessibility(&hotel);
        assert_eq!(accessibility.facility_list.len(), 2);
        assert!(accessibility.wheelchair_accessible);
        assert_eq!(accessibility.facility_list[0], "Wheelchair ramp");
    }

    #[test]
    fn test_amadeus_without_facilities() {
        let accessibility = extract_amadeus_hotel_accessibility(&json!({ "name": "Simple" }));
        assert!(!accessibility.wheelchair_accessible);
        assert!(accessibility.facility_list.is_empty());
    }

    #[rstest]
    #[case("wheelchair")]
    #[case("accessible")]
    #[case("mobility")]
    #[case("elevator")]
    #[case("ramp")]
    #[case("parking")]
    #[case("bathroom")]
    fn test_each_keyword_triggers_detection(#[case] keyword: &str) {
        let hotel = json!({
            "facilities": [{ "description": format!("Feature with {keyword} available") }],
        });
        let accessibility = extract_amadeus_hotel_accessibility(&hotel);
        assert!(accessibility.wheelchair_accessible, "keyword: {keyword}");
    }

    #[test]
    fn test_keyword_matching_is_case_insensitive() {
        let hotel = json!({
            "facilities": [
                { "description": "WHEELCHAIR ACCESSIBLE ROOMS" },
                { "description": "Accessible BATHROOM" },
            ],
        });
        assert!(extract_amadeus_hotel_accessibility(&hotel).wheelchair_accessible);
    }

    #[test]
    fn test_flight_record_is_all_false_with_advisory_note() {
        let accessibility = extract_flight_accessibility(&json!({ "id": "1" }));
        assert!(!accessibility.wheelchair_available);
        assert!(!accessibility.wheelchair_stowage);
        assert!(!accessibility.accessible_lavatory);
        assert!(!accessibility.extra_legroom_available);
        assert!(!accessibility.companion_required);
        assert!(!accessibility.special_meals_available);
        assert!(accessibility.special_service_codes.is_empty());
        assert!(accessibility.notes.contains("Check with airline"));
        assert!(accessibility.notes.contains("WCHR"));
    }
}
