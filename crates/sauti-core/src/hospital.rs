//! Canonical hospital/clinic records.
//!
//! The backend's place records drift across deployments: addresses arrive
//! under `address` or `vicinity`, distances under `distance_km` or a bare
//! `distance`, and ratings are sometimes the literal string `"N/A"`. This
//! module folds every accepted variant into one display-ready form, once,
//! at the boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Address placeholder when a record carries no usable address.
pub const UNKNOWN_ADDRESS: &str = "-";

/// A hospital or clinic recommendation in canonical form.
///
/// Invariants: `rating`, when present, lies in `[0.0, 5.0]`; a canonical
/// sequence is ordered by `distance_km` ascending with unknown distances
/// last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalRecord {
    /// Facility name. Records without a name cannot be displayed
    /// meaningfully and are dropped during normalization.
    pub name: String,
    /// Street address or vicinity description, `"-"` when unknown.
    pub address: String,
    /// Average user rating in `[0.0, 5.0]`, if known.
    pub rating: Option<f64>,
    /// Number of user ratings behind `rating`.
    pub review_count: u32,
    /// Distance from the query point in kilometers, if known.
    pub distance_km: Option<f64>,
}

/// Maps arbitrary backend place records into canonical [`HospitalRecord`]s.
///
/// Pure: same input, same output; no network or state access. Entries
/// missing a string `name` are dropped. The result is stably sorted by
/// `distance_km` ascending, records with unknown distance last, original
/// relative order preserved among ties.
pub fn normalize(raw_list: &[Value]) -> Vec<HospitalRecord> {
    let mut records: Vec<HospitalRecord> = raw_list.iter().filter_map(normalize_entry).collect();

    // Vec::sort_by is stable, which keeps tie order intact.
    records.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(da), Some(db)) => da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    records
}

fn normalize_entry(raw: &Value) -> Option<HospitalRecord> {
    let name = raw.get("name")?.as_str()?.to_string();

    let address = raw
        .get("address")
        .and_then(Value::as_str)
        .or_else(|| raw.get("vicinity").and_then(Value::as_str))
        .unwrap_or(UNKNOWN_ADDRESS)
        .to_string();

    // Backends substitute "N/A" for missing ratings; anything non-numeric
    // or outside the rating scale resolves to unknown.
    let rating = raw
        .get("rating")
        .and_then(Value::as_f64)
        .filter(|r| (0.0..=5.0).contains(r));

    let review_count = raw
        .get("user_ratings_total")
        .and_then(Value::as_u64)
        .map(|n| n.min(u32::MAX as u64) as u32)
        .unwrap_or(0);

    let distance_km = raw
        .get("distance_km")
        .and_then(Value::as_f64)
        .or_else(|| raw.get("distance").and_then(Value::as_f64));

    Some(HospitalRecord {
        name,
        address,
        rating,
        review_count,
        distance_km,
    })
}
