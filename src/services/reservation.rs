use std::cmp::Ordering;

use crate::models::Reservation;

/// Keeps the reservations that belong to `client_id` and carry the confirmed status code.
pub fn confirmed_for_client(
    reservations: Vec<Reservation>,
    client_id: &str,
    confirmed_status: &str,
) -> Vec<Reservation> {
    reservations
        .into_iter()
        .filter(|r| r.client_id == client_id && r.is_confirmed(confirmed_status))
        .collect()
}

/// Property name of the reservation with the latest start date.
///
/// Equal start dates are broken by reservation id and the greater id wins.
/// Numeric ids compare as numbers and sort below every non-numeric id, which
/// compare lexicographically.
/// Reservations with a blank property name are ignored.
pub fn resolve_active_property(reservations: &[Reservation]) -> Option<String> {
    reservations
        .iter()
        .filter(|r| !r.property_name.trim().is_empty())
        .max_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| compare_ids(&a.id, &b.id))
        })
        .map(|r| r.property_name.trim().to_string())
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    id_key(a).cmp(&id_key(b))
}

fn id_key(id: &str) -> (bool, Option<u64>, &str) {
    let numeric = id.parse::<u64>().ok();
    (numeric.is_none(), numeric, id)
}
