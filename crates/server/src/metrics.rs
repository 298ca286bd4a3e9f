use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static BOOKINGS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("booking_created_total", "Bookings created through the API").expect("register booking_created_total")
});

pub static BOOKINGS_CANCELLED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("booking_cancelled_total", "Bookings cancelled through the API").expect("register booking_cancelled_total")
});

pub static SLOT_CONFLICTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("booking_slot_conflicts_total", "Booking attempts rejected because the slot was unavailable")
        .expect("register booking_slot_conflicts_total")
});

pub static EXPORTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!("admin_exports_total", "CSV exports served", &["kind"]).expect("register admin_exports_total")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (axum::http::StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (axum::http::StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_text_output() {
        BOOKINGS_CREATED_TOTAL.inc();
        EXPORTS_TOTAL.with_label_values(&["clients"]).inc();
        let (status, body) = encode_metrics();
        assert_eq!(status, axum::http::StatusCode::OK);
        assert!(body.contains("booking_created_total"));
        assert!(body.contains("admin_exports_total{kind=\"clients\"}"));
    }
}
