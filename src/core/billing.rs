use serde::{Deserialize, Serialize};

/// Flat GST rate applied to the base charge, to chargeable services and to
/// parts without a per-line override.
pub const DEFAULT_GST_PERCENT: f64 = 18.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartLine {
    pub price: f64,
    pub qty: i32,
    pub gst_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceLine {
    pub price: f64,
    pub original_price: Option<f64>,
    pub is_chargeable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTotals {
    pub base_charge: f64,
    pub base_charge_gst: f64,
    pub parts_subtotal: f64,
    pub parts_gst: f64,
    pub services_subtotal: f64,
    pub services_gst: f64,
    /// Display-only sum of AMC-covered service value. Free lines already
    /// contribute 0 to the subtotal, so this is never subtracted.
    pub amc_discount: f64,
    pub subtotal: f64,
    pub total_gst: f64,
    pub grand_total: f64,
}

/// One authoritative bill computation. The edit-form preview, the job-card
/// print and the kanban summary all call this against the stored job, so
/// it must be pure: same inputs, same totals, every time. Intermediate
/// sums keep full precision; rounding happens only in [`display_total`].
pub fn compute_job_totals(
    base_charge: f64,
    parts: &[PartLine],
    services: &[ServiceLine],
    default_gst_percent: f64,
) -> JobTotals {
    let mut parts_subtotal = 0.0;
    let mut parts_gst = 0.0;
    for part in parts {
        let amount = part.price * part.qty as f64;
        parts_subtotal += amount;
        // A part with price 0 is a free part; its GST is naturally 0.
        parts_gst += amount * part.gst_percent.unwrap_or(default_gst_percent) / 100.0;
    }

    let mut services_subtotal = 0.0;
    let mut services_gst = 0.0;
    let mut amc_discount = 0.0;
    for service in services {
        if service.is_chargeable {
            services_subtotal += service.price;
            // Services carry no per-line GST override.
            services_gst += service.price * default_gst_percent / 100.0;
        } else {
            amc_discount += service.original_price.unwrap_or(service.price);
        }
    }

    let base_charge_gst = base_charge * default_gst_percent / 100.0;
    let subtotal = base_charge + parts_subtotal + services_subtotal;
    let total_gst = base_charge_gst + parts_gst + services_gst;

    JobTotals {
        base_charge,
        base_charge_gst,
        parts_subtotal,
        parts_gst,
        services_subtotal,
        services_gst,
        amc_discount,
        subtotal,
        total_gst,
        grand_total: subtotal + total_gst,
    }
}

/// Rounds to the nearest whole currency unit. Presentation only.
pub fn display_total(amount: f64) -> i64 {
    amount.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(price: f64, qty: i32, gst: Option<f64>) -> PartLine {
        PartLine {
            price,
            qty,
            gst_percent: gst,
        }
    }

    #[test]
    fn test_standard_job_bill() {
        let parts = vec![part(1000.0, 2, Some(18.0))];
        let services = vec![ServiceLine {
            price: 500.0,
            original_price: None,
            is_chargeable: true,
        }];
        let totals = compute_job_totals(300.0, &parts, &services, DEFAULT_GST_PERCENT);

        assert_eq!(totals.parts_subtotal, 2000.0);
        assert_eq!(totals.parts_gst, 360.0);
        assert_eq!(totals.services_subtotal, 500.0);
        assert_eq!(totals.services_gst, 90.0);
        assert_eq!(totals.base_charge_gst, 54.0);
        assert_eq!(totals.subtotal, 2800.0);
        assert_eq!(totals.total_gst, 504.0);
        assert_eq!(totals.grand_total, 3304.0);
    }

    #[test]
    fn test_amc_covered_service_is_free_but_reported() {
        let parts = vec![part(1000.0, 2, Some(18.0))];
        let services = vec![ServiceLine {
            price: 0.0,
            original_price: Some(500.0),
            is_chargeable: false,
        }];
        let totals = compute_job_totals(300.0, &parts, &services, DEFAULT_GST_PERCENT);

        assert_eq!(totals.services_subtotal, 0.0);
        assert_eq!(totals.services_gst, 0.0);
        assert_eq!(totals.amc_discount, 500.0);
        assert_eq!(totals.grand_total, 2854.0);
    }

    #[test]
    fn test_covered_service_falls_back_to_price() {
        // Older records have no original_price; the list price stands in.
        let services = vec![ServiceLine {
            price: 350.0,
            original_price: None,
            is_chargeable: false,
        }];
        let totals = compute_job_totals(0.0, &[], &services, DEFAULT_GST_PERCENT);
        assert_eq!(totals.amc_discount, 350.0);
        assert_eq!(totals.grand_total, 0.0);
    }

    #[test]
    fn test_free_part_contributes_no_gst() {
        let parts = vec![part(0.0, 3, Some(18.0)), part(250.0, 1, None)];
        let totals = compute_job_totals(0.0, &parts, &[], DEFAULT_GST_PERCENT);
        assert_eq!(totals.parts_subtotal, 250.0);
        assert_eq!(totals.parts_gst, 45.0);
    }

    #[test]
    fn test_part_gst_override_beats_default() {
        let parts = vec![part(100.0, 1, Some(12.0))];
        let totals = compute_job_totals(0.0, &parts, &[], DEFAULT_GST_PERCENT);
        assert_eq!(totals.parts_gst, 12.0);
    }

    #[test]
    fn test_idempotent_and_consistent() {
        let parts = vec![part(999.99, 3, None), part(12.5, 7, Some(5.0))];
        let services = vec![
            ServiceLine {
                price: 450.0,
                original_price: None,
                is_chargeable: true,
            },
            ServiceLine {
                price: 0.0,
                original_price: Some(200.0),
                is_chargeable: false,
            },
        ];
        let first = compute_job_totals(300.0, &parts, &services, DEFAULT_GST_PERCENT);
        let second = compute_job_totals(300.0, &parts, &services, DEFAULT_GST_PERCENT);
        assert_eq!(first, second);
        assert_eq!(first.grand_total, first.subtotal + first.total_gst);
    }

    #[test]
    fn test_display_total_rounding() {
        assert_eq!(display_total(3304.4), 3304);
        assert_eq!(display_total(3304.5), 3305);
    }
}
