//! Common causal factors for well-known KPIs.

const KPI_DRIVERS: &[(&str, &[&str])] = &[
    ("Call Completion Rate", &["Congestion", "Dropped handover", "High user traffic"]),
    ("Drop call rate", &["Weak signal", "Tower issue", "Interference"]),
    ("Block call rate", &["All channels busy", "Call setup delay"]),
];

/// Likely drivers for `kpi` (exact name match); empty when unknown.
pub fn kpi_drivers(kpi: &str) -> &'static [&'static str] {
    KPI_DRIVERS
        .iter()
        .find(|(name, _)| *name == kpi)
        .map(|(_, drivers)| *drivers)
        .unwrap_or(&[])
}
