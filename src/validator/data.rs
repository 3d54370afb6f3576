use crate::eva::{EvaFile, RecordLayout, FREQUENCY_SENTINEL_COUNT, FREQUENCY_SENTINEL_VALUE};

use super::{ValidationCheck, ValidationReport};

/// Frequency table contents and the trailing sentinel pair
pub(super) fn check_frequency_table(file: &EvaFile, report: &mut ValidationReport) {
    if file.frequencies.is_empty() {
        report.add_check(ValidationCheck::warning(
            "Frequency table",
            "The table holds no frequencies",
        ));
    } else if let Some(i) = file.frequencies.iter().position(|f| !f.is_finite()) {
        report.add_check(ValidationCheck::failed(
            "Frequency table",
            format!("Frequency {} is {}", i, file.frequencies[i]),
        ));
    } else {
        report.add_check(ValidationCheck::ok(format!(
            "Frequency table ({} frequencies)",
            file.frequencies.len()
        )));
    }

    if file.sentinel_count == FREQUENCY_SENTINEL_COUNT
        && file.sentinel_value == FREQUENCY_SENTINEL_VALUE
    {
        report.add_check(ValidationCheck::ok("Frequency sentinels"));
    } else {
        report.add_check(ValidationCheck::failed(
            "Frequency sentinels",
            format!(
                "Expected ({}, {}) after the table, found ({}, {})",
                FREQUENCY_SENTINEL_COUNT,
                FREQUENCY_SENTINEL_VALUE,
                file.sentinel_count,
                file.sentinel_value
            ),
        ));
    }
}

/// Per-record bin ranges, counts, layout choice and timestamp order
pub(super) fn check_records(file: &EvaFile, channels: Option<usize>, report: &mut ValidationReport) {
    if file.records.is_empty() {
        report.add_check(ValidationCheck::warning("Records", "The file holds no cycle records"));
        return;
    }

    if let Some(channels) = channels {
        let out_of_range = file.records.iter().enumerate().find_map(|(i, record)| {
            record
                .bins
                .iter()
                .find(|&&(bin, _)| usize::from(bin) >= channels)
                .map(|&(bin, _)| (i, bin))
        });
        match out_of_range {
            None => report.add_check(ValidationCheck::ok("Bin range")),
            Some((i, bin)) => report.add_check(ValidationCheck::failed(
                "Bin range",
                format!("Record {} has bin {} beyond {} channels", i, bin, channels),
            )),
        }

        let unexpected_layout = file
            .records
            .iter()
            .filter(|r| r.layout != RecordLayout::choose(channels, r.occupancy()))
            .count();
        if unexpected_layout == 0 {
            report.add_check(ValidationCheck::ok("Record layout"));
        } else {
            report.add_check(ValidationCheck::warning(
                "Record layout",
                format!(
                    "{} records do not use the layout their occupancy selects",
                    unexpected_layout
                ),
            ));
        }
    }

    let negative = file
        .records
        .iter()
        .position(|r| r.bins.iter().any(|&(_, count)| count < 0));
    match negative {
        None => report.add_check(ValidationCheck::ok("Bin counts")),
        Some(i) => report.add_check(ValidationCheck::failed(
            "Bin counts",
            format!("Record {} holds a negative count", i),
        )),
    }

    let backwards = file
        .records
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp);
    match backwards {
        None => report.add_check(ValidationCheck::ok("Timestamps")),
        Some(i) => report.add_check(ValidationCheck::failed(
            "Timestamps",
            format!(
                "Record {} at {} precedes record {} at {}",
                i + 1,
                file.records[i + 1].timestamp,
                i,
                file.records[i].timestamp
            ),
        )),
    }
}
