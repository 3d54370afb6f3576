use crate::eva::{EvaFile, HEADER_SECTIONS};

use super::{ValidationCheck, ValidationReport};

/// Relative tolerance for the `[SCAN0]` step, which is printed with 12
/// significant digits
const STEP_TOLERANCE: f64 = 1e-9;

/// Section and field checks; returns the channel count when it is usable
pub(super) fn check_header(file: &EvaFile, report: &mut ValidationReport) -> Option<usize> {
    let missing: Vec<&str> = HEADER_SECTIONS
        .iter()
        .copied()
        .filter(|name| file.header.section(name).is_none())
        .collect();
    if missing.is_empty() {
        let names: Vec<&str> = file.header.sections().iter().map(|s| s.name.as_str()).collect();
        if names.starts_with(&HEADER_SECTIONS) {
            report.add_check(ValidationCheck::ok("Header sections"));
        } else {
            report.add_check(ValidationCheck::warning(
                "Header sections",
                format!("Unexpected section order: {}", names.join(", ")),
            ));
        }
    } else {
        report.add_check(ValidationCheck::failed(
            "Header sections",
            format!("Missing sections: {}", missing.join(", ")),
        ));
    }

    let channels = file.header.channels().filter(|&n| n > 0);
    match channels {
        Some(n) => report.add_check(ValidationCheck::ok(format!("Channel count ({})", n))),
        None => report.add_check(ValidationCheck::failed(
            "Channel count",
            format!(
                "[MCA] Channels is {:?}",
                file.header.get("MCA", "Channels").unwrap_or("missing")
            ),
        )),
    }

    check_scan_step(file, report);
    channels
}

fn check_scan_step(file: &EvaFile, report: &mut ValidationReport) {
    let field = |key: &str| {
        file.header
            .get("SCAN0", key)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };

    let (Some(start), Some(stop), Some(step)) = (field("Start"), field("Stop"), field("Step"))
    else {
        report.add_check(ValidationCheck::warning(
            "Scan step",
            "[SCAN0] Start, Stop or Step is missing or not a finite number",
        ));
        return;
    };
    if file.num_freq_steps <= 0 {
        report.add_check(ValidationCheck::warning(
            "Scan step",
            "No frequency steps to check the step against",
        ));
        return;
    }

    let expected = (stop - start) / f64::from(file.num_freq_steps);
    if (expected - step).abs() <= STEP_TOLERANCE * expected.abs().max(1.0) {
        report.add_check(ValidationCheck::ok("Scan step"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Scan step",
            format!(
                "Step {} differs from (Stop - Start) / {} = {}",
                step, file.num_freq_steps, expected
            ),
        ));
    }
}
