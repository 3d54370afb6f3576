use byteorder::{ByteOrder, LittleEndian};

use crate::eva::{EvaFile, HEADER_TERMINATOR};

use super::{ValidationCheck, ValidationReport};

/// Offsets and record framing; returns the parsed file when it frames
pub(super) fn check_structure(bytes: &[u8], report: &mut ValidationReport) -> Option<EvaFile> {
    if bytes.len() < 8 {
        report.add_check(ValidationCheck::failed(
            "File size",
            format!("{} bytes is too short for the two leading offsets", bytes.len()),
        ));
        return None;
    }
    report.add_check(ValidationCheck::ok("File size"));

    let header_length = LittleEndian::read_i32(&bytes[0..4]);
    let header_end = usize::try_from(header_length)
        .ok()
        .filter(|&len| len > 0)
        .map(|len| len + 8)
        .filter(|&end| end <= bytes.len());
    let Some(header_end) = header_end else {
        report.add_check(ValidationCheck::failed(
            "Header length offset",
            format!(
                "Header length {} does not fit in a {}-byte file",
                header_length,
                bytes.len()
            ),
        ));
        return None;
    };
    report.add_check(ValidationCheck::ok("Header length offset"));

    if bytes[8..header_end].ends_with(HEADER_TERMINATOR.as_bytes()) {
        report.add_check(ValidationCheck::ok("Header terminator"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Header terminator",
            "Header text does not end with the binary-part marker",
        ));
    }

    let data_start = LittleEndian::read_i32(&bytes[4..8]);
    let in_range = usize::try_from(data_start)
        .is_ok_and(|start| start >= header_end && start <= bytes.len());
    if !in_range {
        report.add_check(ValidationCheck::failed(
            "Data start offset",
            format!(
                "Data start {} lies outside {}..={}",
                data_start,
                header_end,
                bytes.len()
            ),
        ));
        return None;
    }

    let file = match EvaFile::parse(bytes) {
        Ok(file) => file,
        Err(e) => {
            report.add_check(ValidationCheck::failed("Record stream", e.to_string()));
            return None;
        }
    };

    if file.frequency_table_end == file.data_start as usize {
        report.add_check(ValidationCheck::ok("Data start offset"));
    } else {
        report.add_check(ValidationCheck::warning(
            "Data start offset",
            format!(
                "Records start at byte {} but the frequency table ends at byte {}",
                file.data_start, file.frequency_table_end
            ),
        ));
    }
    report.add_check(ValidationCheck::ok(format!(
        "Record stream ({} records)",
        file.records.len()
    )));

    Some(file)
}
