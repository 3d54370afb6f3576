#![no_main]

use libfuzzer_sys::fuzz_target;
use midas2eva::eva::EvaFile;
use midas2eva::validator::validate_eva_bytes;

fuzz_target!(|data: &[u8]| {
    let _ = EvaFile::parse(data);
    let _ = validate_eva_bytes("fuzz", data);
});
