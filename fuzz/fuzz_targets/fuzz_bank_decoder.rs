#![no_main]

use libfuzzer_sys::fuzz_target;
use midas2eva::cycle::{BinningConfig, CycleProcessor};
use midas2eva::event::EventDecoder;
use midas2eva::mdump::CaptureBanks;

fuzz_target!(|data: &[u8]| {
    // Captures are text, but mdump output can hold anything
    let text = String::from_utf8_lossy(data);

    // Extraction, decoding and cycle checks may reject the input, but must
    // never panic
    let Ok(banks) = CaptureBanks::from_capture(&text) else {
        return;
    };
    let Ok(decoded) = EventDecoder::new().decode(&banks.events) else {
        return;
    };
    let _ = CycleProcessor::new(BinningConfig::default()).process(decoded.iter());
});
