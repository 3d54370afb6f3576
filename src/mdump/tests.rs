use super::*;

const CAPTURE: &str = "\
-------- Event# 1 ------------------------
Evid:0001- Mask:0000- Serial:1- Time:0x525eb800- Dsize:48/0x30
#banks:2 - Bank list:-MPETMCPP-

Bank:MPET Length: 16(I*1)/4(I*4)/4(Type) Type:Unsigned Integer*4
   1-> 0x80010000 0x00000000 0x20010000 0x00001f40
Bank:MCPP Length: 8(I*1)/2(I*4)/2(Type) Type:Unsigned Integer*4
   1-> 0x00001a2b 0x000000ff
-------- Event# 2 ------------------------
Bank:MPET Length: 8(I*1)/2(I*4)/2(Type) Type:Unsigned Integer*4
   1-> 0x10010000 0x00000000
";

#[test]
fn test_extract_event_bank_words_in_order() {
    let words = extract_bank(EVENT_BANK, CAPTURE).unwrap();
    assert_eq!(
        words,
        vec![
            "0x80010000",
            "0x00000000",
            "0x20010000",
            "0x00001f40",
            "0x10010000",
            "0x00000000",
        ]
    );
}

#[test]
fn test_extract_position_bank() {
    let words = extract_bank(POSITION_BANK, CAPTURE).unwrap();
    assert_eq!(words, vec!["0x00001a2b", "0x000000ff"]);
}

#[test]
fn test_absent_marker_yields_no_words() {
    let words = extract_bank("Bank:NONE", CAPTURE).unwrap();
    assert!(words.is_empty());
}

#[test]
fn test_length_limits_word_count() {
    let text = "Bank:MPET Length: 8(I*1)\n 1-> 0x80010000 0x00000000 0x20010000 0x00001f40\n";
    let words = extract_bank(EVENT_BANK, text).unwrap();
    assert_eq!(words.len(), 2);
}

#[test]
fn test_malformed_banks() {
    let no_length = "Bank:MPET Size: 8\n 0x80010000 0x00000000\n";
    assert!(matches!(
        extract_bank(EVENT_BANK, no_length),
        Err(BankError::MalformedBank { offset: 0, .. })
    ));

    let bad_length = "Bank:MPET Length: eight(I*1)\n 0x80010000 0x00000000\n";
    assert!(matches!(
        extract_bank(EVENT_BANK, bad_length),
        Err(BankError::MalformedBank { .. })
    ));

    let short = "Bank:MPET Length: 16(I*1)\n 0x80010000 0x00000000\n";
    assert!(matches!(
        extract_bank(EVENT_BANK, short),
        Err(BankError::MalformedBank { .. })
    ));

    let truncated = "Bank:MPET Length: 8(I*1)\n 0x80010000 0x0000";
    assert!(matches!(
        extract_bank(EVENT_BANK, truncated),
        Err(BankError::MalformedBank { .. })
    ));
}

#[test]
fn test_capture_banks() {
    let banks = CaptureBanks::from_capture(CAPTURE).unwrap();
    assert_eq!(banks.events.len(), 6);
    assert_eq!(banks.positions.len(), 2);
}

#[test]
fn test_capture_spawn_failure() {
    let capture = MdumpCapture::new("midas2eva-no-such-mdump-binary");
    assert!(matches!(
        capture.run("run.mid"),
        Err(BankError::Capture { .. })
    ));
}

#[test]
fn test_read_saved_capture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.txt");
    std::fs::write(&path, CAPTURE).unwrap();

    let text = MdumpCapture::read_saved(&path).unwrap();
    assert_eq!(extract_bank(EVENT_BANK, &text).unwrap().len(), 6);
}
