use super::*;
use crate::event::Event;

fn cycle_events(counter: u16, tofs: &[f64]) -> Vec<Event> {
    let mut events = vec![Event::GateOpen { cycle: counter }];
    events.extend(tofs.iter().map(|&tof_us| Event::InGateIon {
        cycle: counter,
        tof_us,
    }));
    events.push(Event::GateClose { cycle: counter });
    events
}

fn run(events: &[Event]) -> Result<CycleOutcome, CycleError> {
    CycleProcessor::new(BinningConfig::default()).process(events)
}

#[test]
fn test_well_formed_cycles_are_indexed_in_order() {
    let events: Vec<Event> = (0..25u16)
        .flat_map(|c| cycle_events(c, &[1.0, 2.0]))
        .collect();

    let outcome = run(&events).unwrap();

    assert_eq!(outcome.histograms.len(), 25);
    for (i, histogram) in outcome.histograms.iter().enumerate() {
        assert_eq!(histogram.cycle_index(), i);
        assert_eq!(histogram.total_hits(), 2);
    }
    assert!(!outcome.discarded_trailing_cycle);
}

#[test]
fn test_gate_counter_wraps_at_1024() {
    let events: Vec<Event> = (0..1030usize)
        .flat_map(|i| cycle_events((i % GATE_COUNTER_MODULUS) as u16, &[]))
        .collect();

    let outcome = run(&events).unwrap();
    assert_eq!(outcome.histograms.len(), 1030);
    assert_eq!(outcome.histograms[1029].cycle_index(), 1029);
}

#[test]
fn test_unwrapped_counter_is_a_missing_event() {
    let events: Vec<Event> = [0u16, 0x401]
        .into_iter()
        .flat_map(|counter| cycle_events(counter, &[]))
        .collect();

    let err = run(&events).unwrap_err();
    assert_eq!(err, CycleError::MissingEvent { cycle_index: 1 });
}

#[test]
fn test_missing_gate_open() {
    let events = [Event::GateOpen { cycle: 5 }, Event::GateClose { cycle: 7 }];
    let err = run(&events).unwrap_err();
    assert_eq!(
        err,
        CycleError::GateMismatch {
            fault: GateFault::MissingGateOpen,
            cycle_index: 0,
        }
    );
}

#[test]
fn test_missing_gate_close() {
    let events = [Event::GateOpen { cycle: 7 }, Event::GateClose { cycle: 5 }];
    let err = run(&events).unwrap_err();
    assert_eq!(
        err,
        CycleError::GateMismatch {
            fault: GateFault::MissingGateClose,
            cycle_index: 0,
        }
    );
}

#[test]
fn test_mismatch_reports_current_cycle_index() {
    let mut events = cycle_events(0, &[]);
    events.extend(cycle_events(1, &[]));
    events.push(Event::GateOpen { cycle: 2 });
    events.push(Event::GateClose { cycle: 3 });

    match run(&events).unwrap_err() {
        CycleError::GateMismatch { cycle_index, .. } => assert_eq!(cycle_index, 2),
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_close_without_open_is_missing_gate_open() {
    let mut events = cycle_events(0, &[]);
    events.push(Event::GateClose { cycle: 0 });

    let err = run(&events).unwrap_err();
    assert_eq!(
        err,
        CycleError::GateMismatch {
            fault: GateFault::MissingGateOpen,
            cycle_index: 1,
        }
    );
}

#[test]
fn test_skipped_cycle_is_missing_event() {
    let mut events = cycle_events(0, &[1.0]);
    events.extend(cycle_events(2, &[1.0]));

    let err = run(&events).unwrap_err();
    assert_eq!(err, CycleError::MissingEvent { cycle_index: 1 });
}

#[test]
fn test_first_gate_counter_offset() {
    let events: Vec<Event> = (1..=3u16).flat_map(|c| cycle_events(c, &[])).collect();

    assert!(matches!(
        run(&events),
        Err(CycleError::MissingEvent { cycle_index: 0 })
    ));

    let config = BinningConfig::default().with_first_gate_counter(1);
    let outcome = CycleProcessor::new(config).process(&events).unwrap();
    assert_eq!(outcome.histograms.len(), 3);
}

#[test]
fn test_binning_and_tof_limit() {
    let events = cycle_events(0, &[0.05, 0.15, 99.99, 150.0]);
    let outcome = run(&events).unwrap();

    let histogram = &outcome.histograms[0];
    let channels: Vec<u16> = histogram.iter().map(|(channel, _)| channel).collect();
    assert_eq!(channels, vec![0, 1, 999]);
    assert_eq!(histogram.total_hits(), 3);
    assert_eq!(outcome.dropped_samples, 1);
}

#[test]
fn test_timestamps_are_binned_and_out_of_gate_ions_ignored() {
    let events = [
        Event::GateOpen { cycle: 0 },
        Event::Timestamp { cycle: 0, tof_us: 0.25 },
        Event::OutOfGateIon { cycle: 0, tof_us: 0.25 },
        Event::InGateIon { cycle: 0, tof_us: 0.26 },
        Event::GateClose { cycle: 0 },
    ];

    let outcome = run(&events).unwrap();
    assert_eq!(outcome.histograms[0].count(2), 2);
    assert_eq!(outcome.histograms[0].occupancy(), 1);
}

#[test]
fn test_pre_gate_noise_is_ignored() {
    let mut events = vec![
        Event::InGateIon { cycle: 0, tof_us: 5.0 },
        Event::Timestamp { cycle: 0, tof_us: 5.0 },
    ];
    events.extend(cycle_events(0, &[1.0]));

    let outcome = run(&events).unwrap();
    assert_eq!(outcome.pre_gate_events, 2);
    assert_eq!(outcome.histograms[0].total_hits(), 1);
}

#[test]
fn test_unterminated_trailing_cycle_is_discarded() {
    let mut events = cycle_events(0, &[1.0]);
    events.push(Event::GateOpen { cycle: 1 });
    events.push(Event::InGateIon { cycle: 1, tof_us: 3.0 });

    let outcome = run(&events).unwrap();
    assert_eq!(outcome.histograms.len(), 1);
    assert!(outcome.discarded_trailing_cycle);
}

#[test]
fn test_step_threads_state() {
    let processor = CycleProcessor::default();
    let state = CycleState::new();

    let (state, done) = processor.step(state, &Event::GateOpen { cycle: 0 }).unwrap();
    assert!(done.is_none());
    assert!(matches!(state.gate(), GateState::InGate { open_counter: 0, .. }));

    let (state, done) = processor
        .step(state, &Event::InGateIon { cycle: 0, tof_us: 0.42 })
        .unwrap();
    assert!(done.is_none());

    let (state, done) = processor.step(state, &Event::GateClose { cycle: 0 }).unwrap();
    let histogram = done.unwrap();
    assert_eq!(histogram.count(4), 1);
    assert_eq!(state.next_cycle_index(), 1);
    assert_eq!(state.gate(), &GateState::AwaitingGate);
}

#[test]
fn test_binning_config_validation() {
    let config = BinningConfig::new(0.1, 100.0).unwrap();
    assert_eq!(config.num_channels(), 1000);

    let config = BinningConfig::new(0.5, 20.0).unwrap();
    assert_eq!(config.num_channels(), 40);
    assert_eq!(config.channel_for(19.99), Some(39));
    assert_eq!(config.channel_for(20.0), None);
    assert_eq!(config.channel_for(-1.0), None);

    assert!(BinningConfig::new(0.0, 100.0).is_err());
    assert!(BinningConfig::new(0.1, f64::NAN).is_err());
    assert!(matches!(
        BinningConfig::new(0.001, 100.0),
        Err(BinningError::TooManyChannels(_))
    ));
}

#[test]
fn test_histogram_from_hits() {
    let histogram = CycleHistogram::from_hits(3, [7u16, 2, 7, 7]);
    assert_eq!(histogram.cycle_index(), 3);
    assert_eq!(histogram.occupancy(), 2);
    assert_eq!(histogram.count(7), 3);
    assert_eq!(histogram.max_channel(), Some(7));
}
