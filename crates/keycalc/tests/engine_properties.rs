//! Property-based tests for the calculator engine
//!
//! Random keypad sequences must never break the register invariants, and
//! failing operations must never change state.

use keycalc::prelude::*;
use proptest::prelude::*;

// ===== Strategy definitions =====

fn digit_strategy() -> impl Strategy<Value = u8> {
    0u8..=9u8
}

fn operator_strategy() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::Add),
        Just(Operator::Subtract),
        Just(Operator::Multiply),
        Just(Operator::Divide),
        Just(Operator::Power),
    ]
}

fn keypad_action_strategy() -> impl Strategy<Value = KeypadAction> {
    prop_oneof![
        4 => digit_strategy().prop_map(KeypadAction::Digit),
        1 => Just(KeypadAction::Decimal),
        2 => operator_strategy().prop_map(KeypadAction::Operator),
        2 => Just(KeypadAction::Equals),
        1 => Just(KeypadAction::Clear),
        1 => Just(KeypadAction::AllClear),
        1 => Just(KeypadAction::Backspace),
        1 => Just(KeypadAction::Percent),
        1 => Just(KeypadAction::Negate),
        1 => Just(KeypadAction::Sqrt),
    ]
}

fn mode_strategy() -> impl Strategy<Value = DisplayMode> {
    prop_oneof![3 => Just(DisplayMode::Normal), 1 => Just(DisplayMode::Override)]
}

fn run(engine: &mut CalculatorEngine, actions: &[(KeypadAction, DisplayMode)]) {
    for (action, mode) in actions {
        let _ = action.apply(engine, *mode);
    }
}

// ===== Register invariants =====

proptest! {
    /// The display is never empty and is numeric, NaN or the override token
    #[test]
    fn prop_current_is_always_displayable(
        actions in prop::collection::vec((keypad_action_strategy(), mode_strategy()), 0..60)
    ) {
        let mut engine = CalculatorEngine::new();
        for (action, mode) in &actions {
            let _ = action.apply(&mut engine, *mode);
            let current = engine.current();
            prop_assert!(!current.is_empty());
            prop_assert!(
                parse_number(current).is_some()
                    || current == "NaN"
                    || current == engine.config().override_token,
                "unexpected display text {:?}", current
            );
        }
    }

    /// Operand and operator are set together, and the expression is empty
    /// exactly when nothing is pending
    #[test]
    fn prop_pending_operation_consistent(
        actions in prop::collection::vec((keypad_action_strategy(), mode_strategy()), 0..60)
    ) {
        let mut engine = CalculatorEngine::new();
        for (action, mode) in &actions {
            let _ = action.apply(&mut engine, *mode);
            prop_assert_eq!(engine.operand().is_some(), engine.operator().is_some());
            prop_assert_eq!(engine.expression().is_empty(), engine.operator().is_none());
        }
    }

    /// History never exceeds its capacity
    #[test]
    fn prop_history_bounded(
        capacity in 0usize..6,
        actions in prop::collection::vec((keypad_action_strategy(), mode_strategy()), 0..80)
    ) {
        let config = EngineConfig::new().with_history_capacity(capacity);
        let mut engine = CalculatorEngine::with_config(config);
        for (action, mode) in &actions {
            let _ = action.apply(&mut engine, *mode);
            prop_assert!(engine.history().len() <= capacity);
        }
    }

    /// A failing action leaves registers and history untouched
    #[test]
    fn prop_errors_leave_state_unchanged(
        actions in prop::collection::vec((keypad_action_strategy(), mode_strategy()), 0..60)
    ) {
        let mut engine = CalculatorEngine::new();
        for (action, mode) in &actions {
            // Debug text compares NaN results as equal
            let before = format!("{:?}", engine.snapshot());
            if action.apply(&mut engine, *mode).is_err() {
                prop_assert_eq!(format!("{:?}", engine.snapshot()), before);
            }
        }
    }

    /// All clear always restores the initial registers and keeps history
    #[test]
    fn prop_all_clear_resets(
        actions in prop::collection::vec((keypad_action_strategy(), mode_strategy()), 0..40)
    ) {
        let mut engine = CalculatorEngine::new();
        run(&mut engine, &actions);
        let history_len = engine.history().len();

        engine.all_clear();
        prop_assert_eq!(engine.current(), "0");
        prop_assert_eq!(engine.operand(), None);
        prop_assert_eq!(engine.operator(), None);
        prop_assert_eq!(engine.expression(), "");
        prop_assert!(!engine.is_waiting_for_operand());
        prop_assert_eq!(engine.history().len(), history_len);
    }

    /// Snapshot and restore reproduce the same engine state
    #[test]
    fn prop_snapshot_restore_preserves_state(
        actions in prop::collection::vec((keypad_action_strategy(), mode_strategy()), 0..40)
    ) {
        let mut engine = CalculatorEngine::new();
        run(&mut engine, &actions);

        let snapshot = engine.snapshot();
        let restored = CalculatorEngine::restore(snapshot.clone(), EngineConfig::default()).unwrap();
        prop_assert_eq!(format!("{:?}", restored.snapshot()), format!("{snapshot:?}"));
    }

    /// Snapshots survive a JSON round trip, overflowed values included
    #[test]
    fn prop_snapshot_json_round_trip(
        actions in prop::collection::vec((keypad_action_strategy(), mode_strategy()), 0..40),
        overflow in any::<bool>(),
    ) {
        let mut engine = CalculatorEngine::new();
        if overflow {
            for action in KeypadAction::parse_line("10 ^ 400 = +").unwrap() {
                action.apply(&mut engine, DisplayMode::Normal).unwrap();
            }
        }
        run(&mut engine, &actions);

        let snapshot = engine.snapshot();
        let json = snapshot.to_json().unwrap();
        prop_assert!(!json.contains("null"));

        let parsed = Snapshot::from_json(&json).unwrap();
        prop_assert_eq!(format!("{parsed:?}"), format!("{snapshot:?}"));
        let restored = CalculatorEngine::restore(parsed, EngineConfig::default()).unwrap();
        prop_assert_eq!(format!("{:?}", restored.snapshot()), format!("{snapshot:?}"));
    }
}

// ===== Arithmetic properties =====

proptest! {
    /// Digit entry concatenates and parses back to the typed number
    #[test]
    fn prop_digit_sequence_parses(digits in prop::collection::vec(digit_strategy(), 1..12)) {
        let mut engine = CalculatorEngine::new();
        for d in &digits {
            engine.input_digit(*d);
        }
        let typed: String = digits.iter().map(u8::to_string).collect();
        let expected: f64 = typed.parse().unwrap();
        prop_assert_eq!(parse_number(engine.current()), Some(expected));
        prop_assert!(!engine.current().starts_with('0') || engine.current() == "0");
    }

    /// `a op b =` records `"a sym b"` with the operator's result
    #[test]
    fn prop_evaluate_records_expression(
        a in 0u32..10_000,
        b in 1u32..10_000,
        op in operator_strategy(),
    ) {
        prop_assume!(op != Operator::Power);
        let mut engine = CalculatorEngine::new();
        let line = format!("{a} {} {b} =", op.token());
        for action in KeypadAction::parse_line(&line).unwrap() {
            action.apply(&mut engine, DisplayMode::Normal).unwrap();
        }

        let expected = op.apply(f64::from(a), f64::from(b)).unwrap();
        let entry = engine.history().latest().unwrap();
        prop_assert_eq!(&entry.expression, &format!("{a} {} {b}", op.symbol()));
        prop_assert_eq!(entry.result, expected);
        prop_assert_eq!(engine.current(), format_number(expected));
    }

    /// Replaying the latest entry reproduces its result
    #[test]
    fn prop_replay_reproduces_result(
        a in 0u32..1_000,
        b in 1u32..1_000,
        op in operator_strategy(),
    ) {
        let mut engine = CalculatorEngine::new();
        let line = format!("{a} {} {b} = AC", op.token());
        for action in KeypadAction::parse_line(&line).unwrap() {
            action.apply(&mut engine, DisplayMode::Normal).unwrap();
        }
        let entry = engine.history().latest().unwrap().clone();

        let value = engine.replay(&entry).unwrap();
        prop_assert_eq!(value.to_string(), format_number(entry.result));
        prop_assert_eq!(engine.history().len(), 2);
        prop_assert_eq!(&engine.history().latest().unwrap().expression, &entry.expression);
    }

    /// Text-only entries replay the same way as structured ones
    #[test]
    fn prop_text_replay_matches_structured(
        a in 0u32..1_000,
        b in 1u32..1_000,
        op in operator_strategy(),
    ) {
        let mut engine = CalculatorEngine::new();
        let expression = format!("{a} {} {b}", op.symbol());
        let entry = HistoryEntry::with_timestamp(expression.clone(), 0.0, 0);

        let value = engine.replay(&entry).unwrap();
        let expected = op.apply(f64::from(a), f64::from(b)).unwrap();
        prop_assert_eq!(value, DisplayValue::Number(expected));
        prop_assert_eq!(&engine.history().latest().unwrap().expression, &expression);
    }

    /// Negating twice is the identity on entered numbers
    #[test]
    fn prop_negate_involution(digits in prop::collection::vec(digit_strategy(), 1..10)) {
        let mut engine = CalculatorEngine::new();
        for d in &digits {
            engine.input_digit(*d);
        }
        let before = parse_number(engine.current());
        engine.negate();
        engine.negate();
        prop_assert_eq!(parse_number(engine.current()), before);
    }
}
