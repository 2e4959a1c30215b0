#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use roving_core::{
    Gesture, GestureConfig, GestureRecognizer, GestureState, MouseButton, PointerInput,
};

#[derive(Arbitrary, Debug)]
enum Step {
    Down {
        x: i16,
        y: i16,
        target: bool,
        handle: bool,
        secondary: bool,
    },
    Move {
        x: i16,
        y: i16,
    },
    Up,
    Reset,
}

fuzz_target!(|input: (u8, Vec<Step>)| {
    let (threshold, steps) = input;
    let mut recognizer = GestureRecognizer::new(GestureConfig {
        drag_threshold_px: f64::from(threshold % 32),
    });

    for step in steps.iter().take(256) {
        match *step {
            Step::Down {
                x,
                y,
                target,
                handle,
                secondary,
            } => {
                let mut pointer = PointerInput::at(f64::from(x), f64::from(y));
                if target {
                    pointer = pointer.over_item("z", "a");
                }
                if handle {
                    pointer = pointer.with_drag_handle();
                }
                if secondary {
                    pointer = pointer.with_button(MouseButton::Right);
                }
                let was_idle = recognizer.state().is_idle();
                recognizer.down(&pointer);
                if was_idle && !secondary && !target {
                    assert!(recognizer.state().is_idle());
                }
            }
            Step::Move { x, y } => {
                let before = recognizer.state().clone();
                let signal = recognizer.move_to(&PointerInput::at(f64::from(x), f64::from(y)));
                if signal.is_some() {
                    assert!(recognizer.is_dragging());
                }
                if let Some(track) = recognizer.state().track() {
                    // Drags only ever start from a handle.
                    if recognizer.is_dragging() {
                        assert!(track.has_drag_handle);
                    }
                }
                if before.is_idle() {
                    assert_eq!(recognizer.state(), &GestureState::Idle);
                }
            }
            Step::Up => {
                let was_dragging = recognizer.is_dragging();
                let gesture = recognizer.up();
                assert!(recognizer.state().is_idle());
                if was_dragging {
                    assert!(matches!(gesture, Gesture::DragEnd { .. }));
                }
            }
            Step::Reset => recognizer.reset(),
        }
    }
});
