//! Traffic Light State Machine
//!
//! A cyclic machine driven by a timer event, with a guarded transition
//! for a pedestrian request and an emergency stop through `terminate`.
//!
//! Run with: RUST_LOG=switchyard=debug cargo run --example traffic_light

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use switchyard::{fsm_enum, MachineBuilder};
use tracing_subscriber::EnvFilter;

fsm_enum! {
    enum Light {
        Red,
        Green,
        Yellow,
    }
}

fsm_enum! {
    enum Signal {
        Tick,
        WalkButton,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Traffic Light State Machine ===\n");

    let walk_requested = Arc::new(AtomicBool::new(false));
    let request = Arc::clone(&walk_requested);
    let served = Arc::clone(&walk_requested);
    let pending = Arc::clone(&walk_requested);

    let mut machine = MachineBuilder::<Light, Signal>::new()
        .states(Light::ALL.iter().copied())
        .initial(Light::Red)
        .transition(Light::Red, Light::Green, Signal::Tick)
        // Walk requests cut green short, but only once per cycle.
        .guarded_transition(Light::Green, Light::Yellow, Signal::WalkButton, move |_, _, _| {
            !pending.load(Ordering::SeqCst)
        })
        .transition(Light::Green, Light::Yellow, Signal::Tick)
        .transition(Light::Yellow, Light::Red, Signal::Tick)
        .on_enter(Light::Green, move |state, _| {
            println!("  {} : cars go", state.name());
        })
        .on_enter(Light::Yellow, move |state, event| {
            if event == Some(&Signal::WalkButton) {
                request.store(true, Ordering::SeqCst);
            }
            println!("  {} : slow down", state.name());
        })
        .on_enter(Light::Red, move |state, _| {
            if served.swap(false, Ordering::SeqCst) {
                println!("  {} : pedestrians cross", state.name());
            } else {
                println!("  {} : stop", state.name());
            }
        })
        .on_unhandled(|state, event| {
            println!("  ignored {:?} while {}", event, state.name());
        })
        .on_finish(|state, terminating| {
            println!("\nStopped in {} (terminated: {})", state.name(), terminating);
        })
        .build()?;

    println!("Cycle with timer ticks:");
    machine.start();
    for _ in 0..6 {
        machine.process_event(Signal::Tick);
    }

    println!("\nWalk button while red, then while green:");
    machine.process_event(Signal::WalkButton);
    machine.process_event(Signal::Tick);
    machine.process_event(Signal::WalkButton);
    machine.process_event(Signal::Tick);

    println!("\nPath so far:");
    let path: Vec<&str> = machine.history().get_path().iter().map(|s| s.name()).collect();
    println!("  {}", path.join(" -> "));
    if let Some(duration) = machine.history().duration() {
        println!("  over {:?}", duration);
    }

    machine.terminate();

    Ok(())
}
