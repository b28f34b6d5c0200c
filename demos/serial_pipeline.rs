//! Serial Pipeline
//!
//! A job pipeline driven from several producer threads through a
//! `SerialMachine`. Enter handlers chain the next stage by posting through a
//! `SerialHandle`, and the finish handler signals the main thread.
//!
//! Run with: RUST_LOG=switchyard=debug cargo run --example serial_pipeline

use parking_lot::Mutex;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use switchyard::{fsm_enum, FsmError, Machine, SerialMachine, SerialOptions, TracingLogger};
use tracing_subscriber::EnvFilter;

fsm_enum! {
    enum Stage {
        Queued,
        Fetching,
        Parsing,
        Storing,
        Done,
    }
}

fsm_enum! {
    enum Step {
        Begin,
        Fetched,
        Parsed,
        Stored,
        Ping,
    }
}

fn main() -> Result<(), FsmError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Serial Pipeline ===\n");

    let mut engine: Machine<Stage, Step> = Machine::new();
    engine.set_logger(TracingLogger);
    engine.set_states(Stage::ALL.iter().copied())?;
    engine.set_terminal_states(Stage::Queued, Some(Stage::Done))?;

    let machine = SerialMachine::with_options(
        engine,
        SerialOptions {
            thread_name: "pipeline-worker".to_string(),
            start_paused: true,
        },
    )?;

    machine.add_transition(Stage::Queued, Stage::Fetching, Step::Begin, None)?;
    machine.add_transition(Stage::Fetching, Stage::Parsing, Step::Fetched, None)?;
    machine.add_transition(Stage::Parsing, Stage::Storing, Step::Parsed, None)?;
    machine.add_transition(Stage::Storing, Stage::Done, Step::Stored, None)?;

    for (stage, next) in [
        (Stage::Fetching, Step::Fetched),
        (Stage::Parsing, Step::Parsed),
        (Stage::Storing, Step::Stored),
    ] {
        let handle = machine.handle();
        machine.add_enter_handler(stage, move |state, _| {
            println!("  [{}] {}", worker_name(), state.name());
            thread::sleep(Duration::from_millis(10));
            handle.process_event(next);
        })?;
    }

    machine.set_global_no_transition_handler(|state, event| {
        println!("  [{}] {:?} ignored in {}", worker_name(), event, state.name());
    });

    let (done_tx, done_rx) = mpsc::channel();
    let done_tx = Mutex::new(done_tx);
    machine.set_finish_handler(move |state, terminating| {
        let _ = done_tx.lock().send((*state, terminating));
    });

    // Producers enqueue while the worker is paused; nothing runs yet.
    machine.start();
    machine.process_event(Step::Begin);
    let producers: Vec<_> = (0..3)
        .map(|_| {
            let handle = machine.handle();
            thread::spawn(move || {
                handle.process_event(Step::Ping);
            })
        })
        .collect();
    for producer in producers {
        let _ = producer.join();
    }
    println!("Queued jobs before resuming: {}", machine.pending_jobs());

    machine.set_paused(false);

    match done_rx.recv_timeout(Duration::from_secs(5)) {
        Ok((state, terminating)) => {
            println!("\nFinished in {} (terminated: {})", state.name(), terminating);
        }
        Err(_) => {
            println!("\nPipeline did not finish in time, terminating");
            machine.terminate();
        }
    }

    let history = machine.history();
    let path: Vec<&str> = history.get_path().iter().map(|s| s.name()).collect();
    println!("Path: {}", path.join(" -> "));

    Ok(())
}

fn worker_name() -> String {
    thread::current().name().unwrap_or("unnamed").to_string()
}
