//! Sum of squares on each pool strategy, with pool logs.
//!
//! Run with `RUST_LOG=drift_rs=debug cargo run --example squares`.

use drift_rs::prelude::*;
use std::panic::panic_any;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct InvalidInput(&'static str);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    for policy in [
        SchedulingPolicy::SingleQueue,
        SchedulingPolicy::Sharded,
        SchedulingPolicy::WorkStealing,
    ] {
        let config = Config::builder()
            .num_threads(4)
            .scheduling_policy(policy)
            .build()?;
        let mut rt = Runtime::new(config)?;

        let handles: Vec<_> = (0u64..100).map(|i| rt.submit(move || i * i)).collect();
        let mut sum = 0;
        for handle in handles {
            sum += handle.join()?;
        }

        let failing = rt.submit(|| -> u64 { panic_any(InvalidInput("negative radius")) });
        match failing.join() {
            Err(err) => match err.downcast_ref::<InvalidInput>() {
                Some(InvalidInput(why)) => println!("{:?}: task failed as expected: {}", policy, why),
                None => println!("{:?}: task failed: {}", policy, err),
            },
            Ok(v) => println!("{:?}: unexpected value {}", policy, v),
        }

        rt.shutdown();
        let metrics = rt.metrics();
        println!(
            "{:?}: sum = {} ({} tasks, {} stolen, {} panicked)",
            policy, sum, metrics.tasks_executed, metrics.tasks_stolen, metrics.tasks_panicked
        );
    }

    Ok(())
}
