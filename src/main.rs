/*!
 * Scheduler Demo
 *
 * Runs a consumer/producer pair over one simulated device and prints the
 * resulting scheduler statistics as JSON.
 */

use anyhow::Context;
use coop_sched::{init_tracing, SchedResult, Scheduler, SchedulerConfig, SchedulerStats};
use tracing::{error, info};

const DEVICE: u32 = 0;
const ROUNDS: usize = 3;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut config = SchedulerConfig::from_env();
    config.max_devices = config.max_devices.max(DEVICE + 1);
    info!(?config, "Starting scheduler demo");

    let stats = run(config).context("scheduler demo failed")?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Fork the root thread, join everything and return the final counters
fn run(config: SchedulerConfig) -> SchedResult<SchedulerStats> {
    let scheduler = Scheduler::with_config(config)?;

    let root = scheduler.clone();
    scheduler
        .fork(
            move |priority| {
                info!(priority, "Root thread forking workers");

                let consumer = root.clone();
                let forked = root.fork(
                    move |priority| {
                        for round in 0..ROUNDS {
                            match consumer.wait(DEVICE) {
                                Ok(()) => info!(priority, round, "Consumer woke"),
                                Err(e) => {
                                    error!(error = %e, "Consumer wait failed");
                                    return;
                                }
                            }
                        }
                    },
                    2,
                );
                if let Err(e) = forked {
                    error!(error = %e, "Failed to fork consumer");
                }

                let producer = root.clone();
                let forked = root.fork(
                    move |priority| {
                        for round in 0..ROUNDS {
                            producer.exec();
                            match producer.signal(DEVICE) {
                                Ok(woken) => info!(priority, round, woken, "Producer signaled"),
                                Err(e) => error!(error = %e, "Producer signal failed"),
                            }
                        }
                    },
                    1,
                );
                if let Err(e) = forked {
                    error!(error = %e, "Failed to fork producer");
                }
            },
            3,
        )?;

    scheduler.shutdown();
    scheduler.log_summary();
    Ok(scheduler.stats())
}
