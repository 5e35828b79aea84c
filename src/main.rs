mod config;
mod cpu;
mod machine;
mod memory;
mod mmu;
mod replace;
mod stats;
mod trace;

use std::fs;

use log::info;

use crate::{config::Config, trace::Trace};

fn main() {
    env_logger::init();

    let mut args = pico_args::Arguments::from_env();

    let config_str: String = if let Some(config_str) = args.opt_value_from_str("--config").unwrap()
    {
        config_str
    } else {
        let config_path: String = args
            .opt_value_from_str("-p")
            .unwrap()
            .expect("Must provide a config with --config <json> or -p <path>");
        fs::read_to_string(config_path).expect("Could not find config file")
    };
    let config: Config = serde_json::from_str(&config_str).expect("Malformed config");
    let mut machine = config.to_machine().unwrap_or_else(|err| {
        eprintln!("Invalid config: {err}");
        std::process::exit(1);
    });

    let stats_path: Option<String> = args
        .opt_value_from_str("--json")
        .expect("--json must be a path");
    let instr_per_block: usize = args
        .opt_value_from_str("--buffer-size")
        .expect("--buffer-size must be an integer")
        .unwrap_or(1024);
    let blocks_per_queue: usize = args
        .opt_value_from_str("--queue-size")
        .expect("--queue-size must be an integer")
        .unwrap_or(32);

    let trace_path: Option<String> = args.opt_value_from_str("-t").expect("-t must be a path");
    let trace = if let Some(trace_path) = trace_path {
        info!("streaming instructions from {trace_path}");
        Trace::read(trace_path.into(), instr_per_block, blocks_per_queue)
            .expect("Could not open trace file")
    } else {
        let count: usize = args
            .opt_value_from_str("-n")
            .expect("-n must be an integer")
            .unwrap_or(1000);
        let seed: u64 = args
            .opt_value_from_str("--seed")
            .expect("--seed must be an integer")
            .unwrap_or(1507);
        info!("generating {count} random instructions (seed {seed})");
        Trace::random(
            count,
            machine.ram.len(),
            fastrand::Rng::with_seed(seed),
            instr_per_block,
            blocks_per_queue,
        )
    };

    // Small machines get a full dump before and after, as a sanity view.
    let dump = machine.ram.len() <= 10;
    if dump {
        println!("{machine}");
    }

    info!("starting machine");
    let mut executed: u64 = 0;
    for batch in trace.rec.iter() {
        let batch = batch.unwrap_or_else(|err| {
            eprintln!("Broken trace: {err}");
            std::process::exit(1);
        });
        if let Err(err) = cpu::run(&mut machine, &batch) {
            eprintln!("Rejected access: {err}");
            std::process::exit(1);
        }
        executed += batch.len() as u64;
    }
    println!("Ran {executed} instructions");

    if dump {
        println!("{machine}");
    }

    machine.stats.print();

    if let Some(stats_path) = stats_path {
        let stats_file = fs::File::create(stats_path).expect("Cannot open output file");
        serde_json::to_writer_pretty(stats_file, &machine.stats).unwrap();
    }
}
