mod cpu;
mod mem;
mod opcodes;
mod trace;

use std::env;
use std::fs;
use std::process;

use tracing::{debug, info, Level};

use cpu::{CPU, DEFAULT_LOAD_BASE};

fn usage(program_name: &str) -> ! {
    eprintln!("Usage: {} [-v|-vv|-vvv] <program>", program_name);
    process::exit(1);
}

fn main() {
    let mut args = env::args();
    let program_name = args.next().unwrap_or_else(|| "mos6502".to_string());

    let mut verbosity = 0u8;
    let mut path = None;
    for arg in args {
        match arg.as_str() {
            "-v" => verbosity += 1,
            "-vv" => verbosity += 2,
            "-vvv" => verbosity += 3,
            _ if arg.starts_with('-') => usage(&program_name),
            _ if path.is_none() => path = Some(arg),
            _ => usage(&program_name),
        }
    }
    let Some(path) = path else {
        usage(&program_name);
    };

    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    /* Initialize Logger */
    tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_max_level(level)
        .init();

    // Load the program image: raw little-endian machine code, no header.
    let program = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("{}: cannot read program: {}", path, err);
            process::exit(1);
        }
    };

    debug!(
        "program ({} bytes): {}",
        program.len(),
        program
            .iter()
            .map(|byte| format!("{:02X}", byte))
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut cpu = CPU::new();
    cpu.load_at(&program, DEFAULT_LOAD_BASE);

    let result = cpu.run_with_callback(|cpu| {
        tracing::trace!("{}", trace::trace(cpu));
    });

    if let Err(err) = result {
        eprintln!("{}", err);
        process::exit(1);
    }

    info!("### results");
    info!("pc: {:04X}", cpu.program_counter);
    info!("sp: {:02X}", cpu.stack_pointer);
    info!("a: {:02X}", cpu.register_a);
    info!("x: {:02X}", cpu.register_x);
    info!("y: {:02X}", cpu.register_y);
    info!("ps: {:02X}", cpu.status.bits());
    info!("cycles: {}", cpu.cycles);
}
