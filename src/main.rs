// src/main.rs
// Command-line front end for LeCroy Reader

use std::env;
use std::process;

use lecroy_reader::{write_channel_csv, write_csv, ChannelSet, ScopeRecord};
use log::{error, info};

fn print_usage() {
    eprintln!("Usage: lecroy_reader <command> <trc_file> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info <file>                        Display trace descriptor information");
    eprintln!("  convert <file> <output> [sparse]   Convert one trace to CSV");
    eprintln!("  channels <file> <output> [sparse]  Export all sibling channels to CSV");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  lecroy_reader info C1Trace00000.trc");
    eprintln!("  lecroy_reader convert C1Trace00000.trc output.csv");
    eprintln!("  lecroy_reader channels C1Trace00000.trc channels.csv 5000");
}

fn fail(message: String) -> ! {
    error!("{}", message);
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn parse_sparse(args: &[String]) -> Option<usize> {
    let raw = args.get(4)?;
    match raw.parse() {
        Ok(n) => Some(n),
        Err(_) => fail(format!("Invalid sparse count '{}'", raw)),
    }
}

fn output_arg(args: &[String]) -> &str {
    match args.get(3) {
        Some(out) => out.as_str(),
        None => {
            print_usage();
            fail("Missing output file argument".to_string())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];
    let input_file = &args[2];

    match command.as_str() {
        "info" => {
            let record = ScopeRecord::load(input_file, None)
                .unwrap_or_else(|e| fail(format!("loading trace '{}': {}", input_file, e)));
            print_trace_info(&record);
        }

        "convert" => {
            let output_file = output_arg(&args);
            let record = ScopeRecord::load(input_file, parse_sparse(&args))
                .unwrap_or_else(|e| fail(format!("loading trace '{}': {}", input_file, e)));

            if let Err(e) = write_csv(output_file, &record.time, &record.voltage) {
                fail(format!("writing CSV file '{}': {}", output_file, e));
            }

            info!("Converted {} to {}", input_file, output_file);
            println!("Successfully converted {} to {}", input_file, output_file);
            println!("Total samples written: {}", record.voltage.len());
        }

        "channels" => {
            let output_file = output_arg(&args);
            let set = ChannelSet::load_all(input_file, parse_sparse(&args))
                .unwrap_or_else(|e| fail(format!("loading channels of '{}': {}", input_file, e)));

            if let Err(e) = write_channel_csv(output_file, &set.time, &set.voltages) {
                fail(format!("writing channel CSV file '{}': {}", output_file, e));
            }

            println!(
                "Successfully exported {} channels to {}",
                set.channel_count(),
                output_file
            );
        }

        _ => {
            print_usage();
            fail(format!("Unknown command '{}'", command));
        }
    }
}

fn print_trace_info(record: &ScopeRecord) {
    print!("{}", record.describe());
    println!();

    let desc = &record.descriptor;
    println!("Voltage Scaling:");
    println!("  Vertical gain: {} V/LSB", desc.vertical_gain);
    println!("  Vertical offset: {} V", desc.vertical_offset);
    println!("  Nominal bits: {}", desc.nominal_bits);

    if !record.voltage.is_empty() {
        let min_v = record.voltage.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max_v = record.voltage.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

        println!("  Data range: {:.3} V to {:.3} V", min_v, max_v);
        println!("  Peak-to-peak: {:.3} V", max_v - min_v);
    }
    println!();

    println!("Time Scaling:");
    println!(
        "  Sample interval: {:.3e} s ({:.3} MHz sample rate)",
        desc.horiz_interval,
        1.0 / desc.horiz_interval as f64 / 1e6
    );
    println!("  Horizontal offset: {:.6e} s", desc.horiz_offset);
    println!(
        "  Record duration: {:.6e} s",
        desc.wave_array_count as f64 * desc.horiz_interval as f64
    );
    println!();

    let lengths = &desc.section_lengths;
    println!("Data Layout:");
    println!("  Descriptor offset: {} bytes", desc.descriptor_offset);
    println!("  Descriptor length: {} bytes", lengths.descriptor_length);
    println!("  User text length: {} bytes", lengths.user_text_length);
    println!("  Trigger time array length: {} bytes", lengths.trig_time_array_length);
    println!(
        "  Wave array length: {} bytes ({} byte samples)",
        lengths.wave_array_byte_length,
        desc.comm_type.sample_width()
    );
}
