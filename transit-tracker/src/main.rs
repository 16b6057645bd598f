mod types;

use std::io::{self, Write};
use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use logger::Logger;
use types::simulation::Simulation;
use types::timer::{Timer, DEFAULT_TICK_ADVANCE_SECS};
use types::tracker_error::TrackerError;

fn clean_scr() {
    print!("\x1B[2J\x1B[1;1H");
    io::stdout().flush().unwrap();
}

fn prompt_route_id() -> Result<String, TrackerError> {
    let route_id = prompt_input("Enter the route id (e.g. L3): ");
    if route_id.is_empty() {
        return Err(TrackerError::InvalidInput);
    }
    Ok(route_id)
}

fn open_route(sim: &Simulation) -> Result<(), TrackerError> {
    clean_scr();
    sim.open_route(&prompt_route_id()?)
}

fn close_route(sim: &Simulation) -> Result<(), TrackerError> {
    sim.close_route(&prompt_route_id()?)
}

fn refresh_route(sim: &Simulation) -> Result<(), TrackerError> {
    sim.refresh_route(&prompt_route_id()?)
}

fn show_board(sim: &Simulation, delayed_only: bool) -> Result<(), TrackerError> {
    let route_id = prompt_route_id()?;
    sim.display_board(&route_id, delayed_only)
}

fn set_time_rate(sim: &Simulation) -> Result<(), TrackerError> {
    let seconds_input = prompt_input("Enter the simulated seconds per tick: ");
    let seconds: i64 = match seconds_input.parse() {
        Ok(s) => s,
        Err(_) => return Err(TrackerError::InvalidInput),
    };

    sim.set_time_rate(seconds)
}

fn main() -> Result<(), TrackerError> {
    let logger = Logger::new(Path::new("logs"), "transit-tracker")
        .map_err(|e| TrackerError::Other(e.to_string()))?;

    let now: NaiveDateTime = Utc::now().naive_local();
    let timer = Timer::new(now, DEFAULT_TICK_ADVANCE_SECS);

    let sim = Simulation::new(timer, logger);
    sim.start()?;

    loop {
        println!("Enter command (type '-h' or '--help' for options): ");
        let mut command = String::new();
        io::stdin()
            .read_line(&mut command)
            .expect("Failed to read input");

        let args: Vec<&str> = command.split_whitespace().collect();
        if args.is_empty() {
            continue;
        }

        match args[0] {
            "list-lines" => {
                if let Err(e) = sim.list_lines() {
                    println!("{}", e);
                }
            }

            "open-route" => {
                if let Err(e) = open_route(&sim) {
                    println!("{}", e);
                }
            }

            "board" => {
                if let Err(e) = show_board(&sim, false) {
                    println!("{}", e);
                }
            }

            "delayed" => {
                if let Err(e) = show_board(&sim, true) {
                    println!("{}", e);
                }
            }

            "refresh" => {
                if let Err(e) = refresh_route(&sim) {
                    println!("{}", e);
                }
            }

            "close-route" => {
                if let Err(e) = close_route(&sim) {
                    println!("{}", e);
                }
            }

            "time-rate" => {
                clean_scr();
                if let Err(e) = set_time_rate(&sim) {
                    println!("{}", e);
                }
            }

            "pause" => {
                sim.pause();
                println!("Clock paused");
            }

            "resume" => {
                sim.resume();
                println!("Clock resumed");
            }

            "-h" | "--help" | "help" => print_help(),

            "exit" => break,

            _ => eprintln!("Invalid command. Use -h for help."),
        }
    }

    sim.stop();
    Ok(())
}

fn prompt_input(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .expect("Failed to read input");
    input.trim().to_string()
}

fn print_help() {
    clean_scr();
    println!("Available commands:");
    println!("  list-lines");
    println!("    Show the line catalog.");
    println!("  open-route");
    println!("    Opens a live status board for a route. You'll be prompted for the id.");
    println!("  board");
    println!("    Shows a route's stop board, refreshing until you press enter.");
    println!("  delayed");
    println!("    Same as board, but only stops currently reporting a delay.");
    println!("  refresh");
    println!("    Recomputes a route's board immediately, outside the tick cadence.");
    println!("  close-route");
    println!("    Drops a route's board.");
    println!("  time-rate");
    println!("    Changes the simulated seconds elapsed per tick.");
    println!("  pause");
    println!("    Pauses the clock.");
    println!("  resume");
    println!("    Resumes the clock.");
    println!("  exit");
    println!("    Closes this application.");
}
