use anyhow::Result;
use clap::{Parser, Subcommand};
use ragsim::{DeadlockVerdict, GraphSnapshot, RagSim, Session, showcase, showcase_this};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "ragsim - Interactive Resource-Allocation Graph Simulator With Deadlock Detection"
)]
struct Cli {
    /// Record every session action to this log file ("{timestamp}" is expanded)
    #[arg(long)]
    log: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open a recorded session log in the browser viewer
    Showcase {
        /// Path to the log file
        log_file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Showcase { log_file }) = cli.command {
        return showcase(log_file);
    }

    let mut builder = RagSim::new();
    if let Some(path) = &cli.log {
        builder = builder.with_log(path);
    }
    let session = builder.start()?;

    println!("Type 'help' for the command list, 'quit' to leave.");
    run_session(&session)
}

fn run_session(session: &Session) -> Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            ["help"] => print_help(),
            ["process", name] => report(session.add_process(name)),
            ["rmprocess", name] => report(session.remove_process(name)),
            ["resource", name] => report(session.add_resource(name)),
            ["rmresource", name] => report(session.remove_resource(name)),
            ["request", process, resource] => report(session.add_request_edge(process, resource)),
            ["unrequest", process, resource] => {
                report(session.remove_request_edge(process, resource));
            }
            ["allocate", resource, process] => {
                report(session.add_allocation_edge(resource, process));
            }
            ["deallocate", resource, process] => {
                report(session.remove_allocation_edge(resource, process));
            }
            ["check"] => print_verdict(&session.check_deadlock().verdict),
            ["show"] => print_graph(&session.snapshot()),
            ["showcase"] => {
                if let Err(error) = showcase_this() {
                    println!("error: {error:#}");
                }
            }
            _ => println!("unrecognized command; try 'help'"),
        }
    }

    Ok(())
}

fn report(result: Result<(), ragsim::StoreError>) {
    match result {
        Ok(()) => println!("ok"),
        Err(error) => println!("error: {error}"),
    }
}

fn print_verdict(verdict: &DeadlockVerdict) {
    match verdict {
        DeadlockVerdict::Empty => println!("Graph is empty."),
        DeadlockVerdict::Acyclic => println!("No deadlock. The graph is acyclic."),
        DeadlockVerdict::CycleDetected(cycle) => {
            let path: Vec<&str> = cycle.iter().map(|node| node.name()).collect();
            println!(
                "Deadlock detected! A cycle exists in the graph: {} -> {}",
                path.join(" -> "),
                path[0]
            );
        }
    }
}

fn print_graph(snapshot: &GraphSnapshot) {
    if snapshot.is_empty() {
        println!("Add processes and resources to see the graph.");
        return;
    }

    println!("processes: {}", snapshot.processes.join(" "));
    println!("resources: {}", snapshot.resources.join(" "));
    for edge in &snapshot.request_edges {
        println!("  {} -> {}  (request)", edge.process, edge.resource);
    }
    for edge in &snapshot.allocation_edges {
        println!("  {} -> {}  (allocation)", edge.resource, edge.process);
    }
}

fn print_help() {
    println!(
        "\
commands:
  process NAME            add a process
  rmprocess NAME          remove a process and its edges
  resource NAME           add a resource
  rmresource NAME         remove a resource and its edges
  request P R             process P starts waiting for resource R
  unrequest P R           remove a request edge
  allocate R P            resource R is now held by process P
  deallocate R P          remove an allocation edge
  check                   run the deadlock checker
  show                    list the current graph
  showcase                open the recorded session in the browser viewer
  help                    show this list
  quit                    leave the session"
    );
}
