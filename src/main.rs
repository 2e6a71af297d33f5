//! floatterm binary entry point: an interactive console host.

use std::io::Write;
use std::process::ExitCode;

use floatterm::cli::{self, Args};
use floatterm::process::{event_channel, EventReceiver, EventSender};
use floatterm::{
    logging, CommandRunner, Config, Dispatcher, HeadlessSurface, Host, NativeProcesses,
    ProcessFacility, RecordingProcesses, Reply, TerminalManager,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'floatterm --help' for more information.");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::try_init_with(Some(config.log_filter())).ok();
    info!("floatterm v{}", env!("CARGO_PKG_VERSION"));

    let (tx, rx) = event_channel();
    let result = if args.dry_run {
        info!("dry run: process requests are recorded, not executed");
        run(&config, &args, RecordingProcesses::new(), tx, rx).await
    } else {
        let processes = NativeProcesses::new(tx.clone());
        run(&config, &args, processes, tx, rx).await
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("console error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run<P: ProcessFacility>(
    config: &Config,
    args: &Args,
    processes: P,
    tx: EventSender,
    mut rx: EventReceiver,
) -> std::io::Result<()> {
    let host = Host::new(HeadlessSurface::with_size(config.editor_size()), processes);
    let manager = TerminalManager::new(config.manager_options());
    let runner = CommandRunner::new(config.float_style(), config.close_delay());
    let mut dispatcher = Dispatcher::new(host, manager, runner, tx);

    info!(
        size = ?config.editor_size(),
        dry_run = args.dry_run,
        "console ready; type `help` for commands"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt("floatterm> ")?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    dispatcher.shutdown();
                    break;
                };
                let next = match dispatcher.handle_input(&line) {
                    Reply::None => None,
                    Reply::Message(msg) => {
                        println!("{}", msg);
                        None
                    }
                    Reply::Prompt(text) => Some(text),
                    Reply::Show => {
                        show(&dispatcher);
                        None
                    }
                    Reply::Resize(size) => {
                        dispatcher.host_mut().surface.set_size(size);
                        if let Reply::Message(msg) = dispatcher.relayout() {
                            println!("{}", msg);
                        }
                        None
                    }
                    Reply::Quit => break,
                };
                prompt(next.unwrap_or("floatterm> "))?;
            }
            Some(event) = rx.recv() => {
                dispatcher.handle_event(event);
            }
        }
    }

    info!("floatterm exiting");
    Ok(())
}

fn prompt(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", text)?;
    stdout.flush()
}

fn show<P: ProcessFacility>(dispatcher: &Dispatcher<HeadlessSurface, P>) {
    let surface = &dispatcher.host().surface;
    let windows = surface.open_windows();
    if windows.is_empty() {
        println!("(no open windows)");
        return;
    }
    for window in windows {
        if let Some(text) = surface.render(window) {
            print!("{}", text);
        }
    }
}
