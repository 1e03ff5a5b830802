use log::info;
use log_tail::{FileStateStore, RotatingTail, TailOptions, follow_log};
use std::env;
use std::io::Write;
use std::process;
use tokio_stream::StreamExt;

fn setup_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() {
    setup_logging();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);
    let follow = args.iter().any(|a| a == "--follow");
    args.retain(|a| a != "--follow");

    if args.is_empty() || args.len() > 2 {
        eprintln!("Usage: {} <file_path> [state_path] [--follow]", program);
        process::exit(1);
    }

    let file_path = &args[0];
    let state_path = args.get(1);

    if follow {
        let mut options = TailOptions::default();
        if let Some(state_path) = state_path {
            options = options.state_path(state_path);
        }

        match follow_log(file_path, options).await {
            Ok(mut stream) => {
                info!("following {}", file_path);
                while let Some(batch) = stream.next().await {
                    match batch {
                        Ok(lines) => {
                            if let Err(e) = print_lines(&mut std::io::stdout().lock(), &lines) {
                                eprintln!("Error writing output: {}", e);
                                process::exit(1);
                            }
                        }
                        Err(e) => {
                            eprintln!("Error reading file: {}", e);
                            process::exit(1);
                        }
                    }
                }
            }
            Err(e) => {
                eprintln!("Error setting up file watcher: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    let store = match state_path {
        Some(state_path) => FileStateStore::new(state_path),
        None => FileStateStore::default(),
    };
    let tail = RotatingTail::with_store(file_path, store);

    let mut stdout = std::io::stdout();
    let result = tail
        .process_new_lines(|line| {
            stdout.write_all(line.as_bytes())?;
            stdout.flush()
        })
        .await;

    if let Err(e) = result {
        eprintln!("Error reading file: {}", e);
        process::exit(1);
    }
}

fn print_lines<W: Write>(out: &mut W, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        out.write_all(line.as_bytes())?;
    }
    out.flush()
}
