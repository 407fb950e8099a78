use anyhow::bail;
use argh::FromArgs;
use dirtask::Interpreter;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// Run user directory task scripts, one independent task per file.
/// Without scripts and without --interactive, runs tasks/task1.txt to tasks/task5.txt.
struct Args {
    #[argh(switch, short = 'i')]
    /// start an interactive session after the scripts have run.
    interactive: bool,

    #[argh(option, default = "String::from(\"warn\")")]
    /// log filter used when RUST_LOG is not set, e.g. "debug" or "dirtask=trace".
    log_level: String,

    #[argh(positional)]
    /// task scripts to run in order.
    scripts: Vec<PathBuf>,
}

fn default_scripts() -> Vec<PathBuf> {
    (1..=5)
        .map(|n| PathBuf::from(format!("tasks/task{n}.txt")))
        .collect()
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let scripts = if args.scripts.is_empty() && !args.interactive {
        default_scripts()
    } else {
        args.scripts
    };

    let mut interpreter = Interpreter::default();
    let mut stdout = std::io::stdout().lock();
    let mut unreadable = 0;
    for (path, result) in scripts.iter().zip(interpreter.run_scripts(&scripts, &mut stdout)) {
        if let Err(err) = result {
            error!(script = %path.display(), "{err}");
            unreadable += 1;
        }
    }
    drop(stdout);

    if args.interactive {
        interpreter.repl()?;
    }

    if unreadable > 0 {
        bail!("{unreadable} task script(s) could not be run");
    }
    Ok(())
}
