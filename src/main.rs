use anyhow::Context;
use bangsh::{EditorInput, Interpreter, ShellConfig, interrupt};
use env_logger::Env;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config: ShellConfig = argh::from_env();
    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("terminating: {e:?}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: ShellConfig) -> anyhow::Result<()> {
    interrupt::install().context("cannot install interrupt handler")?;
    let mut input = EditorInput::new().context("cannot open line editor")?;
    Interpreter::with_config(config).repl(&mut input)?;
    Ok(())
}
