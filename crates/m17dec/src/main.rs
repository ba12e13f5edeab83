use std::io;
use std::io::IsTerminal;

use anyhow::{anyhow, bail, Context};
use byteorder::{LittleEndian, ReadBytesExt};
use clap::Parser;
use log::{info, LevelFilter};

use m17link::{FrameDecoder, ReflectorClient};

mod app;
mod cli;

use cli::Args;

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    if let Err(err) = m17dec(args) {
        eprintln!("m17dec: {err:#}");
        std::process::exit(1);
    }
}

fn m17dec(args: Args) -> Result<(), anyhow::Error> {
    log_setup(&args);

    // reflector session, if one was requested
    let mut session = reflector_setup(&args)?;
    let sender = session
        .as_ref()
        .map(|client| client.sender())
        .transpose()
        .context("cloning reflector socket")?;
    let run_loop = session.take().map(|mut client| {
        std::thread::spawn(move || {
            if let Err(e) = client.run() {
                log::warn!("reflector session ended: {e}");
            }
        })
    });

    // file setup: locks stdin in case we need it
    let stdin = io::stdin();
    let stdin_handle = stdin.lock();
    let mut input = file_setup(&args, stdin_handle)?;

    let mut decoder = FrameDecoder::new();
    app::run(
        &args,
        &mut decoder,
        std::iter::from_fn(|| input.read_f32::<LittleEndian>().ok()),
        sender.as_ref(),
    );

    if let (Some(sender), Some(handle)) = (sender, run_loop) {
        // ask the reflector to let go; its DISC ends the loop
        let _ = sender.disconnect();
        let _ = handle.join();
    }
    Ok(())
}

fn reflector_setup(args: &Args) -> Result<Option<ReflectorClient>, anyhow::Error> {
    let Some(reflector) = &args.reflector else {
        return Ok(None);
    };
    let Some(callsign) = &args.callsign else {
        bail!("--reflector requires --callsign");
    };
    let (host, port) = reflector
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("--reflector must be host:port, got \"{reflector}\""))?;
    let port: u16 = port
        .parse()
        .with_context(|| format!("bad reflector port \"{port}\""))?;

    let mut client = ReflectorClient::new(
        host,
        port,
        args.module,
        callsign,
        Some(Box::new(app::print_reflector_packet)),
        Some(Box::new(app::print_reflector_stream)),
    )?;
    client
        .connect()
        .with_context(|| format!("connecting to reflector {reflector}"))?;
    Ok(Some(client))
}

fn log_setup(args: &Args) {
    if args.quiet {
        // no logging
    } else if std::env::var_os("RUST_LOG").is_none() {
        let log_filter = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        pretty_env_logger::formatted_builder()
            .filter_module("m17link", log_filter)
            .filter_module("m17dec", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}

fn file_setup<'stdin>(
    args: &Args,
    stdin: io::StdinLock<'stdin>,
) -> Result<Box<dyn io::BufRead + 'stdin>, anyhow::Error> {
    if args.input_is_stdin() {
        info!("M17 decoder reading standard input");
        if io::stdin().is_terminal() {
            bail!(
                "cowardly refusing to read symbols from a terminal.\n\n\
                 Pipe a raw f32 symbol stream from a capture file or \
                 modem emulator into this program."
            );
        }
        Ok(Box::new(io::BufReader::new(stdin)))
    } else {
        info!("M17 decoder reading file: \"{}\"", &args.file);
        Ok(Box::new(io::BufReader::new(
            std::fs::File::open(&args.file)
                .with_context(|| format!("unable to open \"{}\"", args.file))?,
        )))
    }
}
