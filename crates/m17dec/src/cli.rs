use clap::Parser;

/// Standard input filename
pub const STDIN_FILE: &str = "-";

const USAGE_LONG: &str = r#"
This program accepts M17 soft symbols in little-endian 32-bit float (f32) format, five samples per symbol, and decodes any packet or voice-stream transmissions present. Decoded frames are printed; SMS packets are printed as text.

You can pipe in a symbol capture file:

    m17dec < capture.sym

or decode live symbols from a modem emulator:

    socat UNIX-CONNECT:/tmp/modem - | m17dec

With --reflector, decoded traffic is also forwarded to an M17 reflector over UDP, and traffic arriving from the reflector is printed. A --callsign is required in that mode:

    m17dec --reflector m17-m17.example.org:17000 --module A --callsign N0CALL < capture.sym
"#;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "m17dec",
    version,
    about = "Decode an M17 soft-symbol stream, optionally bridging it to a reflector",
    after_long_help = USAGE_LONG
)]
pub struct Args {
    /// Input file of raw little-endian f32 symbols, or "-" for
    /// standard input
    #[arg(default_value = STDIN_FILE)]
    pub file: String,

    /// Suppress frame printouts and logging
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reflector to bridge with, as host:port
    #[arg(long)]
    pub reflector: Option<String>,

    /// Reflector module letter (A-Z)
    #[arg(long)]
    pub module: Option<char>,

    /// Local callsign, required when bridging to a reflector
    #[arg(long)]
    pub callsign: Option<String>,
}

impl Args {
    pub fn input_is_stdin(&self) -> bool {
        self.file == STDIN_FILE
    }
}
