use std::io::BufWriter;

use clap::Parser;
use kestrel::{Arguments, run};

fn main() {
    let args = Arguments::parse();
    logutil::configure_global_logger(tracing::Level::WARN, args.log_format.into(), std::io::stderr);

    let mut stdout = BufWriter::new(std::io::stdout().lock());
    if let Err(e) = run(&args, &mut stdout) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
