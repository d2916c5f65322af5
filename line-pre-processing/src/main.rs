/// Polyline to prepared line set converter entry point
use line_pre_processing::converter::{LineSetConverter, SYNTHETIC_TORNADO};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 4 {
        eprintln!(
            "Usage: {} <input.obj | {}> [budget] [output.lines.json]",
            args[0], SYNTHETIC_TORNADO
        );
        std::process::exit(1);
    }

    let converter = LineSetConverter::from_args(&args[1..])?;
    converter.convert()?;

    Ok(())
}
