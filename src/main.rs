use std::env;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        n if n > 2 => {
            eprintln!("Usage: rocks [script]");
            process::exit(64);
        }
        2 => {
            let code = rocks::run_file(Path::new(&args[1])).unwrap_or_else(|err| {
                eprintln!("Error: {err}");
                process::exit(74);
            });
            process::exit(code);
        }
        _ => {
            if let Err(err) = rocks::run_prompt() {
                eprintln!("Error: {err}");
                process::exit(1);
            }
        }
    }
}
