use std::path::PathBuf;

fn main() {
    let flags = match parse_flags(std::env::args().skip(1)) {
        Ok(flags) => flags,
        Err(message) => {
            eprintln!("error: {message}");
            std::process::exit(2);
        }
    };

    if flags.version {
        println!("APOD-TUI {}", apod_tui::VERSION);
        return;
    }
    if flags.help {
        println!(
            "APOD-TUI - Browse NASA's Astronomy Picture of the Day from the terminal.\n\n  --version, -V        Show version and exit\n  --help,    -h        Show this help message\n  --dump               Fetch the feed once, print the gallery and exit\n  --config <path>      Read configuration from <path>"
        );
        return;
    }

    let result = if flags.dump {
        let stdout = std::io::stdout();
        apod_tui::app::dump(flags.config, &mut stdout.lock())
    } else {
        apod_tui::run(flags.config)
    };

    if let Err(err) = result {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}

#[derive(Default)]
struct Flags {
    version: bool,
    help: bool,
    dump: bool,
    config: Option<PathBuf>,
}

fn parse_flags<I: Iterator<Item = String>>(mut args: I) -> Result<Flags, String> {
    let mut flags = Flags::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => flags.version = true,
            "--help" | "-h" => flags.help = true,
            "--dump" => flags.dump = true,
            "--config" => {
                let path = args.next().ok_or("--config requires a path")?;
                flags.config = Some(PathBuf::from(path));
            }
            other => {
                if let Some(path) = other.strip_prefix("--config=") {
                    flags.config = Some(PathBuf::from(path));
                } else {
                    return Err(format!("unknown argument {other:?} (see --help)"));
                }
            }
        }
    }
    Ok(flags)
}
