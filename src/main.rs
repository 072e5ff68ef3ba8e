// ── Safety policy ────────────────────────────────────────────────────────────
// No `unsafe` in the binary; all Win32 FFI lives in the library's
// `platform::win32` module.
#![deny(unsafe_code)]

#[cfg(windows)]
mod cli {
    use std::{path::PathBuf, process::ExitCode};

    use clap::Parser;

    use git_bash_switch::{host::UnknownHostError, patcher, PeFile, TerminalHost};

    /// Switch a Git for Windows launcher between the MinTTY and ConHost
    /// terminal hosts.
    #[derive(Parser)]
    #[command(name = "git-bash-switch", version, about)]
    struct Cli {
        /// Path to the launcher executable (e.g. git-bash.exe).
        exe: PathBuf,

        /// Terminal host to activate: MinTTY or ConHost (case-insensitive).
        #[arg(value_parser = parse_host)]
        host: TerminalHost,

        /// Log each patch step to stderr.
        #[arg(short, long)]
        verbose: bool,
    }

    fn parse_host(s: &str) -> Result<TerminalHost, String> {
        s.parse().map_err(|e: UnknownHostError| e.to_string())
    }

    pub(crate) fn run() -> ExitCode {
        let cli = match Cli::try_parse() {
            Ok(cli) => cli,
            Err(e) => {
                // --help and --version land here too; they are not failures.
                let _ = e.print();
                return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
            }
        };

        // Patch steps log at info+; --verbose adds debug; RUST_LOG overrides.
        let level = if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("git_bash_switch", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();

        let mut file = PeFile::new(&cli.exe);
        match patcher::set_active_terminal_host(&mut file, cli.host) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{e}");
                eprintln!("Error editing {}: {}", cli.exe.display(), e.result_code());
                #[cfg(debug_assertions)]
                git_bash_switch::platform::win32::report::failure_dialog(&e);
                ExitCode::FAILURE
            }
        }
    }
}

#[cfg(windows)]
fn main() -> std::process::ExitCode {
    cli::run()
}

// The patcher edits PE resources through the Win32 API; on any other OS there
// is nothing it can do.
#[cfg(not(windows))]
fn main() -> std::process::ExitCode {
    eprintln!("git-bash-switch only runs on Windows.");
    std::process::ExitCode::FAILURE
}
