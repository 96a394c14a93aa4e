use clap::Parser;
use miette::Result;
use partbench::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    // This is standard practice for CLI tools that output to stdout.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Name(cmd) => partbench::cli::commands::name::run(cmd, &global),
        Commands::Param(cmd) => partbench::cli::commands::param::run(cmd, &global),
        Commands::Selection(cmd) => partbench::cli::commands::selection::run(cmd, &global),
        Commands::Part(cmd) => partbench::cli::commands::part::run(cmd, &global),
        Commands::Location(cmd) => partbench::cli::commands::location::run(cmd, &global),
    }
}
