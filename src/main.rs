use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

mod bibtex;
mod commands;
mod identifier;
mod output;
mod remote;

use commands::CommandError;

#[macro_export]
macro_rules! blog_working {
    ($category:expr, $($arg:tt)*) => {{
        use termion::color;
        let formatted_args = format!($($arg)*);
        println!("{}{:>12}{} {}",color::Fg(color::Blue), $category,color::Fg(color::Reset), formatted_args);
    }};
}

#[macro_export]
macro_rules! blog_done {
    ($category:expr, $($arg:tt)*) => {{
        use termion::color;
        let formatted_args = format!($($arg)*);
        println!("{}{:>12}{} {}",color::Fg(color::Green), $category,color::Fg(color::Reset), formatted_args);
    }};
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the BibTeX entry for a DOI, DOI URL or doi:-prefixed string
    Doi {
        /// DOI in any accepted form
        #[clap(value_name = "DOI")]
        identifier: String,

        /// Append the entry to this .bib file instead of printing it
        #[arg(value_name = "PATH", short, long)]
        out: Option<PathBuf>,

        /// Overwrite the output file instead of appending
        #[arg(long, requires = "out")]
        overwrite: bool,
    },

    /// Resolve an arXiv ID to a DOI and fetch its BibTeX entry
    Arxiv {
        /// arXiv identifier, with or without the arXiv: prefix
        #[clap(value_name = "ID")]
        identifier: String,

        /// Append the entry to this .bib file instead of printing it
        #[arg(value_name = "PATH", short, long)]
        out: Option<PathBuf>,

        /// Overwrite the output file instead of appending
        #[arg(long, requires = "out")]
        overwrite: bool,
    },

    /// Resolve a PubMed/PMC ID to a DOI and fetch its BibTeX entry
    Pmid {
        /// Bare numeric PMID or PMC identifier
        #[clap(value_name = "ID")]
        identifier: String,

        /// Append the entry to this .bib file instead of printing it
        #[arg(value_name = "PATH", short, long)]
        out: Option<PathBuf>,

        /// Overwrite the output file instead of appending
        #[arg(long, requires = "out")]
        overwrite: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Doi {
            identifier,
            out,
            overwrite,
        } => commands::doi::run(&identifier, out.as_deref(), overwrite),

        Commands::Arxiv {
            identifier,
            out,
            overwrite,
        } => commands::arxiv::run(&identifier, out.as_deref(), overwrite),

        Commands::Pmid {
            identifier,
            out,
            overwrite,
        } => commands::pmid::run(&identifier, out.as_deref(), overwrite),
    };

    match result {
        Ok(()) => (),
        Err(err @ CommandError::NoDoi(_)) => {
            error_message(&err.to_string());
            process::exit(3);
        }
        Err(err) => {
            error_message(&err.to_string());
            process::exit(1);
        }
    }
}

fn error_message(err: &str) {
    eprintln!(
        "{}{:>12}{} {}",
        termion::color::Fg(termion::color::Red),
        "Error",
        termion::color::Fg(termion::color::Reset),
        err
    );
}
