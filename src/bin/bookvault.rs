use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use bookvault::commands;
use bookvault::password::{LinePasswordReader, PasswordReader, TerminalPasswordReader};

#[derive(Parser, Debug)]
#[command(
    name = "bookvault",
    version,
    about = "encrypted project files for long-form writing"
)]
struct Cli {
    /// Read passwords as lines from stdin instead of from the terminal
    #[arg(long = "password-stdin", action = ArgAction::SetTrue, global = true)]
    password_stdin: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new project file
    Create {
        /// Path of the project file to create
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
        /// Book title
        #[arg(long = "title", default_value = "")]
        title: String,
        /// Author name
        #[arg(long = "author", default_value = "")]
        author: String,
        /// Genre
        #[arg(long = "genre", default_value = "")]
        genre: String,
        /// Protect the file with a password
        #[arg(long = "encrypt", action = ArgAction::SetTrue)]
        encrypt: bool,
    },
    /// Print a summary of a project file
    Info {
        /// Path to the project file
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
    },
    /// Export a project as a markdown manuscript
    Export {
        /// Path to the project file
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
        /// Path of the markdown file to write
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Encrypt a plain project file
    Encrypt {
        /// Path to the plain project file
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
        /// Path of the encrypted file to write
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Decrypt an encrypted project file
    Decrypt {
        /// Path to the encrypted project file
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
        /// Path of the plain file to write
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Change the password of an encrypted project file in place
    ChangePassword {
        /// Path to the encrypted project file
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },
    /// Check whether a password opens an encrypted project file
    Verify {
        /// Path to the encrypted project file
        #[arg(short = 'i', long = "input")]
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut reader: Box<dyn PasswordReader> = if cli.password_stdin {
        Box::new(LinePasswordReader::new(io::stdin().lock()))
    } else {
        Box::new(TerminalPasswordReader::new())
    };

    let result = match cli.command {
        Commands::Create {
            output,
            title,
            author,
            genre,
            encrypt,
        } => commands::create(&output, &title, &author, &genre, encrypt, reader.as_mut()),
        Commands::Info { input } => commands::info(&input, reader.as_mut()),
        Commands::Export { input, output } => commands::export(&input, &output, reader.as_mut()),
        Commands::Encrypt { input, output } => commands::encrypt(&input, &output, reader.as_mut()),
        Commands::Decrypt { input, output } => commands::decrypt(&input, &output, reader.as_mut()),
        Commands::ChangePassword { file } => commands::change_password(&file, reader.as_mut()),
        Commands::Verify { input } => match commands::verify(&input, reader.as_mut()) {
            Ok(true) => {
                println!("password is valid");
                Ok(())
            }
            Ok(false) => {
                eprintln!("password is not valid for this file");
                return ExitCode::FAILURE;
            }
            Err(e) => Err(e),
        },
    };

    if let Err(err) = result {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
