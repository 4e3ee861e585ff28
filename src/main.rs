use anyhow::Result;
use bitlet::areas::repository::Repository;
use bitlet::errors::Abort;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bitlet",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A tiny version-control system",
    long_about = "bitlet is a tiny local-first version-control system: a content-addressed \
    object store, a commit graph, a staging area, branches, a three-way merge and \
    push/fetch between repositories reachable through the filesystem.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Initialize a new repository in the current directory")]
    Init,
    #[command(about = "Stage a file for the next commit")]
    Add {
        #[arg(index = 1)]
        file: String,
    },
    #[command(about = "Unstage a file, or stage it for removal")]
    Rm {
        #[arg(index = 1)]
        file: String,
    },
    #[command(about = "Record the staged changes as a new commit")]
    Commit {
        #[arg(index = 1)]
        message: Option<String>,
    },
    #[command(about = "Show the history of the current branch")]
    Log,
    #[command(name = "global-log", about = "Show every commit ever created")]
    GlobalLog,
    #[command(about = "Print the ids of all commits with the given message")]
    Find {
        #[arg(index = 1)]
        message: String,
    },
    #[command(
        about = "Restore a file or switch branches",
        long_about = "Three forms: `checkout -- <file>` restores a file from the current \
        commit, `checkout <commit> -- <file>` restores it from the given commit, and \
        `checkout <branch>` replaces the working tree with the branch's snapshot."
    )]
    Checkout {
        #[arg(num_args = 0.., allow_hyphen_values = true)]
        operands: Vec<String>,
    },
    #[command(about = "Show branches, staged changes and untracked files")]
    Status,
    #[command(about = "Create a branch pointing at the current commit")]
    Branch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch pointer")]
    RmBranch {
        #[arg(index = 1)]
        name: String,
    },
    #[command(about = "Move the current branch to a commit and restore its snapshot")]
    Reset {
        #[arg(index = 1)]
        commit: String,
    },
    #[command(about = "Merge the given branch into the current branch")]
    Merge {
        #[arg(index = 1)]
        branch: String,
    },
    #[command(
        name = "add-remote",
        about = "Register another repository's state directory under a name"
    )]
    AddRemote {
        #[arg(index = 1)]
        name: String,
        #[arg(index = 2)]
        path: String,
    },
    #[command(name = "rm-remote", about = "Forget a registered remote")]
    RmRemote {
        #[arg(index = 1)]
        name: String,
    },
    #[command(about = "Copy the current branch's history into a remote and advance it")]
    Push {
        #[arg(index = 1)]
        remote: String,
        #[arg(index = 2)]
        branch: String,
    },
    #[command(about = "Copy a remote branch's history into a local tracking branch")]
    Fetch {
        #[arg(index = 1)]
        remote: String,
        #[arg(index = 2)]
        branch: String,
    },
    #[command(about = "Fetch a remote branch and merge it into the current branch")]
    Pull {
        #[arg(index = 1)]
        remote: String,
        #[arg(index = 2)]
        branch: String,
    },
}

fn main() {
    match run() {
        Ok(()) => {}
        Err(err) => {
            // precondition failures carry their fixed message and exit
            // cleanly; anything else is a genuine failure
            if let Some(abort) = err.downcast_ref::<Abort>() {
                println!("{abort}");
                std::process::exit(0);
            }

            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            ErrorKind::MissingSubcommand
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                return Err(Abort::NoCommand.into());
            }
            ErrorKind::InvalidSubcommand => return Err(Abort::UnknownCommand.into()),
            _ => return Err(Abort::BadOperands.into()),
        },
    };

    let pwd = std::env::current_dir()?;
    let writer: Box<dyn std::io::Write> = Box::new(std::io::stdout());

    match cli.command {
        Commands::Init => Repository::new(&pwd, writer)?.init(),
        Commands::Add { file } => Repository::open(&pwd, writer)?.add(&file),
        Commands::Rm { file } => Repository::open(&pwd, writer)?.rm(&file),
        Commands::Commit { message } => {
            let repository = Repository::open(&pwd, writer)?;
            let message = message
                .filter(|message| !message.is_empty())
                .ok_or(Abort::EmptyMessage)?;

            repository.commit(&message)
        }
        Commands::Log => Repository::open(&pwd, writer)?.log(),
        Commands::GlobalLog => Repository::open(&pwd, writer)?.global_log(),
        Commands::Find { message } => Repository::open(&pwd, writer)?.find(&message),
        Commands::Checkout { .. } => {
            // clap consumes the first `--` as its end-of-options marker,
            // but the checkout grammar needs it to tell a file apart from
            // a branch, so the operands are taken from the raw argv
            let operands: Vec<String> = std::env::args().skip(2).collect();
            let repository = Repository::open(&pwd, writer)?;

            dispatch_checkout(&repository, &operands)
        }
        Commands::Status => Repository::open(&pwd, writer)?.status(),
        Commands::Branch { name } => Repository::open(&pwd, writer)?.branch(&name),
        Commands::RmBranch { name } => Repository::open(&pwd, writer)?.rm_branch(&name),
        Commands::Reset { commit } => Repository::open(&pwd, writer)?.reset(&commit),
        Commands::Merge { branch } => Repository::open(&pwd, writer)?.merge(&branch),
        Commands::AddRemote { name, path } => {
            Repository::open(&pwd, writer)?.add_remote(&name, &path)
        }
        Commands::RmRemote { name } => Repository::open(&pwd, writer)?.rm_remote(&name),
        Commands::Push { remote, branch } => Repository::open(&pwd, writer)?.push(&remote, &branch),
        Commands::Fetch { remote, branch } => {
            Repository::open(&pwd, writer)?.fetch(&remote, &branch)
        }
        Commands::Pull { remote, branch } => Repository::open(&pwd, writer)?.pull(&remote, &branch),
    }
}

fn dispatch_checkout(repository: &Repository, operands: &[String]) -> Result<()> {
    match operands {
        [separator, file] if separator == "--" => repository.checkout_file_from_head(file),
        [commit, separator, file] if separator == "--" => {
            repository.checkout_file_from(commit, file)
        }
        [branch] => repository.checkout_branch(branch),
        _ => Err(Abort::BadOperands.into()),
    }
}
