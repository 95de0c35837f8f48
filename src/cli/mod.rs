use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::external::Command;
use crate::git::Git;

pub mod commands;

#[derive(Parser, Debug)]
#[command(name = "gitcmd")]
#[command(about = "Assemble and run git commands through a typed builder")]
#[command(long_about = "gitcmd maps each supported git operation onto its exact argument list. \
                       Use --dry-run to print the assembled command instead of running it.")]
pub struct Cli {
    /// Repository directory git runs in
    #[arg(long, short = 'C', help = "Directory to run git in (defaults to config, then the current directory)")]
    pub dir: Option<PathBuf>,

    /// Configuration file
    #[arg(long, help = "Read configuration from this file instead of gitcmd.toml")]
    pub config: Option<PathBuf>,

    /// Print instead of running
    #[arg(long, help = "Print the assembled command without running it")]
    pub dry_run: bool,

    /// JSON dry-run output
    #[arg(long, requires = "dry_run", help = "Print the command as JSON (with --dry-run)")]
    pub json: bool,

    /// Verbose logging
    #[arg(long, short = 'v', help = "Log at debug level")]
    pub verbose: bool,

    #[command(subcommand)]
    pub operation: Operation,
}

/// One variant per git operation the builder supports.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create an empty repository or reinitialize an existing one
    Init,
    /// Clone a repository into the working directory
    Clone { repo: String },
    /// Recursively clone a tag or branch into the working directory
    CloneTagOrBranch {
        repo: String,
        #[arg(value_name = "TAG_OR_BRANCH")]
        reference: String,
    },
    /// List remotes with their urls
    RemoteList,
    /// Add a remote
    RemoteAdd { name: String, url: String },
    /// Download objects and refs from another repository
    Fetch {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
    /// Switch to a commit, branch or tag
    Checkout {
        #[arg(allow_hyphen_values = true)]
        target: String,
    },
    /// Create a branch and check it out
    NewBranch { branch: String },
    /// Merge a commit, branch or tag into the current branch
    Merge {
        #[arg(allow_hyphen_values = true)]
        target: String,
    },
    /// Reset the current branch head to a commit
    Reset {
        #[arg(allow_hyphen_values = true, help = "One of --soft, --mixed, --hard, --merge, --keep")]
        mode: String,
        commit: String,
    },
    /// Remove untracked files from the working tree
    Clean {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
    /// Initialize and update submodules recursively
    SubmoduleUpdate {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
    /// Run a command in each checked out submodule
    SubmoduleForeach {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Fetch and integrate changes from the remote
    Pull,
    /// Stage files matching a pathspec
    Add {
        #[arg(allow_hyphen_values = true)]
        pathspec: String,
    },
    /// List or manipulate branches
    Branch {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
    /// Apply a patch to the working tree and index
    Apply { patch: String },
    /// Show the latest commit in the given format
    Log {
        format: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
    /// List commits reachable from a commit
    RevList {
        commit: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
    /// Push a branch to origin and set it as upstream
    Push { branch: String },
    /// Record the index as a new commit
    Commit {
        #[arg(allow_hyphen_values = true)]
        message: String,
    },
    /// Resolve a revision
    RevParse {
        #[arg(allow_hyphen_values = true)]
        arg: String,
    },
    /// Show the working tree status
    Status {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
    /// Set a configuration value
    Config {
        key: String,
        value: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
    /// Initialize the sparse-checkout file
    SparseCheckoutInit {
        #[arg(long, help = "Use cone mode patterns")]
        cone: bool,
    },
    /// Write patterns to the sparse-checkout file
    SparseCheckoutSet {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        options: Vec<String>,
    },
}

impl Cli {
    /// Parse `args` (binary name first), keeping the operation's trailing
    /// options exactly as typed. clap drops a `--` separator; git needs it.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut cli = Cli::try_parse_from(args.iter())?;
        if let Some(index) = operation_index(&args) {
            cli.operation.restore_trailing(&args[index + 1..]);
        }
        Ok(cli)
    }

    /// Parse the process arguments, exiting with clap's message on error.
    pub fn parse_args() -> Self {
        let args = std::env::args_os().map(|arg| arg.to_string_lossy().into_owned());
        Self::try_parse_args(args).unwrap_or_else(|e| e.exit())
    }
}

/// Position of the operation name, skipping gitcmd's own flags.
fn operation_index(args: &[String]) -> Option<usize> {
    let mut index = 1;
    while let Some(arg) = args.get(index) {
        match arg.as_str() {
            "--dry-run" | "--json" | "-v" | "--verbose" => index += 1,
            "-C" | "--dir" | "--config" => index += 2,
            flag if flag.starts_with("--dir=")
                || flag.starts_with("--config=")
                || (flag.starts_with("-C") && flag.len() > 2) =>
            {
                index += 1
            }
            flag if flag.starts_with('-') => return None,
            _ => return Some(index),
        }
    }
    None
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

impl Operation {
    /// Replace the parsed trailing options with the raw arguments that
    /// followed the operation name, as long as the leading positionals line up.
    fn restore_trailing(&mut self, raw: &[String]) {
        let (fixed, tail): (Vec<&str>, &mut Vec<String>) = match self {
            Operation::Fetch { options }
            | Operation::Clean { options }
            | Operation::SubmoduleUpdate { options }
            | Operation::Branch { options }
            | Operation::Status { options }
            | Operation::SparseCheckoutSet { options } => (Vec::new(), options),
            Operation::SubmoduleForeach { args } => (Vec::new(), args),
            Operation::Log { format, options } => (vec![format.as_str()], options),
            Operation::RevList { commit, options } => (vec![commit.as_str()], options),
            Operation::Config {
                key,
                value,
                options,
            } => (vec![key.as_str(), value.as_str()], options),
            _ => return,
        };

        let leading_match = raw.len() >= fixed.len()
            && raw.iter().zip(&fixed).all(|(raw_arg, parsed)| raw_arg.as_str() == *parsed);
        if leading_match {
            *tail = raw[fixed.len()..].to_vec();
        }
    }

    /// Assemble the git command for this operation.
    pub fn build(&self, git: &Git) -> Command {
        match self {
            Operation::Init => git.init(),
            Operation::Clone { repo } => git.clone_repo(repo),
            Operation::CloneTagOrBranch { repo, reference } => {
                git.clone_tag_or_branch(repo, reference)
            }
            Operation::RemoteList => git.remote_list(),
            Operation::RemoteAdd { name, url } => git.remote_add(name, url),
            Operation::Fetch { options } => git.fetch(&as_strs(options)),
            Operation::Checkout { target } => git.checkout(target),
            Operation::NewBranch { branch } => git.new_branch(branch),
            Operation::Merge { target } => git.merge(target),
            Operation::Reset { mode, commit } => git.reset(mode, commit),
            Operation::Clean { options } => git.clean(&as_strs(options)),
            Operation::SubmoduleUpdate { options } => git.submodule_update(&as_strs(options)),
            Operation::SubmoduleForeach { args } => git.submodule_foreach(&as_strs(args)),
            Operation::Pull => git.pull(),
            Operation::Add { pathspec } => git.add(pathspec),
            Operation::Branch { options } => git.branch(&as_strs(options)),
            Operation::Apply { patch } => git.apply(patch),
            Operation::Log { format, options } => git.log(format, &as_strs(options)),
            Operation::RevList { commit, options } => git.rev_list(commit, &as_strs(options)),
            Operation::Push { branch } => git.push(branch),
            Operation::Commit { message } => git.commit(message),
            Operation::RevParse { arg } => git.rev_parse(arg),
            Operation::Status { options } => git.status(&as_strs(options)),
            Operation::Config {
                key,
                value,
                options,
            } => git.config(key, value, &as_strs(options)),
            Operation::SparseCheckoutInit { cone } => git.sparse_checkout_init(*cone),
            Operation::SparseCheckoutSet { options } => {
                git.sparse_checkout_set(&as_strs(options))
            }
        }
    }
}
