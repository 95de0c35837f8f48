use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::GitSettings;
use crate::external::Command;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to prepare working directory {}: {source}", .path.display())]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Builds `git` invocations scoped to one working directory.
///
/// Every method is a pure function of its arguments: it only assembles the
/// argument list and returns a [`Command`] for a
/// [`CommandExecutor`](crate::external::CommandExecutor) to run. Fixed flags
/// come first, caller supplied options follow in the order given. Nothing
/// is validated here; git rejects bad input when the command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Git {
    dir: PathBuf,
    binary: String,
    envs: Vec<(String, String)>,
}

impl Git {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::from_settings(dir, &GitSettings::default())
    }

    /// Takes the binary and environment overrides from `settings`.
    pub fn from_settings(dir: impl Into<PathBuf>, settings: &GitSettings) -> Self {
        Self {
            dir: dir.into(),
            binary: settings.binary.clone(),
            envs: settings
                .env
                .iter()
                .map(|var| (var.name.clone(), var.value.clone()))
                .collect(),
        }
    }

    /// Like [`Git::new`], creating `dir` and its parents first.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, GitError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| GitError::WorkingDirectory {
            path: dir.clone(),
            source,
        })?;
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command = Command::new(self.binary.as_str())
            .args(args)
            .current_dir(&self.dir)
            .envs(self.envs.iter().cloned());
        tracing::trace!(command = %command, dir = %self.dir.display(), "assembled git command");
        command
    }

    fn command_with_options(&self, fixed: &[&str], opts: &[&str]) -> Command {
        self.command(fixed.iter().chain(opts).copied())
    }

    /// Creates an empty repository or reinitializes an existing one.
    pub fn init(&self) -> Command {
        self.command(["init"])
    }

    /// Clones `repo` into the working directory.
    pub fn clone_repo(&self, repo: &str) -> Command {
        self.command(["clone", repo, "."])
    }

    /// Clones `repo` recursively, checking out `tag_or_branch`.
    pub fn clone_tag_or_branch(&self, repo: &str, tag_or_branch: &str) -> Command {
        self.command(["clone", "--recursive", "--branch", tag_or_branch, repo, "."])
    }

    /// Lists remotes with their urls.
    pub fn remote_list(&self) -> Command {
        self.command(["remote", "-v"])
    }

    pub fn remote_add(&self, name: &str, url: &str) -> Command {
        self.command(["remote", "add", name, url])
    }

    pub fn fetch(&self, opts: &[&str]) -> Command {
        self.command_with_options(&["fetch"], opts)
    }

    /// `arg` can be a commit hash, a branch or a tag.
    pub fn checkout(&self, arg: &str) -> Command {
        self.command(["checkout", arg])
    }

    /// Creates `branch` and checks it out.
    pub fn new_branch(&self, branch: &str) -> Command {
        self.command(["checkout", "-b", branch])
    }

    /// `arg` can be a commit hash, a branch or a tag.
    pub fn merge(&self, arg: &str) -> Command {
        self.command(["merge", arg])
    }

    /// Resets the current branch head to `commit`.
    ///
    /// `mode` is passed through as is, git accepts `--soft`, `--mixed`,
    /// `--hard`, `--merge` and `--keep`.
    pub fn reset(&self, mode: &str, commit: &str) -> Command {
        self.command(["reset", mode, commit])
    }

    /// Removes untracked files from the working tree.
    pub fn clean(&self, opts: &[&str]) -> Command {
        self.command_with_options(&["clean"], opts)
    }

    /// Initializes and updates all submodules recursively.
    pub fn submodule_update(&self, opts: &[&str]) -> Command {
        self.command_with_options(&["submodule", "update", "--init", "--recursive"], opts)
    }

    /// Evaluates a command in each checked out submodule.
    pub fn submodule_foreach(&self, args: &[&str]) -> Command {
        self.command_with_options(&["submodule", "foreach"], args)
    }

    pub fn pull(&self) -> Command {
        self.command(["pull"])
    }

    /// Stages `pathspec`, which may be a glob such as `*.c`.
    pub fn add(&self, pathspec: &str) -> Command {
        self.command(["add", pathspec])
    }

    pub fn branch(&self, opts: &[&str]) -> Command {
        self.command_with_options(&["branch"], opts)
    }

    /// Applies `patch` to both the working tree and the index.
    pub fn apply(&self, patch: &str) -> Command {
        self.command(["apply", "--index", patch])
    }

    /// Shows the latest commit rendered with `format`; `opts` may narrow the
    /// revision range.
    pub fn log(&self, format: &str, opts: &[&str]) -> Command {
        let format_arg = format!("--format={format}");
        self.command_with_options(&["log", "-1", format_arg.as_str()], opts)
    }

    pub fn rev_list(&self, commit: &str, opts: &[&str]) -> Command {
        self.command_with_options(&["rev-list", commit], opts)
    }

    /// Pushes `branch` to origin and sets it as upstream.
    pub fn push(&self, branch: &str) -> Command {
        self.command(["push", "-u", "origin", branch])
    }

    pub fn commit(&self, message: &str) -> Command {
        self.command(["commit", "-m", message])
    }

    pub fn rev_parse(&self, arg: &str) -> Command {
        self.command(["rev-parse", arg])
    }

    pub fn status(&self, opts: &[&str]) -> Command {
        self.command_with_options(&["status"], opts)
    }

    /// Sets `key` to `value`; repository scope unless `opts` say otherwise.
    pub fn config(&self, key: &str, value: &str, opts: &[&str]) -> Command {
        self.command_with_options(&["config", key, value], opts)
    }

    pub fn sparse_checkout_init(&self, cone: bool) -> Command {
        let mut args = vec!["sparse-checkout", "init"];
        if cone {
            args.push("--cone");
        }
        self.command(args)
    }

    /// Writes the given patterns to the sparse-checkout file.
    pub fn sparse_checkout_set(&self, opts: &[&str]) -> Command {
        self.command_with_options(&["sparse-checkout", "set"], opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvVar;

    fn git() -> Git {
        Git::new("/work/repo")
    }

    fn args(command: &Command) -> Vec<&str> {
        command.get_args().iter().map(String::as_str).collect()
    }

    #[test]
    fn test_argument_assembly_table() {
        let git = git();
        let cases: Vec<(Command, Vec<&str>)> = vec![
            (git.init(), vec!["init"]),
            (git.clone_repo("https://x/y.git"), vec!["clone", "https://x/y.git", "."]),
            (git.remote_list(), vec!["remote", "-v"]),
            (
                git.remote_add("upstream", "git@host:a/b.git"),
                vec!["remote", "add", "upstream", "git@host:a/b.git"],
            ),
            (git.fetch(&["--all", "--prune"]), vec!["fetch", "--all", "--prune"]),
            (git.checkout("v2.1.0"), vec!["checkout", "v2.1.0"]),
            (git.new_branch("feature/x"), vec!["checkout", "-b", "feature/x"]),
            (git.merge("origin/main"), vec!["merge", "origin/main"]),
            (git.reset("--hard", "HEAD~1"), vec!["reset", "--hard", "HEAD~1"]),
            (git.clean(&["-x", "-d", "-f"]), vec!["clean", "-x", "-d", "-f"]),
            (
                git.submodule_update(&["--jobs", "4"]),
                vec!["submodule", "update", "--init", "--recursive", "--jobs", "4"],
            ),
            (
                git.submodule_foreach(&["git", "reset", "--hard"]),
                vec!["submodule", "foreach", "git", "reset", "--hard"],
            ),
            (git.pull(), vec!["pull"]),
            (git.add("*.c"), vec!["add", "*.c"]),
            (git.branch(&["-a"]), vec!["branch", "-a"]),
            (git.apply("fix.patch"), vec!["apply", "--index", "fix.patch"]),
            (
                git.log("%H", &["main..HEAD"]),
                vec!["log", "-1", "--format=%H", "main..HEAD"],
            ),
            (
                git.rev_list("HEAD", &["--count"]),
                vec!["rev-list", "HEAD", "--count"],
            ),
            (git.push("release"), vec!["push", "-u", "origin", "release"]),
            (git.commit("fix: bug"), vec!["commit", "-m", "fix: bug"]),
            (git.rev_parse("HEAD"), vec!["rev-parse", "HEAD"]),
            (git.status(&["--porcelain"]), vec!["status", "--porcelain"]),
            (
                git.config("user.name", "Bot", &["--global"]),
                vec!["config", "user.name", "Bot", "--global"],
            ),
            (
                git.sparse_checkout_set(&["src", "docs"]),
                vec!["sparse-checkout", "set", "src", "docs"],
            ),
        ];

        for (command, expected) in &cases {
            assert_eq!(args(command), *expected, "{command}");
            assert_eq!(command.program(), "git");
        }
    }

    #[test]
    fn test_clone_tag_or_branch() {
        let command = git().clone_tag_or_branch("https://x/y.git", "v1.0");
        assert_eq!(
            args(&command),
            ["clone", "--recursive", "--branch", "v1.0", "https://x/y.git", "."]
        );
    }

    #[test]
    fn test_sparse_checkout_init_cone_flag() {
        assert_eq!(
            args(&git().sparse_checkout_init(true)),
            ["sparse-checkout", "init", "--cone"]
        );
        assert_eq!(
            args(&git().sparse_checkout_init(false)),
            ["sparse-checkout", "init"]
        );
    }

    #[test]
    fn test_variadic_operations_without_options() {
        let git = git();
        assert_eq!(args(&git.fetch(&[])), ["fetch"]);
        assert_eq!(args(&git.status(&[])), ["status"]);
        assert_eq!(args(&git.log("%s", &[])), ["log", "-1", "--format=%s"]);
        assert_eq!(
            args(&git.submodule_update(&[])),
            ["submodule", "update", "--init", "--recursive"]
        );
    }

    #[test]
    fn test_options_are_not_deduplicated() {
        let command = git().clean(&["-f", "-f", "-d"]);
        assert_eq!(args(&command), ["clean", "-f", "-f", "-d"]);
    }

    #[test]
    fn test_inputs_are_passed_through_unvalidated() {
        let git = git();
        assert_eq!(args(&git.checkout("")), ["checkout", ""]);
        assert_eq!(args(&git.reset("--bogus", "not a ref")), ["reset", "--bogus", "not a ref"]);
    }

    #[test]
    fn test_commands_are_scoped_to_context() {
        let settings = GitSettings {
            binary: "/opt/git/bin/git".to_string(),
            working_dir: None,
            env: vec![EnvVar {
                name: "GIT_TERMINAL_PROMPT".to_string(),
                value: "0".to_string(),
            }],
        };
        let git = Git::from_settings("/srv/checkout", &settings);
        let command = git.pull();

        assert_eq!(command.program(), "/opt/git/bin/git");
        assert_eq!(command.get_current_dir(), Some(Path::new("/srv/checkout")));
        assert_eq!(
            command.get_envs(),
            [("GIT_TERMINAL_PROMPT".to_string(), "0".to_string())]
        );
    }

    #[test]
    fn test_same_inputs_give_equal_commands() {
        let git = git();
        assert_eq!(git.log("%H", &["-n", "3"]), git.log("%H", &["-n", "3"]));
        assert_eq!(git.commit("msg"), git.commit("msg"));
    }

    #[test]
    fn test_printable_clone() {
        assert_eq!(
            git().clone_repo("https://x/y.git").printable_args(),
            r#"git "clone" "https://x/y.git" ".""#
        );
    }

    #[test]
    fn test_create_makes_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("repo");
        let git = Git::create(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(git.dir(), dir.as_path());
        assert_eq!(git.binary(), "git");
    }

    #[test]
    fn test_create_fails_when_path_is_a_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("occupied");
        std::fs::write(&file, "").unwrap();

        let err = Git::create(&file).unwrap_err();
        assert!(matches!(err, GitError::WorkingDirectory { .. }));
    }

    #[test]
    fn test_new_performs_no_io() {
        let git = Git::new("/definitely/not/here");
        assert_eq!(git.init().get_current_dir(), Some(Path::new("/definitely/not/here")));
    }
}
