use crate::cli::LintArgs;
use color_eyre::eyre::Result;
use duct::cmd;
use std::fs;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Fmt,
    Check,
    Clippy,
    Test,
}

const PIPELINE: &[Step] = &[Step::Fmt, Step::Check, Step::Clippy, Step::Test];

impl Step {
    fn skipped(self, args: &LintArgs) -> bool {
        match self {
            Step::Fmt => args.no_fmt,
            Step::Check => false,
            Step::Clippy => args.no_clippy,
            Step::Test => args.no_test,
        }
    }

    /// Cargo arguments for this step. `fix` applies changes instead of
    /// reporting them.
    fn cargo_args(self, fix: bool) -> Vec<&'static str> {
        match (self, fix) {
            (Step::Fmt, false) => vec!["fmt", "--all", "--check"],
            (Step::Fmt, true) => vec!["fmt", "--all"],
            (Step::Check, _) => vec!["check", "--workspace", "--all-targets"],
            (Step::Clippy, false) => {
                vec!["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]
            }
            (Step::Clippy, true) => vec![
                "clippy",
                "--workspace",
                "--all-targets",
                "--fix",
                "--allow-dirty",
                "--",
                "-D",
                "warnings",
            ],
            (Step::Test, _) => vec!["test", "--workspace"],
        }
    }
}

fn display_name(args: &[&str]) -> String {
    format!("cargo {}", args.join(" "))
}

/// Run the lint pipeline, stopping at the first failing step. Every step's
/// output is appended to `target/xtask-lint.log`.
pub fn run(args: &LintArgs) -> Result<()> {
    let target_dir = std::env::current_dir()?.join("target");
    fs::create_dir_all(&target_dir)?;
    let log_path = target_dir.join("xtask-lint.log");
    let mut log = fs::File::create(&log_path)?;

    for step in PIPELINE.iter().filter(|s| !s.skipped(args)) {
        let cargo_args = step.cargo_args(args.fix);
        let name = display_name(&cargo_args);

        let output = cmd("cargo", &cargo_args)
            .stderr_to_stdout()
            .stdout_capture()
            .unchecked()
            .run()?;
        let text = String::from_utf8_lossy(&output.stdout);
        writeln!(log, "=== {name} ===\n{text}")?;

        if !output.status.success() {
            print!("{text}");
            println!("\nlint failed at: {name}");
            println!("log: {}", log_path.display());
            std::process::exit(1);
        }
        if args.verbose {
            print!("{text}");
        }
        println!("ok: {name}");
    }

    println!("log: {}", log_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_flags() {
        let args = LintArgs {
            no_clippy: true,
            ..Default::default()
        };
        let steps: Vec<Step> = PIPELINE
            .iter()
            .copied()
            .filter(|s| !s.skipped(&args))
            .collect();
        assert_eq!(steps, vec![Step::Fmt, Step::Check, Step::Test]);
    }

    #[test]
    fn test_fix_mode_args() {
        assert_eq!(display_name(&Step::Fmt.cargo_args(true)), "cargo fmt --all");
        assert!(Step::Fmt.cargo_args(false).contains(&"--check"));

        let clippy = Step::Clippy.cargo_args(true);
        assert!(clippy.contains(&"--fix"));
        assert_eq!(&clippy[clippy.len() - 2..], &["-D", "warnings"]);
        assert_eq!(Step::Test.cargo_args(true), Step::Test.cargo_args(false));
    }
}
