use crate::cli;
use color_eyre::eyre::{eyre, Result};
use duct::cmd;
use std::env;
use std::path::PathBuf;

pub fn install(args: &cli::InstallArgs) -> Result<()> {
    println!("Building {} in release mode...", args.name);
    cmd!("cargo", "build", "--bin", &args.name, "--release").run()?;

    let install_dir = match &args.path {
        Some(path) => PathBuf::from(path),
        None => {
            let home = env::var("HOME")
                .or_else(|_| env::var("USERPROFILE"))
                .map_err(|_| eyre!("Could not determine home directory"))?;
            PathBuf::from(home).join(".local").join("bin")
        }
    };
    std::fs::create_dir_all(&install_dir)?;

    let source_path = PathBuf::from("target").join("release").join(&args.name);
    let dest_path = install_dir.join(&args.name);
    std::fs::copy(&source_path, &dest_path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&dest_path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&dest_path, perms)?;
    }

    // Unsigned copies get killed on launch.
    #[cfg(target_os = "macos")]
    {
        let _ = cmd!("xattr", "-cr", &dest_path).run();
        if let Err(e) = cmd!("codesign", "--force", "--sign", "-", &dest_path).run() {
            eprintln!("Warning: Failed to re-sign binary: {e}");
        }
    }

    println!("Installed {} to {}", args.name, dest_path.display());

    let on_path = env::var_os("PATH")
        .map(|path| env::split_paths(&path).any(|p| p == install_dir))
        .unwrap_or(false);
    if !on_path {
        println!("\nNote: {} is not in your PATH.", install_dir.display());
        println!("  export PATH=\"{}:$PATH\"", install_dir.display());
    }

    Ok(())
}
