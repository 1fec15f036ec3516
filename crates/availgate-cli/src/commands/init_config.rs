use availgate_kernel::EngineConfig;
use std::path::Path;

pub fn run(path: String, force: bool) {
    let path = Path::new(&path);
    if path.exists() && !force {
        eprintln!(
            "error: {} already exists (use --force to overwrite)",
            path.display()
        );
        std::process::exit(1);
    }
    let rendered = EngineConfig::default().to_toml_string().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!("error: failed to create {}: {e}", parent.display());
        std::process::exit(1);
    }
    if let Err(e) = std::fs::write(path, rendered) {
        eprintln!("error: failed to write {}: {e}", path.display());
        std::process::exit(1);
    }
    println!("Wrote {}", path.display());
}
