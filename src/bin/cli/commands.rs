//! Command implementations for the CLI tool.

use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;

use assetpack::{NodePath, NodeType, PackArchive};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{EditOutcome, create_formatter};

/// Configuration for the add command.
pub struct AddConfig<'a> {
    pub pack_path: &'a Path,
    pub container: &'a str,
    pub file: &'a Path,
    pub name: Option<&'a str>,
    pub node_type: Option<NodeType>,
    pub dependencies: &'a [String],
    pub format: OutputFormat,
}

/// List command implementation
pub fn list(pack_path: &Path, technical: bool, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);
    let mut pack = match open_pack(pack_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    match pack.entries() {
        Ok(entries) => {
            print!("{}", formatter.format_list(&entries, technical));
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Info command implementation
pub fn info(pack_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);
    let mut pack = match open_pack(pack_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    match pack.stats() {
        Ok(stats) => {
            print!("{}", formatter.format_info(&stats));
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Check command implementation
pub fn check(pack_path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);
    let mut pack = match open_pack(pack_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let stats = match pack.stats() {
        Ok(s) => s,
        Err(e) => return report(&e),
    };
    let dangling = match pack.dangling_dependencies() {
        Ok(d) => d,
        Err(e) => return report(&e),
    };

    print!("{}", formatter.format_check(&stats, &dangling));
    if dangling.is_empty() {
        ExitCode::Success
    } else {
        ExitCode::Warning
    }
}

/// Mkdir command implementation
pub fn mkdir(pack_path: &Path, path: &str, node_type: NodeType, format: OutputFormat) -> ExitCode {
    if !node_type.is_container() {
        eprintln!("Error: '{}' is not a container type", node_type);
        return ExitCode::BadArgs;
    }
    let (container, name) = match split_path(path) {
        Ok(parts) => parts,
        Err(code) => return code,
    };

    let none: &[&str] = &[];
    edit_and_save(pack_path, "mkdir", path, format, true, |pack| {
        pack.insert(container.as_str(), node_type, &name, &[], none)
    })
}

/// Add command implementation
pub fn add(config: &AddConfig<'_>) -> ExitCode {
    let name = match config.name {
        Some(n) => n.to_string(),
        None => match config.file.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => {
                eprintln!(
                    "Error: cannot derive a node name from '{}'",
                    config.file.display()
                );
                return ExitCode::BadArgs;
            }
        },
    };
    let node_type = config
        .node_type
        .unwrap_or_else(|| guess_node_type(config.file));
    if node_type.is_container() {
        eprintln!("Error: use mkdir to create '{}' nodes", node_type);
        return ExitCode::BadArgs;
    }

    let payload = match std::fs::read(config.file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading '{}': {}", config.file.display(), e);
            return ExitCode::IoError;
        }
    };

    let target = format!("{}/{}", config.container.trim_end_matches('/'), name);
    edit_and_save(config.pack_path, "add", &target, config.format, true, |pack| {
        pack.insert(
            config.container,
            node_type,
            &name,
            &payload,
            config.dependencies,
        )
    })
}

/// Remove command implementation
pub fn remove(pack_path: &Path, path: &str, format: OutputFormat) -> ExitCode {
    edit_and_save(pack_path, "rm", path, format, false, |pack| pack.remove(path))
}

/// Move command implementation
pub fn move_node(pack_path: &Path, source: &str, dest: &str, format: OutputFormat) -> ExitCode {
    let target = format!("{} -> {}", source, dest);
    edit_and_save(pack_path, "mv", &target, format, false, |pack| {
        pack.move_node(source, dest)
    })
}

/// Rename command implementation
pub fn rename(pack_path: &Path, path: &str, new_name: &str, format: OutputFormat) -> ExitCode {
    let target = format!("{} -> {}", path, new_name);
    edit_and_save(pack_path, "rename", &target, format, false, |pack| {
        pack.rename(path, new_name)
    })
}

/// Retype command implementation
pub fn retype(pack_path: &Path, path: &str, node_type: NodeType, format: OutputFormat) -> ExitCode {
    let target = format!("{} -> {}", path, node_type);
    edit_and_save(pack_path, "retype", &target, format, false, |pack| {
        pack.retype(path, node_type)
    })
}

/// Cat command implementation
pub fn cat(pack_path: &Path, path: &str, output: Option<&Path>) -> ExitCode {
    let mut pack = match open_pack(pack_path) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let payload = match pack.payload(path) {
        Ok(p) => p,
        Err(e) => return report(&e),
    };

    let written = match output {
        Some(file) => std::fs::write(file, payload.bytes),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(payload.bytes).and_then(|_| stdout.flush())
        }
    };
    match written {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("Error writing payload: {}", e);
            ExitCode::IoError
        }
    }
}

/// Pack command implementation
///
/// Directories become `parent` containers and files become leaves whose kind
/// is guessed from the extension. Entries are added in file-name order so the
/// output is deterministic.
pub fn pack_dir(dir: &Path, output: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);
    let mut pack = PackArchive::new();
    let none: &[&str] = &[];

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Error walking '{}': {}", dir.display(), e);
                return ExitCode::IoError;
            }
        };
        let (container, name) = match relative_location(dir, entry.path()) {
            Ok(loc) => loc,
            Err(code) => return code,
        };

        let inserted = if entry.file_type().is_dir() {
            pack.insert(container.as_str(), NodeType::Parent, &name, &[], none)
        } else if entry.file_type().is_file() {
            match std::fs::read(entry.path()) {
                Ok(bytes) => {
                    let kind = guess_node_type(entry.path());
                    pack.insert(container.as_str(), kind, &name, &bytes, none)
                }
                Err(e) => {
                    eprintln!("Error reading '{}': {}", entry.path().display(), e);
                    return ExitCode::IoError;
                }
            }
        } else {
            log::info!("skipping '{}'", entry.path().display());
            continue;
        };

        match inserted {
            Ok(true) => log::debug!("added {}/{}", container, name),
            Ok(false) => {
                eprintln!("Error: could not add '{}'", entry.path().display());
                return ExitCode::FatalError;
            }
            Err(e) => return report(&e),
        }
    }

    if let Err(e) = pack.save_path(output) {
        return report(&e);
    }
    match pack.stats() {
        Ok(stats) => {
            print!("{}", formatter.format_info(&stats));
            ExitCode::Success
        }
        Err(e) => report(&e),
    }
}

/// Guesses a leaf kind from a file extension.
pub fn guess_node_type(path: &Path) -> NodeType {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mesh" | "obj" | "fbx" | "gltf" | "glb" | "ply" => NodeType::MeshData,
        "png" | "jpg" | "jpeg" | "tga" | "bmp" | "dds" | "ktx" | "ktx2" => NodeType::ImageFile,
        "mat" | "mtl" => NodeType::MaterialData,
        "skel" | "bones" => NodeType::BoneTree,
        "txt" | "json" | "toml" | "ini" | "cfg" => NodeType::String,
        _ => NodeType::BinaryData,
    }
}

fn open_pack(path: &Path) -> Result<PackArchive, ExitCode> {
    PackArchive::open_path(path).map_err(|e| {
        eprintln!("Error opening pack: {}", e);
        error_to_exit_code(&e)
    })
}

fn open_or_create(path: &Path) -> Result<PackArchive, ExitCode> {
    if path.exists() {
        open_pack(path)
    } else {
        log::info!("creating new pack '{}'", path.display());
        Ok(PackArchive::new())
    }
}

fn report(error: &assetpack::Error) -> ExitCode {
    eprintln!("Error: {}", error);
    error_to_exit_code(error)
}

/// Splits `path` into its container and final name.
fn split_path(path: &str) -> Result<(NodePath, String), ExitCode> {
    let parsed = NodePath::parse(path).map_err(|e| report(&e))?;
    match (parsed.parent(), parsed.file_name()) {
        (Some(parent), Some(name)) => Ok((parent, name.to_string())),
        _ => {
            eprintln!("Error: the root cannot be created");
            Err(ExitCode::BadArgs)
        }
    }
}

/// Maps a walked file to its container path and node name.
fn relative_location(base: &Path, path: &Path) -> Result<(NodePath, String), ExitCode> {
    let relative = path.strip_prefix(base).map_err(|_| ExitCode::FatalError)?;
    let Some(relative) = relative.to_str() else {
        eprintln!("Error: '{}' is not valid UTF-8", path.display());
        return Err(ExitCode::BadArgs);
    };
    let normalized = relative.replace(std::path::MAIN_SEPARATOR, "/");
    split_path(&normalized)
}

fn edit_and_save<F>(
    pack_path: &Path,
    action: &str,
    target: &str,
    format: OutputFormat,
    create: bool,
    edit: F,
) -> ExitCode
where
    F: FnOnce(&mut PackArchive) -> assetpack::Result<bool>,
{
    let formatter = create_formatter(format);
    let opened = if create {
        open_or_create(pack_path)
    } else {
        open_pack(pack_path)
    };
    let mut pack = match opened {
        Ok(p) => p,
        Err(code) => return code,
    };

    let bytes_before = pack.len();
    let applied = match edit(&mut pack) {
        Ok(applied) => applied,
        Err(e) => return report(&e),
    };
    if applied {
        if let Err(e) = pack.save_path(pack_path) {
            return report(&e);
        }
    }

    print!(
        "{}",
        formatter.format_edit(&EditOutcome {
            action,
            target,
            applied,
            bytes_before,
            bytes_after: pack.len(),
        })
    );
    if applied {
        ExitCode::Success
    } else {
        ExitCode::Warning
    }
}
