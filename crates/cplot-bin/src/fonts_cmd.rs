use std::path::PathBuf;

use core_error::Result;
use core_fonts::FontRegistry;

/// A local `fonts/` directory takes precedence over the platform data
/// directory, mirroring how `core-config::discover` prefers the working
/// directory before falling back to a platform-standard location.
pub fn catalog_dir() -> PathBuf {
    let local = PathBuf::from("fonts");
    if local.join("index.toml").exists() {
        return local;
    }
    if let Some(dir) = dirs::data_dir() {
        return dir.join("cplot").join("fonts");
    }
    local
}

pub fn load_registry() -> Result<FontRegistry> {
    core_fonts::load_catalog(&catalog_dir())
}

pub fn run(families: bool) -> Result<()> {
    let registry = load_registry()?;
    if families {
        for family in registry.families() {
            println!("{}\t{}", family.key, family.display_name);
            for variant in &family.variants {
                println!("  {variant}");
            }
        }
    } else {
        for face in registry.faces() {
            println!("{}\t{}", face.id, face.display_name);
        }
    }
    Ok(())
}
