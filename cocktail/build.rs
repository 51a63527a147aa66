use common::yaml_include::load_yaml_with_includes;
use std::{error::Error, fs, path::Path};

fn main() -> Result<(), Box<dyn Error>> {
    let project_name = "cocktail";
    println!("cargo:rerun-if-changed=config");
    println!("cargo:rerun-if-env-changed=COCKTAIL_ENV");

    let out_dir = std::env::var("OUT_DIR")?;
    let env = std::env::var("COCKTAIL_ENV").unwrap_or_else(|_| "dev".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "debug".to_string());

    // OUT_DIR lives under target/<profile>/build/..., the assembled config goes
    // next to the binaries.
    let Some(target_dir) = Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with("target"))
        .map(|p| p.join(&profile))
    else {
        println!("cargo:warning=No target directory above {}, skipping config assembly", out_dir);
        return Ok(());
    };

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")?;
    let source = Path::new(&manifest_dir).join("config").join(format!("{}.yaml", env));
    println!(
        "cargo:warning=Assembling {} config for env {:?} profile {:?}",
        project_name, env, profile
    );
    let config_yaml = load_yaml_with_includes(&source)?;

    let mut out_str = String::new();
    {
        let mut emitter = yaml_rust2::YamlEmitter::new(&mut out_str);
        emitter.dump(&config_yaml)?;
    }

    let config_dir = target_dir.join("config");
    fs::create_dir_all(&config_dir)?;
    fs::write(config_dir.join("total_config.yaml"), out_str)?;

    Ok(())
}
