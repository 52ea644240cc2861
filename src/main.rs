//! Command-line interface for soapgen

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use soapgen::{Generator, GeneratorConfig};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "soapgen")]
#[command(author, version, about = "WSDL to codec descriptor generator", long_about = None)]
struct Cli {
    /// Path to the WSDL file to compile
    #[arg(value_name = "WSDL")]
    wsdl: PathBuf,

    /// Output directory (defaults to the current directory)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Emit unit names without the _Def/_Dec suffixes
    #[arg(long)]
    simple_naming: bool,

    /// Mark emitted type references for lazy evaluation
    #[arg(long)]
    lazy: bool,

    /// Enable ws-addressing on operation stubs
    #[arg(long)]
    address: bool,

    /// Faster generation defaults (implies --lazy)
    #[arg(long)]
    fast: bool,

    /// Fail early on structurally weak definitions
    #[arg(long)]
    strict_schema: bool,
}

#[cfg(feature = "cli")]
fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::from_json_file(path)?,
        None => GeneratorConfig::default(),
    };
    // flags override the configuration file
    config.simple_naming |= cli.simple_naming;
    config.lazy |= cli.lazy;
    config.address |= cli.address;
    config.fast |= cli.fast;
    config.strict_schema |= cli.strict_schema;

    let wsdl_text = fs::read_to_string(&cli.wsdl)?;
    let generation = Generator::new(config).generate_from_wsdl_str(&wsdl_text)?;

    for diagnostic in &generation.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    let stem = cli
        .wsdl
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("service");
    let out_dir = cli.output.unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&out_dir)?;

    let types_path = out_dir.join(format!("{}_types.sgd", stem));
    let client_path = out_dir.join(format!("{}_client.sgd", stem));
    fs::write(&types_path, &generation.types_artifact)?;
    fs::write(&client_path, &generation.client_artifact)?;

    println!("wrote {}", types_path.display());
    println!("wrote {}", client_path.display());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
