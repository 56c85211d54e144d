//! topo2unl 命令行入口

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing::Level;

use topo2unl::core::{
    convert_template_file, print_error_message, print_info_message, write_lab_files,
    ConversionError, ConversionOptions,
};
use topo2unl::env::EnvConfig;
use topo2unl::mappings::{ConsoleLinkMap, InterfaceMapping};
use topo2unl::parsers::html::LinkLookupMode;

/// Convert an HTML topology template into a UNL lab document
#[derive(Parser, Debug)]
#[command(name = "topo2unl", author, version, about, long_about = None)]
struct Cli {
    /// Path to the HTML topology template
    #[arg(short = 't', long)]
    template: PathBuf,

    /// Lab name, used for the document and the output file name
    #[arg(short = 'n', long)]
    name: String,

    /// JSON file mapping devices to console addresses
    #[arg(short = 'l', long = "links-file", conflicts_with = "links")]
    links_file: Option<PathBuf>,

    /// Inline JSON object mapping devices to console addresses
    #[arg(long)]
    links: Option<String>,

    /// JSON file with interface mapping records
    #[arg(
        short = 'i',
        long = "interface-mapping-file",
        conflicts_with = "interface_mapping"
    )]
    interface_mapping_file: Option<PathBuf>,

    /// Inline JSON array with interface mapping records
    #[arg(long = "interface-mapping")]
    interface_mapping: Option<String>,

    /// Output directory [env: TOPO2UNL_OUTPUT_DIR, default: .]
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// How device nodes are matched against console link keys
    #[arg(long, value_enum, default_value_t = Lookup::Name)]
    lookup: Lookup,

    /// Prompt placed before the console URI on device name labels
    #[arg(long)]
    prompt: Option<String>,

    /// Template character encoding (defaults to <meta charset> or UTF-8)
    #[arg(short = 'e', long)]
    encoding: Option<String>,

    /// Verbose logging and write <name>.debug.html next to the lab
    #[arg(short = 'd', long, conflicts_with = "silent")]
    debug: bool,

    /// Only report errors
    #[arg(short = 's', long)]
    silent: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Lookup {
    /// Match the data-name attribute
    Name,
    /// Match the element id
    Id,
}

impl From<Lookup> for LinkLookupMode {
    fn from(lookup: Lookup) -> Self {
        match lookup {
            Lookup::Name => LinkLookupMode::Name,
            Lookup::Id => LinkLookupMode::Id,
        }
    }
}

impl Cli {
    fn log_level(&self, env: &EnvConfig) -> Level {
        if self.debug {
            return Level::DEBUG;
        }
        if self.silent {
            return Level::ERROR;
        }

        env.log_level.parse().unwrap_or(Level::INFO)
    }

    /// 校验参数并构建转换选项
    fn conversion_options(&self, env: &EnvConfig) -> Result<ConversionOptions, ConversionError> {
        let lab_name = self.name.trim();
        if lab_name.is_empty() {
            return Err(ConversionError::InvalidOption(
                "lab name cannot be empty".to_string(),
            ));
        }
        if !self.template.is_file() {
            return Err(ConversionError::InvalidOption(format!(
                "template file not found: {}",
                self.template.display()
            )));
        }

        let console_links = match (&self.links_file, &self.links) {
            (Some(path), _) => ConsoleLinkMap::from_file(path)?,
            (None, Some(json)) => ConsoleLinkMap::from_json_str(json)?,
            (None, None) => ConsoleLinkMap::default(),
        };
        let interface_mapping = match (&self.interface_mapping_file, &self.interface_mapping) {
            (Some(path), _) => InterfaceMapping::from_file(path)?,
            (None, Some(json)) => InterfaceMapping::from_json_str(json)?,
            (None, None) => InterfaceMapping::default(),
        };
        tracing::debug!(
            console_links = console_links.len(),
            interface_records = interface_mapping.len(),
            "loaded mappings"
        );

        let console_prompt = match &self.prompt {
            Some(prompt) => prompt.clone(),
            None => env.console_prompt.clone(),
        };

        Ok(ConversionOptions {
            lab_name: lab_name.to_string(),
            console_links,
            interface_mapping,
            lookup_mode: self.lookup.into(),
            console_prompt,
            encoding: self.encoding.clone(),
            debug: self.debug,
        })
    }

    fn output_dir(&self, env: &EnvConfig) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => env.output_dir.clone(),
        }
    }
}

fn run(cli: &Cli, env: &EnvConfig) -> Result<(), ConversionError> {
    let options = cli.conversion_options(env)?;
    let output = convert_template_file(&cli.template, &options)?;
    let written = write_lab_files(&cli.output_dir(env), &output, options.debug)?;

    if !cli.silent {
        print_info_message(&format!("UNL file saved: {}", written.lab.display()));
        if let Some(debug_path) = &written.debug {
            print_info_message(&format!("Debug HTML saved: {}", debug_path.display()));
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let env = EnvConfig::from_env().unwrap_or_else(|e| {
        eprintln!("{e}. Using defaults instead.");
        EnvConfig::default()
    });

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level(&env))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!env.no_color)
        .init();

    if let Err(e) = run(&cli, &env) {
        print_error_message(&format!("Error: {e}"));
        process::exit(1);
    }
}
