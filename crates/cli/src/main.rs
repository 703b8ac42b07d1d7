use anyhow::{anyhow, bail, Context};
use config::{Config, File};
use grotto::{
    render::{stl, svg},
    timed, ChunkMesh, ChunkModel, MeshMode, Seed, World, WorldConfig,
};
use log::{info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    process,
};
use structopt::StructOpt;
use strum::{Display, EnumString};

/// CLI for generating cave chunks and tile meshes via Grotto.
#[derive(Debug, StructOpt)]
#[structopt(name = "grotto")]
struct Opt {
    /// Path to a config file that defines the world to be generated. Supported
    /// formats: JSON, TOML. If not given, the default config is used (with a
    /// random seed)
    #[structopt(short, long)]
    config: Option<PathBuf>,

    /// Override the seed from the config. Integers are used as-is, any other
    /// text is hashed
    #[structopt(long, parse(from_str))]
    seed: Option<Seed>,

    /// Override the mesh mode from the config: independent, shared
    #[structopt(long)]
    mode: Option<MeshMode>,

    /// If given, the generated world will be saved to this directory. The
    /// exact files that appear in the directory are defined by the output
    /// formats. See `--output-formats` for more info
    #[structopt(short, long)]
    output: Option<PathBuf>,

    /// The format(s) to output the world in. Supported formats:
    ///
    /// ascii - Text dump of each chunk's grid, `#` for solid cells
    ///   (chunk_<i>.txt)
    ///
    /// cfg - The full config object used for the world, in TOML format
    ///   (world.toml)
    ///
    /// json - JSON representation of the whole world, including grids and
    ///   mesh buffers (world.json)
    ///
    /// stl - 3D model of each chunk's mesh (chunk_<i>.stl)
    ///
    /// svg - 2D top-down rendering of each chunk's grid (chunk_<i>.svg)
    #[structopt(short = "f", long)]
    output_formats: Vec<OutputFormat>,

    /// The logging level to use during world generation. See
    /// https://docs.rs/log/0.4.11/log/enum.LevelFilter.html for options
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
}

/// Different output formats.
#[derive(Copy, Clone, Debug, PartialEq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum OutputFormat {
    // If you change this, make sure to update the help text for
    // `--output-formats`!
    /// Dump each chunk's grid as text
    Ascii,
    /// Export the world's full config in a human-readable file
    Cfg,
    /// Export the world in a serialized JSON format, which can be deserialized
    /// later to recover the world
    Json,
    /// Export each chunk's mesh as a 3D STL
    Stl,
    /// Render each chunk's grid as a 2D SVG
    Svg,
}

impl OutputFormat {
    fn file_ext(self) -> &'static str {
        match self {
            Self::Ascii => "txt",
            Self::Cfg => "toml",
            Self::Json => "json",
            Self::Stl => "stl",
            Self::Svg => "svg",
        }
    }
}

fn load_config(config_path: &Path) -> anyhow::Result<WorldConfig> {
    // Load config
    let mut settings = Config::new();
    let config_path = config_path.to_str().ok_or_else(|| {
        anyhow!("invalid character in path {:?}", config_path)
    })?;
    settings
        .merge(File::with_name(config_path))
        .context("error reading config file")?;
    settings.try_into().context("error reading config")
}

/// Apply command line overrides on top of a loaded config
fn apply_overrides(mut config: WorldConfig, opt: &Opt) -> WorldConfig {
    if let Some(seed) = &opt.seed {
        config.seed = seed.clone();
    }
    if let Some(mode) = opt.mode {
        config.mesh_mode = mode;
    }
    config
}

/// Build one file per chunk, named by the chunk's index
fn per_chunk_files(
    world: &World,
    ext: &str,
    f: impl Fn(&ChunkModel, &ChunkMesh) -> Vec<u8>,
) -> Vec<(String, Vec<u8>)> {
    world
        .chunks()
        .iter()
        .zip(world.meshes())
        .enumerate()
        .map(|(i, (chunk, chunk_mesh))| {
            (format!("chunk_{}.{}", i, ext), f(chunk, chunk_mesh))
        })
        .collect()
}

/// Generate the contents of every file for the given format, as
/// `(file name, bytes)` pairs.
fn generate_files(
    output_format: OutputFormat,
    world: &World,
) -> Vec<(String, Vec<u8>)> {
    let ext = output_format.file_ext();
    let world_file = |bytes: Vec<u8>| vec![(format!("world.{}", ext), bytes)];

    match output_format {
        OutputFormat::Ascii => per_chunk_files(world, ext, |chunk, _| {
            chunk.grid().to_ascii().into_bytes()
        }),
        OutputFormat::Stl => per_chunk_files(world, ext, |_, chunk_mesh| {
            stl::meshes_to_stl(std::slice::from_ref(chunk_mesh))
        }),
        OutputFormat::Svg => per_chunk_files(world, ext, |chunk, _| {
            svg::grid_to_svg(chunk.grid(), &world.config().tile)
                .to_string()
                .into_bytes()
        }),
        OutputFormat::Cfg => world_file(
            // Serialize just the world config via toml
            toml::to_string_pretty(world.config())
                // Panics only if config format isn't serializable (a bug)
                .expect("error serializing config")
                .into_bytes(),
        ),
        // Serialize the entire world via JSON
        OutputFormat::Json => world_file(world.to_json().into_bytes()),
    }
}

/// Generate an output form of the world in the given format.
fn gen_output(
    output_dir: &Path,
    output_format: OutputFormat,
    world: &World,
) -> anyhow::Result<()> {
    timed!(
        format!("Generating {} output in {:?}", output_format, output_dir),
        log::Level::Info,
        {
            for (file_name, bytes) in generate_files(output_format, world) {
                let output_file_path = output_dir.join(file_name);
                let mut file = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&output_file_path)
                    .with_context(|| {
                        format!(
                            "error opening output file {:?}",
                            &output_file_path
                        )
                    })?;
                file.write_all(&bytes).with_context(|| {
                    format!("error writing to file {:?}", &output_file_path)
                })?;
            }
        }
    );

    Ok(())
}

/// Run the CLI with some options
fn run(opt: Opt) -> anyhow::Result<()> {
    SimpleLogger::new().with_level(opt.log_level).init()?;

    let config = match &opt.config {
        Some(config_path) => load_config(config_path)?,
        None => {
            info!("No config given, using default");
            WorldConfig::default()
        }
    };
    let world = World::generate(apply_overrides(config, &opt))?;
    for (i, chunk_mesh) in world.meshes().iter().enumerate() {
        info!(
            "Chunk {}: {} vertices, {} triangles",
            i,
            chunk_mesh.mesh.vertex_count(),
            chunk_mesh.mesh.triangle_count()
        );
    }

    // If an output dir was specified, write out output format(s) there
    match opt.output {
        Some(output_dir) => {
            if opt.output_formats.is_empty() {
                bail!(
                    "output dir was specified, but no output formats were given"
                )
            }
            fs::create_dir_all(&output_dir).with_context(|| {
                format!("error creating output dir {:?}", &output_dir)
            })?;
            for output_format in opt.output_formats {
                gen_output(&output_dir, output_format, &world)?;
            }
        }
        None if !opt.output_formats.is_empty() => {
            warn!("Output formats were given without --output, nothing written")
        }
        None => {}
    }

    Ok(())
}

fn main() {
    let exit_code = match run(Opt::from_args()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
