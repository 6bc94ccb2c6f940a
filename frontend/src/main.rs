use clap::Parser;
use gigatron_core::system::GigatronSystem;
use log::{error, info, warn};

mod audio;
mod config;
mod emulator;
mod input;
mod rom_path;
mod video;

#[derive(Parser, Debug)]
#[command(name = "gigatron", about = "Gigatron TTL microcomputer emulator")]
struct Cli {
    /// Path to a ROM image (big-endian 16-bit words).
    #[arg(long)]
    rom: Option<String>,

    /// Path to a GT1 program to load over the simulated controller port.
    #[arg(long)]
    gt1: Option<String>,

    /// Window scale factor.
    #[arg(long)]
    scale: Option<u32>,

    /// Path to a TOML config file (defaults to the platform config directory).
    #[arg(long)]
    config: Option<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let file_config = config::load_file_config(cli.config.as_deref());
    let settings = config::Settings::resolve(file_config, cli.rom, cli.gt1, cli.scale);

    let mut system = GigatronSystem::new(&settings.core, 44_100);

    let rom_path = settings.rom_path.unwrap_or_else(|| {
        error!("no ROM specified (pass --rom or set `rom` in the config file)");
        std::process::exit(1);
    });
    let rom_bytes = rom_path::read_file(&rom_path).unwrap_or_else(|e| {
        error!("failed to read ROM {rom_path}: {e}");
        std::process::exit(1);
    });
    let words = system.load_rom(&rom_bytes).unwrap_or_else(|e| {
        error!("failed to load ROM {rom_path}: {e}");
        std::process::exit(1);
    });
    info!("loaded {words} ROM words from {rom_path}");

    if let Some(gt1_path) = &settings.gt1_path {
        match rom_path::read_file(gt1_path) {
            Ok(bytes) => match system.load_gt1(&bytes) {
                Ok(()) => info!("loading {gt1_path} over the simulated controller port"),
                Err(e) => warn!("failed to parse GT1 {gt1_path}: {e}"),
            },
            Err(e) => warn!("failed to read GT1 {gt1_path}: {e}"),
        }
    }

    system.reset();
    let key_map = input::default_key_map(system.input_map());
    emulator::run(&mut system, &key_map, settings.scale);
}
