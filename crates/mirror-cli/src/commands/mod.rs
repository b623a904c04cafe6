use mirror_config::MirrorConfig;
use mirror_engine::Mode;

use crate::cli::{Commands, GlobalFlags};

pub mod authors;
pub mod sync;

/// Route a parsed command to its handler.
pub fn dispatch(command: Commands, config: &MirrorConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Sync(args) => sync::handle(&args, config, flags, Mode::Sync),
        Commands::Status(args) => sync::handle(&args, config, flags, Mode::Status),
        Commands::Authors => authors::handle(config, flags),
    }
}
