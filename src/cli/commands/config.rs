use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::info;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config, source: Option<&std::path::Path>) -> AppResult<()> {
    if let Commands::Config { print_config } = cmd {
        let path = source.map(|p| p.to_path_buf()).unwrap_or_else(Config::config_file);

        if *print_config {
            if path.exists() {
                println!("📄 Current configuration ({}):\n", path.display());
            } else {
                println!("📄 Current configuration (built-in defaults):\n");
            }
            print!("{}", cfg.to_yaml()?);
        } else {
            info(format!("Configuration file: {}", path.display()));
            info("Use --print to show the configuration in effect.");
        }
    }

    Ok(())
}
