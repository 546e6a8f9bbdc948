use anyhow::{Context, Result};
use holiday::auth::credentials::is_bcrypt_hash;
use holiday::config::SiteConfig;

fn main() -> Result<()> {
    let mut conf_file = "conf/site.yaml".to_string();

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "--h" | "--?" | "/?" => {
                println!("Usage: check_config [--conf FILE]");
                return Ok(());
            }
            "--conf" => {
                if i + 1 < args.len() {
                    i += 1;
                    conf_file = args[i].clone();
                } else {
                    eprintln!("Error: --conf requires a FILE argument");
                    return Ok(());
                }
            }
            _ => {}
        }
        i += 1;
    }

    let config = SiteConfig::read(&conf_file)
        .with_context(|| format!("Cannot load config: {}", conf_file))?;

    println!("Config: {}", conf_file);
    for (key, len) in config.redacted_summary() {
        let state = if len == 0 { "(empty)" } else { "set" };
        println!("  {:<22} {:<8} length={}", key, state, len);
    }
    println!(
        "  admin_password_hash is a bcrypt hash: {}",
        is_bcrypt_hash(&config.admin_password_hash)
    );

    match config.validate() {
        Ok(()) => {
            println!("OK");
            Ok(())
        }
        Err(e) => {
            println!("INVALID: {:#}", e);
            std::process::exit(1);
        }
    }
}
