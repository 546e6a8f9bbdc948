use std::io::BufRead;

use anyhow::{bail, Context, Result};
use holiday::auth::credentials::{hash_password, HASH_COST};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let password = match args.get(1).map(String::as_str) {
        Some("--help" | "--h" | "--?" | "/?") => {
            println!("Usage: hash_password [PASSWORD]");
            println!("  Reads the password from stdin when none is given.");
            return Ok(());
        }
        Some(p) => p.to_string(),
        None => {
            eprintln!("Password (end with Enter):");
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Cannot read password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        bail!("password cannot be empty");
    }

    let hash = hash_password(&password).context("bcrypt failed")?;
    println!("Hash (cost {}): {}", HASH_COST, hash);
    println!();
    println!("Add this to conf/site.yaml:");
    println!("admin_password_hash: \"{}\"", hash);
    Ok(())
}
