use anyhow::Result;
use holiday::auth::credentials::is_bcrypt_hash;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        println!("Usage: verify_hash PASSWORD HASH");
        return Ok(());
    }
    let (password, hash) = (&args[1], &args[2]);

    println!("Hash length: {}", hash.len());
    println!("Well-formed bcrypt hash: {}", is_bcrypt_hash(hash));

    match bcrypt::verify(password, hash) {
        Ok(true) => println!("Match: yes"),
        Ok(false) => {
            println!("Match: no");
            std::process::exit(1);
        }
        Err(e) => {
            println!("Match: error ({})", e);
            std::process::exit(2);
        }
    }
    Ok(())
}
