//! # Solution Demo
//!
//! Encrypts a two-file solution, prints the stored JSON, decrypts it
//! again, and upgrades a document in the oldest, untagged format.
//!
//! ## Run
//!
//! ```bash
//! RUST_LOG=solution_vault=trace cargo run --example solution_demo
//! ```

use solution_vault::solution::{Annotation, EncodedDocument, NumberRange, PlainDocument, PlainFile};
use solution_vault::{decode_concurrent, decode_json, encode_concurrent, seal, upgrade};

#[tokio::main]
async fn main() -> solution_vault::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,solution_vault=debug".into()),
        )
        .init();

    tracing::info!("Solution Vault v{}", solution_vault::version());

    let password = "correct horse battery staple";

    // Build a solution
    let document = PlainDocument::new(
        "Binary search",
        vec![
            PlainFile::new(
                "search.rs",
                "rust",
                "pub fn search(xs: &[i32], x: i32) -> Option<usize> {\n    xs.binary_search(&x).ok()\n}\n",
            )
            .with_annotations(vec![Annotation::new(
                "Consider documenting that `xs` must be sorted.",
                NumberRange::new(1, 1),
                NumberRange::new(0, 52),
            )]),
            PlainFile::new("README.md", "markdown", "# Binary search\n"),
        ],
    );

    // Step 1: Encrypt; every field is sealed on its own task
    println!("Step 1: Encrypting {} files...", document.files.len());
    let encrypted = encode_concurrent(password, &document).await?;
    let json = encrypted.to_json_pretty()?;
    println!("{}\n", json);

    // Step 2: Decrypt from JSON
    println!("Step 2: Decrypting...");
    let decrypted = decode_json(password, &json)?;
    assert_eq!(decrypted, document);
    println!("  Round trip OK: \"{}\" with {} files", decrypted.title, decrypted.files.len());
    if let Some(file) = decrypted.file("search.rs") {
        println!("  {} carries {} annotation(s)\n", file.name, file.annotations.len());
    }

    // Step 3: Wrong password
    println!("Step 3: Decrypting with the wrong password...");
    match decode_json("hunter2", &json) {
        Ok(_) => println!("  Unexpectedly succeeded"),
        Err(e) => println!("  Rejected as expected: {} (code {})\n", e, e.code()),
    }

    // Step 4: Upgrade a legacy document
    println!("Step 4: Upgrading an untagged legacy document...");
    let legacy = EncodedDocument::from_value(serde_json::json!({
        "language": "python",
        "code": seal(password, "print(1)")?,
        "annotations": seal(password, "[]")?,
    }))?;
    let opened = decode_concurrent(password, &legacy).await?;
    println!(
        "  Legacy document opened as \"{}\" / \"{}\"",
        opened.title, opened.files[0].name
    );

    let upgraded = upgrade(password, &legacy)?;
    println!("  Upgraded to format {}", upgraded.version);

    Ok(())
}
