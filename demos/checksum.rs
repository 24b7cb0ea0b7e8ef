//
// Copyright (c) 2025 Nathan Fiedler
//

//! Wires the digest hook up to BLAKE3 or MD5 and prints a per-chunk manifest
//! for a file, analogous to what a deduplicating backup tool would record.
//!
//! ```text
//! cargo run --example checksum -- --algo blake3 path/to/file
//! ```

use clap::{value_parser, Arg, Command};
use fastcdc::{chunker, ChunkerOptions, Digest, Source};
use std::path::PathBuf;

fn md5_hex(bytes: &[u8]) -> String {
    use md5::{Digest as _, Md5};
    let mut hasher = Md5::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn blake3_hex(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

fn main() {
    env_logger::init();
    let matches = Command::new("checksum")
        .about("prints a content-defined-chunk manifest for a file")
        .arg(
            Arg::new("algo")
                .long("algo")
                .value_parser(["blake3", "md5"])
                .default_value("blake3"),
        )
        .arg(
            Arg::new("avg-size")
                .long("avg-size")
                .value_parser(value_parser!(usize))
                .default_value("16384"),
        )
        .arg(Arg::new("path").required(true).value_parser(value_parser!(PathBuf)))
        .get_matches();

    let path = matches.get_one::<PathBuf>("path").unwrap().clone();
    let avg_size = *matches.get_one::<usize>("avg-size").unwrap();
    let digest: Box<Digest> = match matches.get_one::<String>("algo").map(String::as_str) {
        Some("md5") => Box::new(md5_hex),
        _ => Box::new(blake3_hex),
    };

    let options = ChunkerOptions {
        include_data: false,
        digest: Some(digest),
    };
    let chunks = chunker(Source::from_path(&path), avg_size, options)
        .expect("failed to open source");

    for chunk in chunks {
        let chunk = chunk.expect("failed to read chunk");
        println!(
            "{:>12} {:>8} {}",
            chunk.offset,
            chunk.length,
            chunk.hash.as_deref().unwrap_or("")
        );
    }
}
