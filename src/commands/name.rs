//! Name inspection commands

use anyhow::{Context, Result};
use rust_ndnfw_common::Name;

use crate::utils::print_header;

fn parse(uri: &str) -> Result<Name> {
    Name::from_uri(uri).with_context(|| format!("invalid name {:?}", uri))
}

fn hex(octets: &[u8]) -> String {
    octets.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Print each name's components with their end offsets and prefix hashes.
pub fn show_names(uris: &[String]) -> Result<()> {
    for uri in uris {
        let name = parse(uri)?;
        print_header(&name.to_string());
        println!("TLV-VALUE: {}", hex(name.value()));
        println!("{:>4}  {:>6}  {:<16}  {:<24}  prefix", "i", "end", "prefix-hash", "component");
        println!("{:>4}  {:>6}  {:016x}  {:<24}  /", "-", 0, name.prefix_hash(0), "");
        for i in 0..name.len() {
            let comp = name.component(i).unwrap_or_default();
            println!(
                "{:>4}  {:>6}  {:016x}  {:<24}  {}",
                i,
                name.comp_end(i),
                name.prefix_hash(i + 1),
                hex(comp),
                name.prefix(i + 1)
            );
        }
    }
    Ok(())
}

/// Print the canonical comparison of two names.
pub fn compare_names(lhs: &str, rhs: &str) -> Result<()> {
    let a = parse(lhs)?;
    let b = parse(rhs)?;
    let res = a.compare(&b);
    println!("{} {} {} ({:?})", a, res, b, res.to_ordering());
    Ok(())
}
