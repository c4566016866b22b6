//! Fuzz target for parsing ProForma terms
use afl::*;

fn main() {
    fuzz!(|data: &[u8]| {
        if let Ok(s) = std::str::from_utf8(data) {
            let _unused = proforma::sequence::ProFormaTerm::parse(s);
        }
    });
}
