//! Fuzz target for the parse and write round trip of ProForma terms
use afl::*;

fn main() {
    fuzz!(|data: &[u8]| {
        if let Ok(s) = std::str::from_utf8(data)
            && let Ok(term) = proforma::sequence::ProFormaTerm::parse(s)
        {
            // Every written term has to be valid ProForma that parses back into the same term
            let written = term.to_string();
            let reparsed = proforma::sequence::ProFormaTerm::parse(&written).unwrap();
            assert_eq!(term, reparsed, "{written}");
            assert_eq!(written, reparsed.to_string());
        }
    });
}
