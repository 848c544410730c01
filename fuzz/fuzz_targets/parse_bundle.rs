#![no_main]

use certview_lib::{analyze_chain, parse_chain, parse_pem_chain};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Treat the input as a sequence of length-prefixed DER blobs so the
    // fuzzer can build multi-certificate chains without PEM framing.
    let mut chain = Vec::new();
    let mut rest = data;
    while let [hi, lo, tail @ ..] = rest {
        let len = usize::from(u16::from_be_bytes([*hi, *lo])).min(tail.len());
        let (blob, next) = tail.split_at(len);
        chain.push(blob.to_vec());
        rest = next;
    }
    if let Ok(parsed) = parse_chain(&chain) {
        let _ = analyze_chain(&parsed);
    }

    let _ = parse_pem_chain(data);
});
