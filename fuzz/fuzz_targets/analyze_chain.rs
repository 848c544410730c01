#![no_main]

use certview_lib::{analyze_pem_chain, display_text, to_json, AnalyzeOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Loading may reject the input, but analysis of anything that loads
    // must never panic.
    if let Ok(analysis) = analyze_pem_chain(data, &AnalyzeOptions::at(1_700_000_000)) {
        let _ = display_text(&analysis, "fuzz");
        let _ = to_json(&analysis);
    }
});
