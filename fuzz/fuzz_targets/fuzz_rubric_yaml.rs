#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz rubric file deserialization, which validates through `TryFrom`.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = serde_yaml_ng::from_str::<relevance_judge::Rubric>(s);
    }
});
