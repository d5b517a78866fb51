#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text as invoice XML: either a summary or MalformedXml, never a panic.
    if let Ok(xml) = std::str::from_utf8(data) {
        match backoffice::peppol::extract(xml) {
            Ok(_) | Err(backoffice::BackofficeError::MalformedXml { .. }) => {}
            Err(e) => panic!("unexpected error: {e:?}"),
        }
    }
});
