#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Whatever extracts must also lay out and render.
    let Ok(xml) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(summary) = backoffice::peppol::extract(xml) else {
        return;
    };
    let report = backoffice::peppol::generate(&summary, "fuzz.xml");
    assert_eq!(report.rows.len(), summary.invoice_lines.len().max(1));
    let _ = report.to_pdf().unwrap();
});
