use criterion::{Criterion, black_box, criterion_group, criterion_main};

use backoffice::peppol::{self, PeppolReader};

fn ubl_invoice(lines: usize) -> String {
    let body: String = (1..=lines)
        .map(|i| {
            format!(
                "<cac:InvoiceLine><cbc:ID>{i}</cbc:ID>\
                 <cbc:InvoicedQuantity unitCode=\"C62\">2</cbc:InvoicedQuantity>\
                 <cbc:LineExtensionAmount currencyID=\"EUR\">19.98</cbc:LineExtensionAmount>\
                 <cac:Item><cbc:Name>Item {i}</cbc:Name></cac:Item></cac:InvoiceLine>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns:cac="urn:cac" xmlns:cbc="urn:cbc">
  <cbc:ID>BENCH-{lines}</cbc:ID>
  <cbc:IssueDate>2024-06-15</cbc:IssueDate>
  <cbc:DueDate>2024-07-15</cbc:DueDate>
  <cac:AccountingSupplierParty><cac:Party><cac:PartyName><cbc:Name>Leverancier BV</cbc:Name></cac:PartyName></cac:Party></cac:AccountingSupplierParty>
  <cac:AccountingCustomerParty><cac:Party><cac:PartyName><cbc:Name>Hotel Aan Zee</cbc:Name></cac:PartyName></cac:Party></cac:AccountingCustomerParty>
  <cac:LegalMonetaryTotal><cbc:PayableAmount currencyID="EUR">1000.00</cbc:PayableAmount></cac:LegalMonetaryTotal>
  {body}
</Invoice>"#
    )
}

fn bench_extract(c: &mut Criterion) {
    let small = ubl_invoice(10);
    let large = ubl_invoice(1000);
    c.bench_function("extract_10_lines", |b| {
        b.iter(|| black_box(peppol::extract(black_box(&small))));
    });
    c.bench_function("extract_1000_lines", |b| {
        b.iter(|| black_box(peppol::extract(black_box(&large))));
    });
}

fn bench_render(c: &mut Criterion) {
    let small = peppol::generate(&peppol::extract(&ubl_invoice(10)).unwrap(), "bench.xml");
    let large = peppol::generate(&peppol::extract(&ubl_invoice(1000)).unwrap(), "bench.xml");
    c.bench_function("render_pdf_10_lines", |b| {
        b.iter(|| black_box(peppol::render_pdf(black_box(&small))));
    });
    c.bench_function("render_pdf_1000_lines", |b| {
        b.iter(|| black_box(peppol::render_pdf(black_box(&large))));
    });
}

fn bench_upload_to_download(c: &mut Criterion) {
    let xml = ubl_invoice(50);
    c.bench_function("reader_upload_and_download", |b| {
        b.iter(|| {
            let mut reader = PeppolReader::default();
            reader.select_text("bench.xml", black_box(&xml)).unwrap();
            black_box(reader.download())
        });
    });
}

criterion_group!(benches, bench_extract, bench_render, bench_upload_to_download);
criterion_main!(benches);
